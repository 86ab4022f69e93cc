#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{Value as JsonValue, json};

use almox_app::{AppContext, FixedClock, Session};
use almox_auth::InMemoryIdentityProvider;
use almox_core::ExpectedVersion;
use almox_infra::store::ITEMS;
use almox_infra::{Document, DocumentStore, InMemoryDocumentStore, Settings, StoreError};

pub const ADMIN: (&str, &str) = ("chefe@prefeitura.gov.br", "admin123");
pub const CLERK: (&str, &str) = ("maria@prefeitura.gov.br", "senha123");

/// 2024-06-10 10:00 in Brasília (UTC-3).
pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 13, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct Harness {
    pub clock: Arc<FixedClock>,
    pub identity: Arc<InMemoryIdentityProvider>,
    pub ctx: AppContext,
}

pub fn harness_with(store: Arc<dyn DocumentStore>) -> Harness {
    let clock = Arc::new(FixedClock::new(test_time()));
    let identity = Arc::new(
        InMemoryIdentityProvider::new()
            .with_account(ADMIN.0, ADMIN.1, true)
            .with_account(CLERK.0, CLERK.1, false),
    );
    let ctx = AppContext::new(store, identity.clone(), Settings::default()).with_clock(clock.clone());
    Harness { clock, identity, ctx }
}

pub fn harness() -> (Harness, Arc<InMemoryDocumentStore>) {
    let store = Arc::new(InMemoryDocumentStore::new());
    (harness_with(store.clone()), store)
}

impl Harness {
    pub async fn admin(&self) -> Session {
        self.ctx.login(ADMIN.0, ADMIN.1).await.unwrap()
    }

    pub async fn clerk(&self) -> Session {
        self.ctx.login(CLERK.0, CLERK.1).await.unwrap()
    }
}

/// Store that lets another writer touch an item right before each of the
/// next `conflicts` conditional item updates, so they fail on version.
pub struct RacingStore {
    pub inner: InMemoryDocumentStore,
    conflicts: AtomicU32,
    pub item_updates: AtomicU32,
}

impl RacingStore {
    pub fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            conflicts: AtomicU32::new(conflicts),
            item_updates: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl DocumentStore for RacingStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.inner.get_all(collection).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.get_by_field(collection, field, value).await
    }

    async fn add(&self, collection: &str, data: JsonValue) -> Result<Document, StoreError> {
        self.inner.add(collection, data).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
        expected: ExpectedVersion,
    ) -> Result<Document, StoreError> {
        if collection == ITEMS && matches!(expected, ExpectedVersion::Exact(_)) {
            self.item_updates.fetch_add(1, Ordering::SeqCst);
            let race = self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if race {
                self.inner
                    .update(ITEMS, id, json!({"local": "Depósito B"}), ExpectedVersion::Any)
                    .await?;
            }
        }
        self.inner.update(collection, id, patch, expected).await
    }

    async fn query_by_date_range(
        &self,
        collection: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.query_by_date_range(collection, start, end).await
    }
}

/// Store whose `add` fails for one ledger collection while the rest of the
/// store keeps working.
#[derive(Default)]
pub struct LedgerOutageStore {
    pub inner: InMemoryDocumentStore,
    failing: Mutex<Option<&'static str>>,
}

impl LedgerOutageStore {
    pub fn fail_appends_to(&self, collection: Option<&'static str>) {
        *self.failing.lock().unwrap() = collection;
    }
}

#[async_trait]
impl DocumentStore for LedgerOutageStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.inner.get_all(collection).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.get_by_field(collection, field, value).await
    }

    async fn add(&self, collection: &str, data: JsonValue) -> Result<Document, StoreError> {
        let failing = *self.failing.lock().unwrap();
        if failing == Some(collection) {
            return Err(StoreError::Unavailable(format!("{collection}: write timed out")));
        }
        self.inner.add(collection, data).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
        expected: ExpectedVersion,
    ) -> Result<Document, StoreError> {
        self.inner.update(collection, id, patch, expected).await
    }

    async fn query_by_date_range(
        &self,
        collection: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.query_by_date_range(collection, start, end).await
    }
}
