//! Typed repositories over the document store.
//!
//! Documents are decoded into [`Persisted`] records so callers always carry
//! the version they read alongside the record.

use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use almox_core::{DomainError, EntryId, ExitId, ExpectedVersion, ItemId, Persisted};
use almox_inventory::{Entry, Exit, Item, StoredItem};

use crate::store::{Document, DocumentStore, ENTRADAS, ITEMS, SAIDAS, StoreError};

fn decode<I, T>(collection: &str, doc: Document) -> Result<Persisted<I, T>, StoreError>
where
    I: FromStr<Err = DomainError>,
    T: DeserializeOwned,
{
    let id = I::from_str(&doc.id).map_err(|e| StoreError::InvalidDocument(format!("{collection}: {e}")))?;
    let record = serde_json::from_value(doc.data).map_err(|e| {
        StoreError::InvalidDocument(format!("{collection}/{}: {e}", doc.id))
    })?;
    Ok(Persisted::new(id, doc.version, record))
}

fn encode<T: Serialize>(record: &T) -> Result<JsonValue, StoreError> {
    Ok(serde_json::to_value(record)?)
}

/// Catalog items (`items` collection).
#[derive(Clone)]
pub struct ItemRepository {
    store: Arc<dyn DocumentStore>,
}

impl ItemRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<StoredItem>, StoreError> {
        self.store
            .get_all(ITEMS)
            .await?
            .into_iter()
            .map(|doc| decode(ITEMS, doc))
            .collect()
    }

    pub async fn get(&self, id: &ItemId) -> Result<Option<StoredItem>, StoreError> {
        self.store
            .get(ITEMS, id.as_str())
            .await?
            .map(|doc| decode(ITEMS, doc))
            .transpose()
    }

    async fn first_by(&self, field: &str, value: &str) -> Result<Option<StoredItem>, StoreError> {
        self.store
            .get_by_field(ITEMS, field, &JsonValue::from(value))
            .await?
            .into_iter()
            .next()
            .map(|doc| decode(ITEMS, doc))
            .transpose()
    }

    /// Exact barcode lookup.
    pub async fn find_by_codigo(&self, codigo: &str) -> Result<Option<StoredItem>, StoreError> {
        self.first_by("codigo", codigo).await
    }

    /// Exact name lookup.
    pub async fn find_by_nome(&self, nome: &str) -> Result<Option<StoredItem>, StoreError> {
        self.first_by("nome", nome).await
    }

    pub async fn insert(&self, item: &Item) -> Result<StoredItem, StoreError> {
        let doc = self.store.add(ITEMS, encode(item)?).await?;
        decode(ITEMS, doc)
    }

    /// Write the whole item back, guarded by `expected`.
    pub async fn save(
        &self,
        id: &ItemId,
        item: &Item,
        expected: ExpectedVersion,
    ) -> Result<StoredItem, StoreError> {
        let doc = self
            .store
            .update(ITEMS, id.as_str(), encode(item)?, expected)
            .await?;
        decode(ITEMS, doc)
    }
}

/// Append-only ledger collection of entries or exits.
pub struct LedgerRepository<I, T> {
    store: Arc<dyn DocumentStore>,
    collection: &'static str,
    _marker: PhantomData<fn() -> (I, T)>,
}

impl<I, T> Clone for LedgerRepository<I, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collection: self.collection,
            _marker: PhantomData,
        }
    }
}

/// Stock entries (`entradas` collection).
pub type EntryRepository = LedgerRepository<EntryId, Entry>;
/// Stock exits (`saidas` collection).
pub type ExitRepository = LedgerRepository<ExitId, Exit>;

impl EntryRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::for_collection(store, ENTRADAS)
    }
}

impl ExitRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::for_collection(store, SAIDAS)
    }
}

impl<I, T> LedgerRepository<I, T>
where
    I: FromStr<Err = DomainError>,
    T: Serialize + DeserializeOwned,
{
    fn for_collection(store: Arc<dyn DocumentStore>, collection: &'static str) -> Self {
        Self {
            store,
            collection,
            _marker: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    fn decode_all(&self, docs: Vec<Document>) -> Result<Vec<Persisted<I, T>>, StoreError> {
        docs.into_iter().map(|doc| decode(self.collection, doc)).collect()
    }

    /// Every record, in recording order.
    pub async fn list(&self) -> Result<Vec<Persisted<I, T>>, StoreError> {
        let docs = self.store.get_all(self.collection).await?;
        self.decode_all(docs)
    }

    /// Records created in `[start, end)`.
    pub async fn between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Persisted<I, T>>, StoreError> {
        let docs = self
            .store
            .query_by_date_range(self.collection, start, end)
            .await?;
        self.decode_all(docs)
    }

    pub async fn append(&self, record: &T) -> Result<Persisted<I, T>, StoreError> {
        let doc = self.store.add(self.collection, encode(record)?).await?;
        decode(self.collection, doc)
    }
}
