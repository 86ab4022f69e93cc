use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use almox_core::ExpectedVersion;

use super::CREATED_AT;
use super::r#trait::{Document, DocumentStore, StoreError};

/// In-memory document store.
///
/// Intended for tests/dev. Not optimized for performance: lookups scan the
/// collection.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    offline: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (or regaining) the connection to the remote store.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("store is offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn read<T>(&self, f: impl FnOnce(&HashMap<String, Vec<Document>>) -> T) -> Result<T, StoreError> {
        self.ensure_online()?;
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(f(&collections))
    }

    fn created_at(doc: &Document) -> Option<DateTime<Utc>> {
        let raw = doc.field(CREATED_AT)?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.read(|c| c.get(collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.read(|c| {
            c.get(collection)
                .and_then(|docs| docs.iter().find(|d| d.id == id))
                .cloned()
        })
    }

    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<Document>, StoreError> {
        self.read(|c| {
            c.get(collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|d| d.field(field) == Some(value))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    async fn add(&self, collection: &str, data: JsonValue) -> Result<Document, StoreError> {
        self.ensure_online()?;
        if !data.is_object() {
            return Err(StoreError::InvalidDocument(format!(
                "{collection}: document body must be an object"
            )));
        }

        let doc = Document {
            id: Uuid::now_v7().simple().to_string(),
            version: 1,
            data,
        };

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());

        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
        expected: ExpectedVersion,
    ) -> Result<Document, StoreError> {
        self.ensure_online()?;
        let JsonValue::Object(fields) = patch else {
            return Err(StoreError::InvalidDocument(format!(
                "{collection}/{id}: patch must be an object"
            )));
        };

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        if !expected.matches(doc.version) {
            tracing::debug!(collection, id, found = doc.version, "stale write rejected");
            return Err(StoreError::Conflict(format!(
                "{collection}/{id}: expected {expected:?}, found {}",
                doc.version
            )));
        }

        let JsonValue::Object(data) = &mut doc.data else {
            return Err(StoreError::InvalidDocument(format!(
                "{collection}/{id}: stored body is not an object"
            )));
        };
        for (key, value) in fields {
            data.insert(key, value);
        }
        doc.version += 1;

        Ok(doc.clone())
    }

    async fn query_by_date_range(
        &self,
        collection: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Document>, StoreError> {
        self.read(|c| {
            c.get(collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|d| {
                            Self::created_at(d).is_some_and(|t| start <= t && t < end)
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        })
    }
}
