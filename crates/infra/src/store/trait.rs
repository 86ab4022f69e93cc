use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use almox_core::ExpectedVersion;

/// A stored document: store-assigned id, write revision and JSON body.
///
/// `data` is always a JSON object. `version` starts at 1 on insert and is
/// bumped by every successful update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub version: u64,
    pub data: JsonValue,
}

impl Document {
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.data.get(name)
    }
}

/// Document store operation error.
///
/// These are infrastructure errors, as opposed to domain errors. None of them
/// is retried automatically except `Conflict`, and only by callers that
/// re-read before writing again.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Document database contract.
///
/// Collections are addressed by name and created on first write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of a collection, in insertion order.
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Documents whose top-level `field` equals `value`.
    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<Document>, StoreError>;

    /// Insert a new document; the store assigns the id.
    async fn add(&self, collection: &str, data: JsonValue) -> Result<Document, StoreError>;

    /// Shallow-merge `patch` into an existing document.
    ///
    /// Fails with `Conflict` when `expected` does not match the stored
    /// version, leaving the document untouched.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
        expected: ExpectedVersion,
    ) -> Result<Document, StoreError>;

    /// Documents whose `createdAt` lies in `[start, end)`.
    async fn query_by_date_range(
        &self,
        collection: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Document>, StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        (**self).get_all(collection).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        (**self).get(collection, id).await
    }

    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).get_by_field(collection, field, value).await
    }

    async fn add(&self, collection: &str, data: JsonValue) -> Result<Document, StoreError> {
        (**self).add(collection, data).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
        expected: ExpectedVersion,
    ) -> Result<Document, StoreError> {
        (**self).update(collection, id, patch, expected).await
    }

    async fn query_by_date_range(
        &self,
        collection: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).query_by_date_range(collection, start, end).await
    }
}
