//! Remote document store boundary.
//!
//! The almoxarifado persists everything in a hosted document database reached
//! through a small get/query/add/update API. This module defines that API
//! without making any storage assumptions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{Document, DocumentStore, StoreError};

/// Catalog items.
pub const ITEMS: &str = "items";
/// Stock entries (append-only).
pub const ENTRADAS: &str = "entradas";
/// Stock exits (append-only).
pub const SAIDAS: &str = "saidas";

/// Field every ledger document is timestamped with.
pub const CREATED_AT: &str = "createdAt";
