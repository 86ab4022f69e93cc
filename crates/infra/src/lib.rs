//! Infrastructure layer: document store, typed repositories, configuration.

pub mod config;
pub mod repository;
pub mod store;

pub use crate::config::Settings;
pub use repository::{EntryRepository, ExitRepository, ItemRepository, LedgerRepository};
pub use store::{Document, DocumentStore, InMemoryDocumentStore, StoreError};
