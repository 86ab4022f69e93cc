//! `almox-core` — domain foundation building blocks for the almoxarifado.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;

pub use aggregate::{ExpectedVersion, Persisted};
pub use error::{DomainError, DomainResult};
pub use id::{EntryId, ExitId, ItemId};
