//! Inventory domain module for the almoxarifado.
//!
//! This crate contains the business rules for stock control, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage):
//! record validation, FIFO-by-expiry batch consumption, derived stock states
//! and ledger recomputation.

pub mod consumption;
pub mod item;
pub mod ledger;
pub mod movement;
pub mod stock_state;
pub mod validation;

use almox_core::{EntryId, ExitId, ItemId, Persisted};

pub use consumption::{Consumption, available, consume_batches};
pub use item::{Batch, Categoria, Item, ItemPatch, NewItem, normalize_codigo};
pub use ledger::{StockAudit, audit_item, recompute_stock};
pub use movement::{BatchConsumed, Entry, Exit, NewEntry, NewExit};
pub use stock_state::{ExpiryAlert, ExpiryStatus, InventorySummary, StockThresholds};
pub use validation::{ValidationResult, is_valid_quantidade, parse_quantidade};

/// Item as loaded from the store.
pub type StoredItem = Persisted<ItemId, Item>;
/// Entry as loaded from the store.
pub type StoredEntry = Persisted<EntryId, Entry>;
/// Exit as loaded from the store.
pub type StoredExit = Persisted<ExitId, Exit>;
