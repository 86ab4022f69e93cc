//! `almox-reports` — history filters and export formatting.
//!
//! Pure formatting over inventory records: no store access, no UI.

pub mod export;
pub mod filters;
pub mod format;

pub use export::{EntryRow, ExitRow, ExportError, ItemRow, export_csv, to_csv_string};
pub use filters::{LedgerRecord, filter_by_code, filter_by_day, filter_by_sector};
pub use format::{
    StoreTimestamp, ToDateTime, format_batches_consumed, format_date, format_day, format_quantidade,
};
