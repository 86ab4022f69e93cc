//! Entry/exit history, filtering and CSV export.

use std::path::Path;

use chrono::NaiveDate;

use almox_auth::Permission;
use almox_inventory::{StoredEntry, StoredExit};
use almox_reports::{
    EntryRow, ExitRow, ItemRow, LedgerRecord, export_csv, filter_by_code, filter_by_day,
    filter_by_sector,
};

use crate::context::Session;
use crate::error::AppError;

/// Filters of the history screens. Blank fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Barcode substring.
    pub codigo: Option<String>,
    /// Local calendar day of `createdAt`.
    pub dia: Option<NaiveDate>,
    /// Destination sector substring (exits only).
    pub setor: Option<String>,
}

fn newest_first<T: LedgerRecord>(records: &mut [T]) {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

impl Session {
    fn apply_common<'a, T: LedgerRecord>(&self, records: &'a [T], filter: &HistoryFilter) -> Vec<&'a T> {
        let mut selected: Vec<&T> = records.iter().collect();
        if let Some(codigo) = filter.codigo.as_deref() {
            selected = filter_by_code(selected, codigo);
        }
        if let Some(dia) = filter.dia {
            selected = filter_by_day(selected, dia, &self.ctx.offset());
        }
        selected
    }

    /// Entries matching `filter`, newest first.
    pub async fn entry_history(&self, filter: &HistoryFilter) -> Result<Vec<StoredEntry>, AppError> {
        self.require(Permission::ViewEntriesHistory)?;
        let mut entries = self.entries.list().await?;
        newest_first(&mut entries);
        Ok(self.apply_common(&entries, filter).into_iter().cloned().collect())
    }

    /// Exits matching `filter`, newest first.
    pub async fn exit_history(&self, filter: &HistoryFilter) -> Result<Vec<StoredExit>, AppError> {
        self.require(Permission::ViewExitsHistory)?;
        let mut exits = self.exits.list().await?;
        newest_first(&mut exits);

        let mut selected = self.apply_common(&exits, filter);
        if let Some(setor) = filter.setor.as_deref() {
            selected = filter_by_sector(selected, setor);
        }
        Ok(selected.into_iter().cloned().collect())
    }

    /// Export the filtered entry history; returns the number of rows written.
    pub async fn export_entries(&self, filter: &HistoryFilter, path: impl AsRef<Path>) -> Result<usize, AppError> {
        self.require(Permission::ViewReports)?;
        let offset = self.ctx.offset();
        let rows: Vec<EntryRow> = self
            .entry_history(filter)
            .await?
            .iter()
            .map(|e| EntryRow::from_entry(e, &offset))
            .collect();
        Ok(export_csv(&rows, path)?)
    }

    /// Export the filtered exit history, lot breakdown included.
    pub async fn export_exits(&self, filter: &HistoryFilter, path: impl AsRef<Path>) -> Result<usize, AppError> {
        self.require(Permission::ViewReports)?;
        let offset = self.ctx.offset();
        let rows: Vec<ExitRow> = self
            .exit_history(filter)
            .await?
            .iter()
            .map(|x| ExitRow::from_exit(x, &offset))
            .collect();
        Ok(export_csv(&rows, path)?)
    }

    /// Export the current inventory.
    pub async fn export_inventory(&self, path: impl AsRef<Path>) -> Result<usize, AppError> {
        self.require(Permission::ViewReports)?;
        let rows: Vec<ItemRow> = self
            .list_items()
            .await?
            .iter()
            .map(|item| ItemRow::from_item(item))
            .collect();
        Ok(export_csv(&rows, path)?)
    }
}
