//! History filters over entry and exit records.
//!
//! Each filter preserves the input order and can be chained, since every one
//! accepts any iterator of references.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use almox_core::Persisted;
use almox_inventory::{Entry, Exit};

/// Common view over ledger records.
pub trait LedgerRecord {
    fn codigo(&self) -> Option<&str>;
    fn created_at(&self) -> DateTime<Utc>;
}

impl LedgerRecord for Entry {
    fn codigo(&self) -> Option<&str> {
        self.codigo.as_deref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl LedgerRecord for Exit {
    fn codigo(&self) -> Option<&str> {
        self.codigo.as_deref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl<I, T: LedgerRecord> LedgerRecord for Persisted<I, T> {
    fn codigo(&self) -> Option<&str> {
        self.record.codigo()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.record.created_at()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Records whose barcode contains `needle` (case-insensitive).
/// A blank needle keeps everything.
pub fn filter_by_code<'a, T, I>(records: I, needle: &str) -> Vec<&'a T>
where
    T: LedgerRecord + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let needle = needle.trim();
    records
        .into_iter()
        .filter(|r| needle.is_empty() || r.codigo().is_some_and(|c| contains_ignore_case(c, needle)))
        .collect()
}

/// Records created on `day`, taking the calendar day in `offset`.
pub fn filter_by_day<'a, T, I>(records: I, day: NaiveDate, offset: &FixedOffset) -> Vec<&'a T>
where
    T: LedgerRecord + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter(|r| r.created_at().with_timezone(offset).date_naive() == day)
        .collect()
}

/// Exits whose destination sector contains `needle` (case-insensitive).
/// A blank needle keeps everything.
pub fn filter_by_sector<'a, T, I>(records: I, needle: &str) -> Vec<&'a T>
where
    T: AsRef<Exit> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let needle = needle.trim();
    records
        .into_iter()
        .filter(|r| needle.is_empty() || contains_ignore_case(&r.as_ref().setor_destino, needle))
        .collect()
}
