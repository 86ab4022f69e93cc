//! Display formatting for dates, quantities and batch breakdowns (pt-BR).

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use almox_inventory::BatchConsumed;

const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Anything that denotes an instant.
pub trait ToDateTime {
    fn to_date(&self) -> DateTime<Utc>;
}

impl ToDateTime for DateTime<Utc> {
    fn to_date(&self) -> DateTime<Utc> {
        *self
    }
}

impl ToDateTime for DateTime<FixedOffset> {
    fn to_date(&self) -> DateTime<Utc> {
        self.with_timezone(&Utc)
    }
}

/// Timestamp as the document store returns it (seconds + nanoseconds since
/// the Unix epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl StoreTimestamp {
    pub fn from_date(instant: DateTime<Utc>) -> Self {
        Self {
            seconds: instant.timestamp(),
            nanoseconds: instant.timestamp_subsec_nanos(),
        }
    }
}

impl ToDateTime for StoreTimestamp {
    fn to_date(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.seconds, self.nanoseconds).unwrap_or_default()
    }
}

/// `dd/mm/aaaa HH:MM` in the given offset; empty for a missing value.
pub fn format_date<T: ToDateTime + ?Sized>(value: Option<&T>, offset: &FixedOffset) -> String {
    match value {
        Some(v) => v.to_date().with_timezone(offset).format(DATE_TIME_FORMAT).to_string(),
        None => String::new(),
    }
}

/// `dd/mm/aaaa`; empty for a missing date.
pub fn format_day(day: Option<NaiveDate>) -> String {
    day.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Quantity with a decimal comma; whole numbers print without decimals.
pub fn format_quantidade(quantidade: f64) -> String {
    if quantidade.fract() == 0.0 {
        format!("{quantidade:.0}")
    } else {
        quantidade.to_string().replace('.', ",")
    }
}

/// One line per consumed lot, for a single spreadsheet cell.
pub fn format_batches_consumed(consumed: &[BatchConsumed]) -> String {
    consumed
        .iter()
        .map(|c| match c.validity {
            Some(day) => format!("Validade {}: {}", format_day(Some(day)), format_quantidade(c.consumed)),
            None => format!("Sem validade: {}", format_quantidade(c.consumed)),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
