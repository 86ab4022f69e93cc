//! Derived inventory states: low stock and expiring/expired lots.
//!
//! Recomputed from the full item list on every read. Catalogs are in the
//! hundreds to low thousands of items, so a linear scan is enough.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::consumption::QUANTITY_EPSILON;
use crate::item::{Batch, Item};

/// Label shown for lots whose expiry date has passed.
pub const VENCIDO: &str = "VENCIDO";

const SECONDS_PER_DAY: i64 = 86_400;

/// Thresholds driving the dashboard alerts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockThresholds {
    /// Used for items without their own `estoque_minimo`.
    pub low_stock_default: f64,
    /// Lots expiring within this many days are flagged.
    pub expiry_window_days: i64,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            low_stock_default: 5.0,
            expiry_window_days: 30,
        }
    }
}

/// Whole days from `now` until the start of `validade`, rounded down.
pub fn days_until_expiry(validade: NaiveDate, now: NaiveDateTime) -> i64 {
    let remaining = validade.and_time(NaiveTime::MIN) - now;
    // `num_seconds` truncates toward zero; step down for a negative fraction.
    let seconds = remaining.num_seconds() - i64::from(remaining.subsec_nanos() < 0);
    seconds.div_euclid(SECONDS_PER_DAY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    Expired,
    ExpiresIn(i64),
}

impl ExpiryStatus {
    fn from_days(days: i64) -> Self {
        if days < 0 {
            ExpiryStatus::Expired
        } else {
            ExpiryStatus::ExpiresIn(days)
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, ExpiryStatus::Expired)
    }

    /// Day count, `None` once expired.
    pub fn days_until_expiry(&self) -> Option<i64> {
        match self {
            ExpiryStatus::Expired => None,
            ExpiryStatus::ExpiresIn(days) => Some(*days),
        }
    }
}

impl core::fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExpiryStatus::Expired => f.write_str(VENCIDO),
            ExpiryStatus::ExpiresIn(1) => f.write_str("1 dia"),
            ExpiryStatus::ExpiresIn(days) => write!(f, "{days} dias"),
        }
    }
}

/// An item with a lot that has expired or expires within the window.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiryAlert<'a, T> {
    pub item: &'a T,
    pub validade: NaiveDate,
    pub quantidade: f64,
    pub status: ExpiryStatus,
}

pub fn is_low_stock(item: &Item, default_threshold: f64) -> bool {
    item.quantidade() <= item.estoque_minimo.unwrap_or(default_threshold)
}

/// Items at or below their low-stock threshold, in source order.
pub fn low_stock<T: AsRef<Item>>(items: &[T], default_threshold: f64) -> Vec<&T> {
    items
        .iter()
        .filter(|i| is_low_stock(i.as_ref(), default_threshold))
        .collect()
}

fn soonest_dated_lot(item: &Item) -> Option<&Batch> {
    item.validades()
        .iter()
        .filter(|b| b.quantidade > QUANTITY_EPSILON)
        .filter(|b| b.validade.is_some())
        .min_by_key(|b| b.validade)
}

/// Items whose soonest-expiring stocked lot is expired or due within
/// `window_days` of `now`, in source order.
///
/// Drained lots (quantity zero) are ignored.
pub fn expiring<T: AsRef<Item>>(
    items: &[T],
    now: NaiveDateTime,
    window_days: i64,
) -> Vec<ExpiryAlert<'_, T>> {
    items
        .iter()
        .filter_map(|entry| {
            let lot = soonest_dated_lot(entry.as_ref())?;
            let validade = lot.validade?;
            let days = days_until_expiry(validade, now);
            if days > window_days {
                return None;
            }
            Some(ExpiryAlert {
                item: entry,
                validade,
                quantidade: lot.quantidade,
                status: ExpiryStatus::from_days(days),
            })
        })
        .collect()
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_units: f64,
    pub low_stock: usize,
    pub expired: usize,
    pub expiring: usize,
}

pub fn summarize<T: AsRef<Item>>(
    items: &[T],
    now: NaiveDateTime,
    thresholds: &StockThresholds,
) -> InventorySummary {
    let alerts = expiring(items, now, thresholds.expiry_window_days);
    let expired = alerts.iter().filter(|a| a.status.is_expired()).count();

    InventorySummary {
        total_items: items.len(),
        total_units: items.iter().map(|i| i.as_ref().quantidade()).sum(),
        low_stock: low_stock(items, thresholds.low_stock_default).len(),
        expired,
        expiring: alerts.len() - expired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NewItem;
    use chrono::{DateTime, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn item(nome: &str, lots: &[(f64, Option<NaiveDate>)]) -> Item {
        let mut item = Item::create(
            NewItem {
                nome: nome.to_string(),
                ..NewItem::default()
            },
            test_time(),
        )
        .unwrap();
        for (q, validade) in lots {
            item.receive(*q, *validade, test_time()).unwrap();
        }
        item
    }

    #[test]
    fn days_until_expiry_floors_partial_days() {
        let now = at(2024, 1, 1, 10);
        assert_eq!(days_until_expiry(date(2024, 1, 2), now), 0);
        assert_eq!(days_until_expiry(date(2024, 1, 3), now), 1);
        assert_eq!(days_until_expiry(date(2024, 1, 1), now), -1);
    }

    #[test]
    fn lot_is_vencido_as_soon_as_its_day_starts() {
        let just_after_midnight = date(2024, 1, 1).and_hms_milli_opt(0, 0, 0, 500).unwrap();
        assert_eq!(days_until_expiry(date(2024, 1, 1), just_after_midnight), -1);
        assert_eq!(days_until_expiry(date(2024, 1, 2), just_after_midnight), 0);
        assert_eq!(days_until_expiry(date(2023, 12, 30), just_after_midnight), -3);

        let items = vec![item("Insulina", &[(2.0, Some(date(2024, 1, 1)))])];
        let alerts = expiring(&items, just_after_midnight, 30);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].status, ExpiryStatus::Expired);
    }

    #[test]
    fn low_stock_uses_item_threshold_before_default() {
        let mut own_threshold = item("Toner", &[(8.0, None)]);
        own_threshold.estoque_minimo = Some(10.0);
        let plenty = item("Papel", &[(50.0, None)]);
        let at_default = item("Clips", &[(5.0, None)]);
        let empty = item("Grampos", &[]);

        let items = vec![own_threshold, plenty, at_default, empty];
        let low: Vec<&str> = low_stock(&items, 5.0).iter().map(|i| i.nome.as_str()).collect();
        assert_eq!(low, vec!["Toner", "Clips", "Grampos"]);
    }

    #[test]
    fn past_lot_is_reported_as_vencido() {
        let items = vec![item("Soro", &[(3.0, Some(date(2023, 12, 31)))])];
        let alerts = expiring(&items, at(2024, 1, 1, 0), 30);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].status, ExpiryStatus::Expired);
        assert_eq!(alerts[0].status.to_string(), "VENCIDO");
        assert_eq!(alerts[0].status.days_until_expiry(), None);
    }

    #[test]
    fn lot_on_window_boundary_is_included_with_window_days() {
        let items = vec![item("Vacina", &[(1.0, Some(date(2024, 1, 31)))])];
        let alerts = expiring(&items, at(2024, 1, 1, 0), 30);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].status, ExpiryStatus::ExpiresIn(30));
        assert_eq!(alerts[0].status.to_string(), "30 dias");
    }

    #[test]
    fn lots_beyond_window_and_drained_lots_are_ignored() {
        let mut drained = item("Antisséptico", &[(2.0, Some(date(2023, 6, 1))), (4.0, None)]);
        drained.consume(2.0, test_time()).unwrap();
        let far = item("Café", &[(10.0, Some(date(2024, 3, 1)))]);
        let undated = item("Vassoura", &[(2.0, None)]);

        let items = vec![drained, far, undated];
        assert!(expiring(&items, at(2024, 1, 1, 0), 30).is_empty());
    }

    #[test]
    fn soonest_lot_decides_and_source_order_is_kept() {
        let a = item(
            "Dipirona",
            &[(5.0, Some(date(2024, 1, 20))), (5.0, Some(date(2024, 1, 5)))],
        );
        let b = item("Gaze", &[(1.0, Some(date(2024, 1, 2)))]);
        let items = vec![a, b];

        let alerts = expiring(&items, at(2024, 1, 1, 0), 30);
        let names: Vec<&str> = alerts.iter().map(|a| a.item.nome.as_str()).collect();
        assert_eq!(names, vec!["Dipirona", "Gaze"]);
        assert_eq!(alerts[0].validade, date(2024, 1, 5));
        assert_eq!(alerts[0].status, ExpiryStatus::ExpiresIn(4));
        assert_eq!(alerts[1].status.to_string(), "1 dia");
    }

    #[test]
    fn summary_counts_each_state() {
        let items = vec![
            item("Soro", &[(3.0, Some(date(2023, 12, 1)))]),
            item("Vacina", &[(20.0, Some(date(2024, 1, 10)))]),
            item("Papel", &[(100.0, None)]),
        ];
        let summary = summarize(&items, at(2024, 1, 1, 0), &StockThresholds::default());

        assert_eq!(
            summary,
            InventorySummary {
                total_items: 3,
                total_units: 123.0,
                low_stock: 1,
                expired: 1,
                expiring: 1,
            }
        );
    }
}
