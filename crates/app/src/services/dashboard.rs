//! Dashboard: headline numbers, alerts and today's movements.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use almox_auth::Permission;
use almox_core::ItemId;
use almox_inventory::stock_state::{expiring, low_stock, summarize};
use almox_inventory::{ExpiryStatus, InventorySummary, StoredItem};

use crate::context::Session;
use crate::error::AppError;

/// A lot flagged by the expiry alert, detached from the item list.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiringLot {
    pub item_id: ItemId,
    pub nome: String,
    pub codigo: Option<String>,
    pub validade: NaiveDate,
    pub quantidade: f64,
    pub status: ExpiryStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub summary: InventorySummary,
    pub low_stock: Vec<StoredItem>,
    pub expiring: Vec<ExpiringLot>,
    pub entries_today: usize,
    pub exits_today: usize,
}

impl Session {
    /// `[start, end)` of the current local calendar day, in UTC.
    fn today_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let offset = self.ctx.offset();
        let midnight = self.ctx.local_now().date().and_time(NaiveTime::MIN);
        let start = (midnight - offset).and_utc();
        (start, start + Duration::days(1))
    }

    pub async fn dashboard(&self) -> Result<Dashboard, AppError> {
        self.require(Permission::ViewDashboard)?;

        let items = self.items.list().await?;
        self.replace_cache(items.clone());

        let thresholds = self.ctx.settings().thresholds();
        let now = self.ctx.local_now();

        let summary = summarize(&items, now, &thresholds);
        let low = low_stock(&items, thresholds.low_stock_default)
            .into_iter()
            .cloned()
            .collect();
        let alerts = expiring(&items, now, thresholds.expiry_window_days)
            .into_iter()
            .map(|alert| ExpiringLot {
                item_id: alert.item.id.clone(),
                nome: alert.item.nome.clone(),
                codigo: alert.item.codigo.clone(),
                validade: alert.validade,
                quantidade: alert.quantidade,
                status: alert.status,
            })
            .collect();

        let (start, end) = self.today_bounds();
        let entries_today = self.entries.between(start, end).await?.len();
        let exits_today = self.exits.between(start, end).await?.len();

        tracing::debug!(
            items = summary.total_items,
            low_stock = summary.low_stock,
            expired = summary.expired,
            expiring = summary.expiring,
            "dashboard computed"
        );

        Ok(Dashboard {
            summary,
            low_stock: low,
            expiring: alerts,
            entries_today,
            exits_today,
        })
    }
}
