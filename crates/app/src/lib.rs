//! `almox-app` — application layer of the almoxarifado.
//!
//! Wires the document store, the identity provider and configuration into a
//! signed-in [`Session`] whose methods are the permission-gated use cases
//! (catalog, entries, exits, dashboard, history and export).

pub mod clock;
pub mod context;
pub mod duplicate_check;
pub mod error;
pub mod services;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{AppContext, Session};
pub use duplicate_check::{CodeCheck, DuplicateCodeCheck, PendingCheck};
pub use error::AppError;
pub use services::dashboard::{Dashboard, ExpiringLot};
pub use services::history::HistoryFilter;

/// Load settings and install logging. For binaries and manual runs.
pub fn bootstrap() -> anyhow::Result<almox_infra::Settings> {
    let settings = almox_infra::Settings::load()?;
    almox_observability::init(settings.log.format);
    tracing::info!(environment = %settings.environment, "almoxarifado configured");
    Ok(settings)
}
