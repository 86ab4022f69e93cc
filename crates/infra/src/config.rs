//! Configuration loading and representation.
//!
//! Layered the usual way:
//! 1. Defaults in code
//! 2. Optional `config/{environment}.toml`
//! 3. `ALMOX__*` environment variables (after `.env` is loaded)

use std::time::Duration;

use anyhow::Context;
use chrono::{FixedOffset, Offset, Utc};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use almox_inventory::StockThresholds;
use almox_observability::LogFormat;

const ENV_PREFIX: &str = "ALMOX";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Current environment (development, production, test).
    pub environment: String,

    pub stock: StockConfig,

    pub app: AppConfig,

    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockConfig {
    /// Low-stock threshold for items without their own `estoqueMinimo`.
    pub low_stock_default: f64,

    /// Lots expiring within this many days are flagged.
    pub expiry_window_days: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Settle delay before the duplicate-barcode check runs.
    pub duplicate_check_delay_ms: u64,

    /// Re-read/retry attempts after a version conflict on an item write.
    pub max_conflict_retries: u32,

    /// Local offset used to truncate timestamps to calendar days.
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Settings {
    /// Load `.env`, then the layered configuration.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let environment = std::env::var(format!("{ENV_PREFIX}__ENVIRONMENT"))
            .unwrap_or_else(|_| "development".into());

        let config = Self::builder(&environment)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("building configuration")?;

        Self::from_config(config)
    }

    /// Defaults plus the optional per-environment file.
    pub fn builder(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self::default();
        Ok(Config::builder()
            .set_default("environment", environment)?
            .set_default("stock.low_stock_default", defaults.stock.low_stock_default)?
            .set_default("stock.expiry_window_days", defaults.stock.expiry_window_days)?
            .set_default("app.duplicate_check_delay_ms", defaults.app.duplicate_check_delay_ms as i64)?
            .set_default("app.max_conflict_retries", i64::from(defaults.app.max_conflict_retries))?
            .set_default("app.utc_offset_minutes", i64::from(defaults.app.utc_offset_minutes))?
            .set_default("log.format", "json")?
            .add_source(File::with_name(&format!("config/{environment}")).required(false)))
    }

    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let settings: Self = config
            .try_deserialize()
            .context("deserializing configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.stock.low_stock_default >= 0.0,
            "stock.low_stock_default must not be negative"
        );
        anyhow::ensure!(
            self.stock.expiry_window_days >= 0,
            "stock.expiry_window_days must not be negative"
        );
        anyhow::ensure!(
            self.configured_offset().is_some(),
            "app.utc_offset_minutes out of range: {}",
            self.app.utc_offset_minutes
        );
        Ok(())
    }

    pub fn thresholds(&self) -> StockThresholds {
        StockThresholds {
            low_stock_default: self.stock.low_stock_default,
            expiry_window_days: self.stock.expiry_window_days,
        }
    }

    pub fn duplicate_check_delay(&self) -> Duration {
        Duration::from_millis(self.app.duplicate_check_delay_ms)
    }

    fn configured_offset(&self) -> Option<FixedOffset> {
        self.app
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }

    /// Local offset; UTC if the configured value is out of range.
    pub fn local_offset(&self) -> FixedOffset {
        self.configured_offset().unwrap_or(Utc.fix())
    }
}

impl Default for Settings {
    fn default() -> Self {
        let thresholds = StockThresholds::default();
        Self {
            environment: "development".to_string(),
            stock: StockConfig {
                low_stock_default: thresholds.low_stock_default,
                expiry_window_days: thresholds.expiry_window_days,
            },
            app: AppConfig {
                duplicate_check_delay_ms: 500,
                max_conflict_retries: 3,
                // America/Sao_Paulo
                utc_offset_minutes: -180,
            },
            log: LogConfig {
                format: LogFormat::Json,
            },
        }
    }
}
