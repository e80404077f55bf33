//! Engine configuration.
//!
//! ```toml
//! max_total_codes = 100000
//! margin_factor = "1.1"
//!
//! [price_feed]
//! refresh_interval_secs = 60
//! fallback_usd_per_btc = "65000"
//! ```
//!
//! Every field has a default; an empty file or a missing file yields
//! [`EngineConfig::default`].

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::distribution::DEFAULT_MAX_TOTAL_CODES;
use crate::engine::summary::default_margin_factor;
use crate::error::{EngineError, Result};

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest run the calculator accepts.
    #[serde(default = "default_max_total_codes")]
    pub max_total_codes: u64,
    /// Multiplier for the margin variant of the suggested retail price.
    #[serde(default = "default_margin_factor")]
    pub margin_factor: Decimal,
    /// Price feed settings.
    #[serde(default)]
    pub price_feed: PriceFeedConfig,
}

/// Price feed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    /// Seconds a fetched price stays fresh.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Price used before the first successful fetch.
    #[serde(default)]
    pub fallback_usd_per_btc: Option<Decimal>,
}

// Default value functions

fn default_max_total_codes() -> u64 {
    DEFAULT_MAX_TOTAL_CODES
}

fn default_refresh_interval_secs() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_total_codes: default_max_total_codes(),
            margin_factor: default_margin_factor(),
            price_feed: PriceFeedConfig::default(),
        }
    }
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            fallback_usd_per_btc: None,
        }
    }
}

impl PriceFeedConfig {
    /// Freshness window as a `Duration`.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_total_codes == 0 {
            return Err(EngineError::Config("max_total_codes must be positive".into()));
        }
        if self.margin_factor < Decimal::ONE {
            return Err(EngineError::Config(format!(
                "margin_factor must be at least 1, got {}",
                self.margin_factor
            )));
        }
        if self.price_feed.refresh_interval_secs == 0 {
            return Err(EngineError::Config(
                "price_feed.refresh_interval_secs must be positive".into(),
            ));
        }
        if let Some(p) = self.price_feed.fallback_usd_per_btc {
            if p <= Decimal::ZERO {
                return Err(EngineError::Config(format!(
                    "price_feed.fallback_usd_per_btc must be positive, got {}",
                    p
                )));
            }
        }
        Ok(())
    }
}
