//! Stockline configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `STOCKLINE_DB_PATH` | `stockline.db` |
//! | `STOCKLINE_MAX_CONNECTIONS` | `5` |
//! | `STOCKLINE_DISCOUNT_THRESHOLD_CENTS` | `100000` |
//! | `STOCKLINE_DISCOUNT_BPS` | `1000` |
//! | `STOCKLINE_FREE_DELIVERY_THRESHOLD_CENTS` | `50000` |
//! | `STOCKLINE_DELIVERY_FEE_CENTS` | `3000` |
//! | `STOCKLINE_BASE_DELIVERY_DAYS` | `2` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use stockline_core::{Money, PricingPolicy};

use crate::pool::DbConfig;

/// Runtime configuration for a Stockline process.
#[derive(Debug, Clone, Serialize)]
pub struct StocklineConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Discount, delivery fee and delivery time rules
    pub pricing: PricingPolicy,
}

impl Default for StocklineConfig {
    fn default() -> Self {
        StocklineConfig {
            database_path: PathBuf::from("stockline.db"),
            max_connections: 5,
            pricing: PricingPolicy::default(),
        }
    }
}

impl StocklineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StocklineConfig::default();
        let policy = defaults.pricing;

        let config = StocklineConfig {
            database_path: lookup("STOCKLINE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse(&lookup, "STOCKLINE_MAX_CONNECTIONS", defaults.max_connections)?,

            pricing: PricingPolicy {
                discount_threshold: Money::from_cents(parse(
                    &lookup,
                    "STOCKLINE_DISCOUNT_THRESHOLD_CENTS",
                    policy.discount_threshold.cents(),
                )?),
                discount_bps: parse(&lookup, "STOCKLINE_DISCOUNT_BPS", policy.discount_bps)?,
                free_delivery_threshold: Money::from_cents(parse(
                    &lookup,
                    "STOCKLINE_FREE_DELIVERY_THRESHOLD_CENTS",
                    policy.free_delivery_threshold.cents(),
                )?),
                delivery_fee: Money::from_cents(parse(
                    &lookup,
                    "STOCKLINE_DELIVERY_FEE_CENTS",
                    policy.delivery_fee.cents(),
                )?),
                base_delivery_days: parse(
                    &lookup,
                    "STOCKLINE_BASE_DELIVERY_DAYS",
                    policy.base_delivery_days,
                )?,
            },
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("STOCKLINE_MAX_CONNECTIONS".to_string()));
        }
        if config.pricing.discount_threshold.is_negative() {
            return Err(ConfigError::InvalidValue(
                "STOCKLINE_DISCOUNT_THRESHOLD_CENTS".to_string(),
            ));
        }
        if config.pricing.discount_bps > 10_000 {
            return Err(ConfigError::InvalidValue("STOCKLINE_DISCOUNT_BPS".to_string()));
        }
        if config.pricing.free_delivery_threshold.is_negative() {
            return Err(ConfigError::InvalidValue(
                "STOCKLINE_FREE_DELIVERY_THRESHOLD_CENTS".to_string(),
            ));
        }
        if config.pricing.delivery_fee.is_negative() {
            return Err(ConfigError::InvalidValue("STOCKLINE_DELIVERY_FEE_CENTS".to_string()));
        }
        if config.pricing.base_delivery_days < 0 {
            return Err(ConfigError::InvalidValue("STOCKLINE_BASE_DELIVERY_DAYS".to_string()));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }
}

fn parse<T, F>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
