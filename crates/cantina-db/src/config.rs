//! # Runtime Configuration
//!
//! Database location and settings overrides read from the environment.
//!
//! | Variable                     | Example        | Overrides               |
//! |------------------------------|----------------|-------------------------|
//! | `CANTINA_DB_PATH`            | `./cantina.db` | database file           |
//! | `CANTINA_STORE_NAME`         | `La Cantina`   | `system_name`           |
//! | `CANTINA_TAX_RATE`           | `16`           | `tax_rate` (percent)    |
//! | `CANTINA_DOLLAR_RATE`        | `19.50`        | `dollar_rate`           |
//! | `CANTINA_UTC_OFFSET_MINUTES` | `-360`         | `utc_offset_minutes`    |
//!
//! A value that fails to parse is logged and ignored.

use std::path::PathBuf;

use cantina_core::validation::{parse_exchange_rate, parse_percentage_bps, validate_tax_rate_bps};
use cantina_core::{ExchangeRate, GeneralSettings, TaxRate};
use tracing::warn;

use crate::pool::DbConfig;

pub const DEFAULT_DB_PATH: &str = "./cantina.db";

pub const ENV_DB_PATH: &str = "CANTINA_DB_PATH";
pub const ENV_STORE_NAME: &str = "CANTINA_STORE_NAME";
pub const ENV_TAX_RATE: &str = "CANTINA_TAX_RATE";
pub const ENV_DOLLAR_RATE: &str = "CANTINA_DOLLAR_RATE";
pub const ENV_UTC_OFFSET_MINUTES: &str = "CANTINA_UTC_OFFSET_MINUTES";

#[derive(Debug, Clone, PartialEq)]
pub struct PosConfig {
    pub database_path: PathBuf,
    pub store_name: Option<String>,
    pub tax_rate: Option<TaxRate>,
    pub dollar_rate: Option<ExchangeRate>,
    pub utc_offset_minutes: Option<i32>,
}

impl Default for PosConfig {
    fn default() -> Self {
        PosConfig {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            store_name: None,
            tax_rate: None,
            dollar_rate: None,
            utc_offset_minutes: None,
        }
    }
}

impl PosConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = PosConfig::default();

        if let Some(path) = var(ENV_DB_PATH) {
            config.database_path = PathBuf::from(path);
        }
        config.store_name = var(ENV_STORE_NAME);

        if let Some(raw) = var(ENV_TAX_RATE) {
            match parse_percentage_bps("tax rate", &raw)
                .and_then(|bps| validate_tax_rate_bps(bps).map(|_| bps))
            {
                Ok(bps) => config.tax_rate = Some(TaxRate::from_bps(bps)),
                Err(e) => warn!(variable = ENV_TAX_RATE, value = %raw, error = %e, "Ignoring invalid value"),
            }
        }

        if let Some(raw) = var(ENV_DOLLAR_RATE) {
            match parse_exchange_rate(&raw) {
                Ok(rate) => config.dollar_rate = Some(rate),
                Err(e) => warn!(variable = ENV_DOLLAR_RATE, value = %raw, error = %e, "Ignoring invalid value"),
            }
        }

        if let Some(raw) = var(ENV_UTC_OFFSET_MINUTES) {
            match raw.parse::<i32>() {
                Ok(minutes) if minutes.abs() < 24 * 60 => {
                    config.utc_offset_minutes = Some(minutes)
                }
                _ => warn!(variable = ENV_UTC_OFFSET_MINUTES, value = %raw, "Ignoring invalid value"),
            }
        }

        config
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
    }

    /// `settings` with the configured overrides applied.
    pub fn apply(&self, mut settings: GeneralSettings) -> GeneralSettings {
        if let Some(name) = &self.store_name {
            settings.system_name = name.clone();
        }
        if let Some(rate) = self.tax_rate {
            settings.tax_rate = rate;
        }
        if let Some(rate) = self.dollar_rate {
            settings.dollar_rate = rate;
        }
        if let Some(minutes) = self.utc_offset_minutes {
            settings.utc_offset_minutes = minutes;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> PosConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PosConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = config(&[]);
        assert_eq!(config, PosConfig::default());
        assert_eq!(config.apply(GeneralSettings::default()), GeneralSettings::default());
    }

    #[test]
    fn test_overrides_apply() {
        let config = config(&[
            (ENV_DB_PATH, "/var/lib/cantina.db"),
            (ENV_STORE_NAME, "La Cantina"),
            (ENV_TAX_RATE, "8"),
            (ENV_DOLLAR_RATE, "19.50"),
            (ENV_UTC_OFFSET_MINUTES, "-420"),
        ]);
        assert_eq!(config.database_path, PathBuf::from("/var/lib/cantina.db"));

        let settings = config.apply(GeneralSettings::default());
        assert_eq!(settings.system_name, "La Cantina");
        assert_eq!(settings.tax_rate.bps(), 800);
        assert_eq!(settings.dollar_rate.centavos(), 1950);
        assert_eq!(settings.utc_offset_minutes, -420);
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let config = config(&[
            (ENV_TAX_RATE, "dieciséis"),
            (ENV_DOLLAR_RATE, "0"),
            (ENV_UTC_OFFSET_MINUTES, "99999"),
            (ENV_STORE_NAME, "   "),
        ]);
        assert_eq!(config, PosConfig::default());
    }
}
