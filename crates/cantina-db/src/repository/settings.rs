//! # Settings Repository
//!
//! General settings, the last dollar rate and the ticket template. Missing
//! documents read as their defaults.

use cantina_core::{ExchangeRate, GeneralSettings, TicketTemplate};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::DbResult;
use crate::storage::{get_json, get_json_or_default, set_json, StorageKey};

pub(crate) async fn load_general(conn: &mut SqliteConnection) -> DbResult<GeneralSettings> {
    get_json_or_default(conn, StorageKey::GeneralSettings).await
}

/// The stored dollar rate, falling back to the one in general settings.
pub(crate) async fn load_dollar_rate(
    conn: &mut SqliteConnection,
    settings: &GeneralSettings,
) -> DbResult<ExchangeRate> {
    Ok(get_json(conn, StorageKey::DollarRate)
        .await?
        .unwrap_or(settings.dollar_rate))
}

/// Repository for store configuration.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    pub async fn general(&self) -> DbResult<GeneralSettings> {
        let mut conn = self.pool.acquire().await?;
        load_general(&mut conn).await
    }

    /// Validates and stores the general settings.
    pub async fn save_general(&self, settings: &GeneralSettings) -> DbResult<()> {
        settings.validate()?;
        let mut conn = self.pool.acquire().await?;
        set_json(&mut conn, StorageKey::GeneralSettings, settings).await?;
        info!(system_name = %settings.system_name, "General settings saved");
        Ok(())
    }

    pub async fn dollar_rate(&self) -> DbResult<ExchangeRate> {
        let mut conn = self.pool.acquire().await?;
        let settings = load_general(&mut conn).await?;
        load_dollar_rate(&mut conn, &settings).await
    }

    pub async fn save_dollar_rate(&self, rate: ExchangeRate) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        set_json(&mut conn, StorageKey::DollarRate, &rate).await
    }

    pub async fn ticket_template(&self) -> DbResult<TicketTemplate> {
        let mut conn = self.pool.acquire().await?;
        get_json_or_default(&mut conn, StorageKey::TicketTemplate).await
    }

    pub async fn save_ticket_template(&self, template: &TicketTemplate) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        set_json(&mut conn, StorageKey::TicketTemplate, template).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use cantina_core::TaxRate;

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        assert_eq!(repo.general().await.unwrap(), GeneralSettings::default());
        assert_eq!(repo.dollar_rate().await.unwrap().centavos(), 1900);
        assert_eq!(repo.ticket_template().await.unwrap(), TicketTemplate::default());
    }

    #[tokio::test]
    async fn test_dollar_rate_overrides_settings() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        repo.save_dollar_rate(ExchangeRate::new(1950).unwrap())
            .await
            .unwrap();
        assert_eq!(repo.dollar_rate().await.unwrap().centavos(), 1950);
    }

    #[tokio::test]
    async fn test_invalid_settings_are_refused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        let settings = GeneralSettings {
            tax_rate: TaxRate::from_bps(20_000),
            ..GeneralSettings::default()
        };
        assert!(matches!(
            repo.save_general(&settings).await,
            Err(DbError::Domain(_))
        ));
        assert_eq!(repo.general().await.unwrap(), GeneralSettings::default());
    }
}
