//! # Key/Value Store
//!
//! One JSON document per logical domain, in the `kv_store` table.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────┬──────────────┐
//! │ key                  │ value (JSON text)            │ updated_at   │
//! ├──────────────────────┼──────────────────────────────┼──────────────┤
//! │ pos_orders           │ [{"id":"…","items":[…]}, …]  │ 2024-01-15…  │
//! │ pos_tables           │ [{"id":"t1","number":1}, …]  │ 2024-01-15…  │
//! │ pos_dollar_rate      │ 1950                         │ 2024-01-15…  │
//! └──────────────────────┴──────────────────────────────┴──────────────┘
//! ```
//!
//! The free functions take a `&mut SqliteConnection`, so the same calls run
//! on a pooled connection or inside a transaction (`&mut *tx`).

use std::fmt;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Logical domains persisted by the POS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    User,
    Tables,
    Orders,
    Products,
    Categories,
    CashMovements,
    CashClosures,
    TicketTemplate,
    GeneralSettings,
    DollarRate,
    Tickets,
}

impl StorageKey {
    pub const ALL: [StorageKey; 11] = [
        StorageKey::User,
        StorageKey::Tables,
        StorageKey::Orders,
        StorageKey::Products,
        StorageKey::Categories,
        StorageKey::CashMovements,
        StorageKey::CashClosures,
        StorageKey::TicketTemplate,
        StorageKey::GeneralSettings,
        StorageKey::DollarRate,
        StorageKey::Tickets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::User => "pos_user",
            StorageKey::Tables => "pos_tables",
            StorageKey::Orders => "pos_orders",
            StorageKey::Products => "pos_products",
            StorageKey::Categories => "pos_categories",
            StorageKey::CashMovements => "pos_cash_movements",
            StorageKey::CashClosures => "pos_cash_closures",
            StorageKey::TicketTemplate => "pos_ticket_template",
            StorageKey::GeneralSettings => "pos_general_settings",
            StorageKey::DollarRate => "pos_dollar_rate",
            StorageKey::Tickets => "pos_tickets",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

/// Reads and decodes the document stored under `key`.
pub async fn get_json<T: DeserializeOwned>(
    conn: &mut SqliteConnection,
    key: StorageKey,
) -> DbResult<Option<T>> {
    let raw: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
        .bind(key.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Like [`get_json`], with `T::default()` for a missing key.
pub async fn get_json_or_default<T: DeserializeOwned + Default>(
    conn: &mut SqliteConnection,
    key: StorageKey,
) -> DbResult<T> {
    Ok(get_json(conn, key).await?.unwrap_or_default())
}

/// Encodes `value` and replaces the document under `key`.
pub async fn set_json<T: Serialize + ?Sized>(
    conn: &mut SqliteConnection,
    key: StorageKey,
    value: &T,
) -> DbResult<()> {
    let json = serde_json::to_string(value)?;
    debug!(key = %key, bytes = json.len(), "Writing document");

    sqlx::query(
        r#"
        INSERT INTO kv_store (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key.as_str())
    .bind(json)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Deletes the document under `key`. Returns whether one existed.
pub async fn remove_key(conn: &mut SqliteConnection, key: StorageKey) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
        .bind(key.as_str())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Pool-level store
// =============================================================================

/// The key/value store over the connection pool.
#[derive(Debug, Clone)]
pub struct KvStore {
    pool: SqlitePool,
}

impl KvStore {
    pub fn new(pool: SqlitePool) -> Self {
        KvStore { pool }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: StorageKey) -> DbResult<Option<T>> {
        let mut conn = self.pool.acquire().await?;
        get_json(&mut conn, key).await
    }

    pub async fn get_or_default<T: DeserializeOwned + Default>(
        &self,
        key: StorageKey,
    ) -> DbResult<T> {
        let mut conn = self.pool.acquire().await?;
        get_json_or_default(&mut conn, key).await
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        set_json(&mut conn, key, value).await
    }

    pub async fn remove(&self, key: StorageKey) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        remove_key(&mut conn, key).await
    }
}
