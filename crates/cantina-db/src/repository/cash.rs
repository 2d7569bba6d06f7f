//! # Cash Repository
//!
//! The movement log (`pos_cash_movements`) and closure log
//! (`pos_cash_closures`). Both are append-only.

use cantina_core::{CashClosure, CashLedger, CashMovement, GeneralSettings};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::storage::{get_json_or_default, set_json, StorageKey};

pub(crate) async fn load_movements(conn: &mut SqliteConnection) -> DbResult<Vec<CashMovement>> {
    get_json_or_default(conn, StorageKey::CashMovements).await
}

pub(crate) async fn load_closures(conn: &mut SqliteConnection) -> DbResult<Vec<CashClosure>> {
    get_json_or_default(conn, StorageKey::CashClosures).await
}

/// Both logs wrapped in a ledger.
pub(crate) async fn load_ledger(
    conn: &mut SqliteConnection,
    settings: &GeneralSettings,
) -> DbResult<CashLedger> {
    let movements = load_movements(conn).await?;
    let closures = load_closures(conn).await?;
    Ok(CashLedger::new(movements, closures, settings))
}

/// Writes both logs back.
pub(crate) async fn store_ledger(conn: &mut SqliteConnection, ledger: &CashLedger) -> DbResult<()> {
    set_json(conn, StorageKey::CashMovements, ledger.movements()).await?;
    set_json(conn, StorageKey::CashClosures, ledger.closures()).await
}

pub(crate) async fn append_movement(
    conn: &mut SqliteConnection,
    movement: &CashMovement,
) -> DbResult<()> {
    let mut movements = load_movements(conn).await?;
    debug!(
        kind = ?movement.movement_type,
        amount = %movement.amount,
        "Appending cash movement"
    );
    movements.push(movement.clone());
    set_json(conn, StorageKey::CashMovements, &movements).await
}

/// Repository for the cash drawer logs.
#[derive(Debug, Clone)]
pub struct CashRepository {
    pool: SqlitePool,
}

impl CashRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashRepository { pool }
    }

    pub async fn movements(&self) -> DbResult<Vec<CashMovement>> {
        let mut conn = self.pool.acquire().await?;
        load_movements(&mut conn).await
    }

    pub async fn closures(&self) -> DbResult<Vec<CashClosure>> {
        let mut conn = self.pool.acquire().await?;
        load_closures(&mut conn).await
    }

    pub async fn load_ledger(&self, settings: &GeneralSettings) -> DbResult<CashLedger> {
        let mut conn = self.pool.acquire().await?;
        load_ledger(&mut conn, settings).await
    }

    pub async fn append_movement(&self, movement: &CashMovement) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        append_movement(&mut conn, movement).await
    }

    pub async fn append_closure(&self, closure: &CashClosure) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        let mut closures = load_closures(&mut conn).await?;
        debug!(closure_id = %closure.id, status = ?closure.status, "Appending cash closure");
        closures.push(closure.clone());
        set_json(&mut conn, StorageKey::CashClosures, &closures).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cantina_core::{CashMovementType, Money};
    use chrono::Utc;

    #[tokio::test]
    async fn test_ledger_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.cash();
        let settings = GeneralSettings::default();
        let now = Utc::now();

        repo.append_movement(&CashMovement::new(
            CashMovementType::Opening,
            Money::from_major(1000),
            "Apertura de caja",
            "María",
            now,
        ))
        .await
        .unwrap();
        repo.append_movement(&CashMovement::new(
            CashMovementType::Expense,
            Money::from_major(50),
            "Hielo",
            "María",
            now,
        ))
        .await
        .unwrap();

        let ledger = repo.load_ledger(&settings).await.unwrap();
        assert_eq!(ledger.movements().len(), 2);
        assert_eq!(ledger.movements()[1].amount, Money::from_major(-50));
        assert!(ledger.current_session(now).is_some());
        assert!(repo.closures().await.unwrap().is_empty());
    }
}
