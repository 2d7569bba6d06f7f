//! # Table Repository
//!
//! The floor plan under `pos_tables`.

use cantina_core::{Order, Table};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::storage::{get_json_or_default, set_json, StorageKey};

pub(crate) async fn load(conn: &mut SqliteConnection) -> DbResult<Vec<Table>> {
    get_json_or_default(conn, StorageKey::Tables).await
}

pub(crate) async fn store(conn: &mut SqliteConnection, tables: &[Table]) -> DbResult<()> {
    set_json(conn, StorageKey::Tables, tables).await
}

/// Marks the order's table occupied and linked to it.
pub(crate) async fn occupy(
    conn: &mut SqliteConnection,
    table_id: &str,
    order: &Order,
) -> DbResult<Table> {
    let mut tables = load(conn).await?;
    let table = tables
        .iter_mut()
        .find(|t| t.id == table_id)
        .ok_or_else(|| DbError::not_found("Table", table_id))?;

    table.occupy(&order.id, order.customer.clone(), order.waiter.clone());
    let occupied = table.clone();
    debug!(table_id, order_id = %order.id, "Table occupied");

    store(conn, &tables).await?;
    Ok(occupied)
}

/// Frees the table. Unknown ids are ignored so a deleted table never blocks
/// a payment.
pub(crate) async fn release(
    conn: &mut SqliteConnection,
    table_id: &str,
) -> DbResult<Option<Table>> {
    let mut tables = load(conn).await?;
    let Some(table) = tables.iter_mut().find(|t| t.id == table_id) else {
        debug!(table_id, "Released table is not on the floor plan");
        return Ok(None);
    };

    table.release();
    let released = table.clone();
    debug!(table_id, "Table released");

    store(conn, &tables).await?;
    Ok(Some(released))
}

/// Repository for the floor plan.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Table>> {
        let mut conn = self.pool.acquire().await?;
        load(&mut conn).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Table>> {
        Ok(self.list().await?.into_iter().find(|t| t.id == id))
    }

    /// Replaces the table with the same id, or adds it to the floor plan.
    pub async fn upsert(&self, table: &Table) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        let mut tables = load(&mut conn).await?;
        match tables.iter_mut().find(|t| t.id == table.id) {
            Some(existing) => *existing = table.clone(),
            None => tables.push(table.clone()),
        }
        debug!(table_id = %table.id, number = table.number, "Upserting table");
        store(&mut conn, &tables).await
    }

    pub async fn occupy(&self, table_id: &str, order: &Order) -> DbResult<Table> {
        let mut conn = self.pool.acquire().await?;
        occupy(&mut conn, table_id, order).await
    }

    pub async fn release(&self, table_id: &str) -> DbResult<Option<Table>> {
        let mut conn = self.pool.acquire().await?;
        release(&mut conn, table_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cantina_core::{TablePosition, TableStatus};

    fn table(id: &str, number: u32) -> Table {
        Table {
            id: id.to_string(),
            number,
            seats: 4,
            status: TableStatus::Available,
            waiter: None,
            customer: None,
            order_id: None,
            position: TablePosition { x: 0, y: 0 },
        }
    }

    #[tokio::test]
    async fn test_occupy_and_release() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();
        repo.upsert(&table("t1", 1)).await.unwrap();
        repo.upsert(&table("t2", 2)).await.unwrap();

        let mut order = Order::dine_in("t1", Some("Juan".to_string()));
        order.customer = Some("Ana".to_string());

        let occupied = repo.occupy("t1", &order).await.unwrap();
        assert_eq!(occupied.status, TableStatus::Occupied);
        assert_eq!(occupied.order_id.as_deref(), Some(order.id.as_str()));
        assert_eq!(occupied.waiter.as_deref(), Some("Juan"));

        let released = repo.release("t1").await.unwrap().unwrap();
        assert_eq!(released.status, TableStatus::Available);
        assert!(released.order_id.is_none());

        assert_eq!(repo.get("t2").await.unwrap().unwrap().status, TableStatus::Available);
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();
        let order = Order::dine_in("t9", None);

        assert!(matches!(
            repo.occupy("t9", &order).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(repo.release("t9").await.unwrap().is_none());
    }
}
