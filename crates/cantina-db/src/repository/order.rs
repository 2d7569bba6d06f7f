//! # Order Repository
//!
//! Orders are stored as one array under `pos_orders`, in creation order.

use cantina_core::{Order, OrderStatus};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::storage::{get_json_or_default, set_json, StorageKey};

pub(crate) async fn load(conn: &mut SqliteConnection) -> DbResult<Vec<Order>> {
    get_json_or_default(conn, StorageKey::Orders).await
}

pub(crate) async fn store(conn: &mut SqliteConnection, orders: &[Order]) -> DbResult<()> {
    set_json(conn, StorageKey::Orders, orders).await
}

/// Appends a new order. Fails if the id is already stored.
pub(crate) async fn insert(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    let mut orders = load(conn).await?;
    if orders.iter().any(|o| o.id == order.id) {
        return Err(DbError::duplicate("order id", &order.id));
    }
    debug!(order_id = %order.id, status = %order.status, "Inserting order");
    orders.push(order.clone());
    store(conn, &orders).await
}

/// Replaces the stored order with the same id, or appends it.
pub(crate) async fn upsert(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    let mut orders = load(conn).await?;
    debug!(order_id = %order.id, status = %order.status, "Upserting order");
    match orders.iter_mut().find(|o| o.id == order.id) {
        Some(existing) => *existing = order.clone(),
        None => orders.push(order.clone()),
    }
    store(conn, &orders).await
}

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let mut conn = self.pool.acquire().await?;
        load(&mut conn).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        Ok(self.list().await?.into_iter().find(|o| o.id == id))
    }

    /// Orders in `status`, e.g. the kitchen's `Preparing` queue.
    pub async fn list_by_status(&self, status: OrderStatus) -> DbResult<Vec<Order>> {
        let orders = self.list().await?;
        let matching: Vec<Order> = orders.into_iter().filter(|o| o.status == status).collect();
        debug!(status = %status, count = matching.len(), "Listed orders by status");
        Ok(matching)
    }

    pub async fn upsert(&self, order: &Order) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert(&mut conn, order).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cantina_core::{Money, OrderType};

    fn order(name: &str) -> Order {
        let mut order = Order::new(OrderType::Takeout);
        order
            .add_line("p1", name, Money::from_major(50), None, vec![], 1, None)
            .unwrap();
        order
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let mut first = order("Torta");
        repo.upsert(&first).await.unwrap();
        repo.upsert(&order("Agua")).await.unwrap();

        first.customer = Some("Ana".to_string());
        repo.upsert(&first).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(
            repo.get(&first.id).await.unwrap().unwrap().customer.as_deref(),
            Some("Ana")
        );
        assert!(repo.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_refuses_duplicate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = order("Torta");

        let mut conn = db.pool().acquire().await.unwrap();
        insert(&mut conn, &order).await.unwrap();
        assert!(matches!(
            insert(&mut conn, &order).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let draft = order("Torta");
        let mut active = order("Agua");
        active.save(chrono::Utc::now()).unwrap();
        repo.upsert(&draft).await.unwrap();
        repo.upsert(&active).await.unwrap();

        let found = repo.list_by_status(OrderStatus::Active).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, active.id);
    }
}
