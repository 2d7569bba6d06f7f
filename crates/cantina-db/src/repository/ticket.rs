//! # Ticket Repository
//!
//! Issued tickets under `pos_tickets`, oldest first.

use cantina_core::Ticket;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::storage::{get_json_or_default, set_json, StorageKey};

pub(crate) async fn append(conn: &mut SqliteConnection, ticket: &Ticket) -> DbResult<()> {
    let mut tickets: Vec<Ticket> = get_json_or_default(conn, StorageKey::Tickets).await?;
    debug!(ticket = %ticket.number, order_id = %ticket.order.id, "Storing ticket");
    tickets.push(ticket.clone());
    set_json(conn, StorageKey::Tickets, &tickets).await
}

/// Repository for issued tickets.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TicketRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Ticket>> {
        let mut conn = self.pool.acquire().await?;
        get_json_or_default(&mut conn, StorageKey::Tickets).await
    }

    /// The ticket issued for an order, for reprints.
    pub async fn for_order(&self, order_id: &str) -> DbResult<Option<Ticket>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|t| t.order.id == order_id))
    }

    pub async fn append(&self, ticket: &Ticket) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        append(&mut conn, ticket).await
    }
}
