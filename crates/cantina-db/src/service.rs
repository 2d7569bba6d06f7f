//! # POS Service
//!
//! The operations that touch more than one document, each run as a single
//! transaction.
//!
//! ```text
//! save_order                          settle_payment
//! ──────────                          ──────────────
//! Order::save            (pure)       PaymentProcessor::process   (pure)
//!   │                                   │  InsufficientFunds → return, nothing written
//!   ▼                                   ▼
//! BEGIN                               BEGIN
//!   pos_orders  += order                pos_orders          order → completed
//!   pos_tables  table → occupied        pos_tables          table → available
//! COMMIT                                pos_cash_movements  += sale (cash only)
//!                                       pos_tickets         += ticket
//!                                     COMMIT
//! ```
//!
//! Writes are read-modify-write over whole documents, so they are
//! serialized by a lock held from `BEGIN` to `COMMIT`.

use std::sync::{Arc, RwLock};

use cantina_core::cash::generate_cash_report;
use cantina_core::payment::PaymentQuote;
use cantina_core::receipt::render_text;
use cantina_core::{
    CashClosure, CashLedger, CashMovement, CashMovementType, CashReport, CashSession, CoreError,
    DeliveryDetails, ExchangeRate, GeneralSettings, Money, Order, OrderStatus, OrderType,
    PaymentProcessor, PaymentRequest, Settlement, SharedExchangeRate, Table,
};
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::PosConfig;
use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{cash, order, settings, table, ticket};
use crate::storage::{set_json, StorageKey};

/// Transactional front door for order, payment and cash-drawer writes.
#[derive(Debug, Clone)]
pub struct PosService {
    db: Database,
    settings: Arc<RwLock<GeneralSettings>>,
    rates: SharedExchangeRate,
    write_lock: Arc<Mutex<()>>,
}

impl PosService {
    /// Loads the stored settings and dollar rate, then applies `config`'s
    /// overrides on top.
    pub async fn open(db: Database, config: &PosConfig) -> DbResult<Self> {
        let mut conn = db.pool().acquire().await?;
        let stored = settings::load_general(&mut conn).await?;
        let stored_rate = settings::load_dollar_rate(&mut conn, &stored).await?;
        drop(conn);

        let mut settings = config.apply(stored);
        let rate = config.dollar_rate.unwrap_or(stored_rate);
        settings.dollar_rate = rate;
        info!(
            system_name = %settings.system_name,
            tax_rate_bps = settings.tax_rate.bps(),
            dollar_rate = %rate,
            "POS service ready"
        );

        Ok(PosService {
            db,
            settings: Arc::new(RwLock::new(settings)),
            rates: SharedExchangeRate::new(rate),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Snapshot of the settings every clone of this service shares.
    pub fn settings(&self) -> GeneralSettings {
        self.settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The live dollar rate shared with every processor this service builds.
    pub fn rates(&self) -> &SharedExchangeRate {
        &self.rates
    }

    fn processor(&self) -> PaymentProcessor<SharedExchangeRate> {
        PaymentProcessor::new(self.rates.clone(), &self.settings())
    }

    async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        Ok(self.db.pool().begin().await?)
    }

    async fn commit(tx: Transaction<'static, Sqlite>) -> DbResult<()> {
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// Validates and stores new general settings, then adopts them in every
    /// clone of this service. Their dollar rate becomes the live rate.
    pub async fn update_settings(&self, settings: GeneralSettings) -> DbResult<()> {
        settings.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.begin().await?;
        set_json(&mut tx, StorageKey::GeneralSettings, &settings).await?;
        set_json(&mut tx, StorageKey::DollarRate, &settings.dollar_rate).await?;
        Self::commit(tx).await?;

        self.rates.set(settings.dollar_rate);
        info!(
            system_name = %settings.system_name,
            tax_rate_bps = settings.tax_rate.bps(),
            "Settings updated"
        );
        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = settings;
        Ok(())
    }

    /// Stores the dollar rate and makes it current for new payments.
    pub async fn set_dollar_rate(&self, rate: ExchangeRate) -> DbResult<()> {
        let _guard = self.write_lock.lock().await;
        self.db.settings().save_dollar_rate(rate).await?;
        self.rates.set(rate);
        self.settings
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .dollar_rate = rate;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Saves a draft order and occupies its table.
    ///
    /// Refuses an order id that is already stored. On any error nothing is
    /// written.
    pub async fn save_order(&self, mut order: Order, now: DateTime<Utc>) -> DbResult<Order> {
        order.save(now)?;
        self.insert_saved(order).await
    }

    /// Attaches delivery details to a draft and saves it.
    pub async fn place_delivery_order(
        &self,
        mut order: Order,
        customer_name: &str,
        details: DeliveryDetails,
        now: DateTime<Utc>,
    ) -> DbResult<Order> {
        order.place_delivery(customer_name, details, now)?;
        self.insert_saved(order).await
    }

    async fn insert_saved(&self, order: Order) -> DbResult<Order> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.begin().await?;

        order::insert(&mut tx, &order).await?;
        if order.order_type == OrderType::DineIn {
            if let Some(table_id) = order.table_id.as_deref() {
                table::occupy(&mut tx, table_id, &order).await?;
            }
        }

        Self::commit(tx).await?;
        info!(
            order_id = %order.id,
            order_type = ?order.order_type,
            status = %order.status,
            items = order.items.len(),
            "Order saved"
        );
        Ok(order)
    }

    /// Moves a delivery order along its workflow.
    pub async fn set_delivery_status(&self, order_id: &str, next: OrderStatus) -> DbResult<Order> {
        self.modify_order(order_id, |order| order.set_delivery_status(next))
            .await
    }

    pub async fn assign_driver(&self, order_id: &str, driver: &str) -> DbResult<Order> {
        self.modify_order(order_id, |order| order.assign_driver(driver))
            .await
    }

    async fn modify_order(
        &self,
        order_id: &str,
        change: impl FnOnce(&mut Order) -> Result<(), CoreError>,
    ) -> DbResult<Order> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.begin().await?;

        let mut orders = order::load(&mut tx).await?;
        let target = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| DbError::not_found("Order", order_id))?;
        change(target)?;
        let updated = target.clone();

        order::store(&mut tx, &orders).await?;
        Self::commit(tx).await?;
        debug!(order_id, status = %updated.status, "Order updated");
        Ok(updated)
    }

    // -------------------------------------------------------------------------
    // Payments
    // -------------------------------------------------------------------------

    /// Figures the cashier sees before confirming. Writes nothing.
    pub async fn quote_payment(
        &self,
        order_id: &str,
        request: &PaymentRequest,
    ) -> DbResult<PaymentQuote> {
        let order = self
            .db
            .orders()
            .get(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;
        Ok(self.processor().quote(&order, request)?)
    }

    /// Settles a payment against a stored order.
    ///
    /// On success the order is completed, its table released, the cash sale
    /// logged (cash only) and the ticket stored, all in one transaction. On
    /// any error, including insufficient funds, nothing is written.
    pub async fn settle_payment(
        &self,
        order_id: &str,
        request: &PaymentRequest,
        cashier: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Settlement> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.begin().await?;

        let mut orders = order::load(&mut tx).await?;
        let target = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        let settlement = self.processor().process(target, request, cashier, now)?;
        order::store(&mut tx, &orders).await?;

        if let Some(table_id) = settlement.released_table.as_deref() {
            table::release(&mut tx, table_id).await?;
        }

        if let Some(movement) = &settlement.cash_movement {
            let mut ledger = cash::load_ledger(&mut tx, &self.settings()).await?;
            ledger.record_sale(movement.clone());
            cash::store_ledger(&mut tx, &ledger).await?;
        }

        ticket::append(&mut tx, &settlement.ticket).await?;
        Self::commit(tx).await?;

        Ok(settlement)
    }

    /// Re-renders the stored ticket of a paid order with the current template.
    pub async fn reprint_ticket(&self, order_id: &str) -> DbResult<String> {
        let ticket = self
            .db
            .tickets()
            .for_order(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Ticket", order_id))?;
        let template = self.db.settings().ticket_template().await?;
        Ok(render_text(&ticket, &template))
    }

    // -------------------------------------------------------------------------
    // Cash register
    // -------------------------------------------------------------------------

    pub async fn current_session(&self, now: DateTime<Utc>) -> DbResult<Option<CashSession>> {
        let ledger = self.db.cash().load_ledger(&self.settings()).await?;
        Ok(ledger.current_session(now))
    }

    pub async fn open_register(
        &self,
        initial_amount: Money,
        cashier: &str,
        now: DateTime<Utc>,
    ) -> DbResult<CashMovement> {
        self.with_ledger(|ledger| ledger.open(initial_amount, cashier, now).cloned())
            .await
    }

    /// Records a manual expense, deposit or withdrawal.
    pub async fn record_movement(
        &self,
        movement_type: CashMovementType,
        amount: Money,
        description: &str,
        cashier: &str,
        now: DateTime<Utc>,
    ) -> DbResult<CashMovement> {
        self.with_ledger(|ledger| {
            ledger
                .add_movement(movement_type, amount, description, cashier, now)
                .cloned()
        })
        .await
    }

    pub async fn close_register(
        &self,
        actual_amount: Money,
        notes: Option<String>,
        cashier: &str,
        now: DateTime<Utc>,
    ) -> DbResult<CashClosure> {
        self.with_ledger(|ledger| ledger.close(actual_amount, notes, cashier, now))
            .await
    }

    /// Movements and totals between `start` and `end`, inclusive.
    pub async fn cash_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DbResult<CashReport> {
        let movements = self.db.cash().movements().await?;
        Ok(generate_cash_report(&movements, start, end, now))
    }

    async fn with_ledger<T>(
        &self,
        op: impl FnOnce(&mut CashLedger) -> Result<T, CoreError>,
    ) -> DbResult<T> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.begin().await?;

        let mut ledger = cash::load_ledger(&mut tx, &self.settings()).await?;
        let result = op(&mut ledger)?;
        cash::store_ledger(&mut tx, &ledger).await?;

        Self::commit(tx).await?;
        Ok(result)
    }

    /// Drops every stored document for `key`. Used by the seed tool.
    pub async fn reset(&self, key: StorageKey) -> DbResult<bool> {
        let _guard = self.write_lock.lock().await;
        self.db.kv().remove(key).await
    }

    /// Stores the floor plan in one write. Used by the seed tool.
    pub async fn replace_tables(&self, tables: &[Table]) -> DbResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut conn = self.db.pool().acquire().await?;
        set_json(&mut conn, StorageKey::Tables, tables).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
