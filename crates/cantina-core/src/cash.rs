//! # Cash Session Ledger
//!
//! Append-only log of cash drawer movements, the daily session derived from
//! it, and end-of-day closure against a physical count.
//!
//! ## Session Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  All movements (append-only)                                            │
//! │                                                                         │
//! │  yesterday ...  │ today: opening sale expense closing │ opening sale    │
//! │                 │        └──── closed session ──────┘ └─ current ─┘    │
//! │                                                                         │
//! │  current session = today's movements after today's last closing         │
//! │  open iff that window contains an opening                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Today" is the calendar day at the store's UTC offset, never the host's
//! local time zone.
//!
//! ## Sign Convention
//! Expenses and withdrawals are stored negative. The summary takes their
//! magnitude, so either sign in old data sums the same way.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::settings::GeneralSettings;
use crate::types::PaymentMethod;
use crate::validation::validate_price;

// =============================================================================
// Movements
// =============================================================================

/// Kind of drawer movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CashMovementType {
    Opening,
    Sale,
    Expense,
    Deposit,
    Withdrawal,
    Closing,
}

impl CashMovementType {
    /// Label printed on reports.
    pub fn label(&self) -> &'static str {
        match self {
            CashMovementType::Opening => "Apertura",
            CashMovementType::Sale => "Venta",
            CashMovementType::Expense => "Gasto",
            CashMovementType::Deposit => "Depósito",
            CashMovementType::Withdrawal => "Retiro",
            CashMovementType::Closing => "Cierre",
        }
    }

    /// Whether the amount leaves the drawer.
    pub fn is_outflow(&self) -> bool {
        matches!(self, CashMovementType::Expense | CashMovementType::Withdrawal)
    }
}

/// One atomic change to the physical cash drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    pub id: String,
    #[serde(rename = "type")]
    pub movement_type: CashMovementType,
    /// Negative for expenses and withdrawals.
    pub amount: Money,
    pub description: String,
    pub cashier: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub order_id: Option<String>,
    pub payment_method: PaymentMethod,
}

impl CashMovement {
    /// Builds a movement, applying the sign convention to `amount`.
    pub fn new(
        movement_type: CashMovementType,
        amount: Money,
        description: impl Into<String>,
        cashier: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let amount = if movement_type.is_outflow() {
            -amount.abs()
        } else {
            amount.abs()
        };
        Self {
            id: Uuid::new_v4().to_string(),
            movement_type,
            amount,
            description: description.into(),
            cashier: cashier.into(),
            timestamp,
            order_id: None,
            payment_method: PaymentMethod::Cash,
        }
    }

    /// The movement a cash payment leaves in the drawer.
    pub fn sale(
        order_id: &str,
        amount: Money,
        cashier: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut movement = CashMovement::new(
            CashMovementType::Sale,
            amount,
            format!("Venta - Orden #{}", order_id),
            cashier,
            timestamp,
        );
        movement.order_id = Some(order_id.to_string());
        movement
    }

    fn local_date(&self, offset: &FixedOffset) -> NaiveDate {
        self.timestamp.with_timezone(offset).date_naive()
    }
}

// =============================================================================
// Summary & Closure Validation
// =============================================================================

/// Running totals of a set of movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashSummary {
    pub opening: Money,
    pub sales: Money,
    pub expenses: Money,
    pub deposits: Money,
    pub withdrawals: Money,
    /// Cash that should be in the drawer.
    pub total: Money,
}

/// Sums movements by type. Closing movements do not count.
///
/// `total = opening + sales + deposits − expenses − withdrawals`
pub fn calculate_cash_summary<'a, I>(movements: I) -> CashSummary
where
    I: IntoIterator<Item = &'a CashMovement>,
{
    let mut summary = CashSummary::default();
    for movement in movements {
        match movement.movement_type {
            CashMovementType::Opening => summary.opening += movement.amount,
            CashMovementType::Sale => summary.sales += movement.amount,
            CashMovementType::Expense => summary.expenses += movement.amount.abs(),
            CashMovementType::Deposit => summary.deposits += movement.amount,
            CashMovementType::Withdrawal => summary.withdrawals += movement.amount.abs(),
            CashMovementType::Closing => {}
        }
    }
    summary.total =
        summary.opening + summary.sales + summary.deposits - summary.expenses - summary.withdrawals;
    summary
}

/// Outcome of comparing the counted drawer against the expected amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ClosureStatus {
    Balanced,
    Surplus,
    Shortage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClosureValidation {
    pub is_valid: bool,
    /// `actual − expected`
    pub difference: Money,
    pub tolerance: Money,
    pub status: ClosureStatus,
}

/// Balanced when `|actual − expected| ≤ tolerance`, otherwise surplus or
/// shortage by the sign of the difference.
pub fn validate_cash_closure(expected: Money, actual: Money, tolerance: Money) -> ClosureValidation {
    let difference = actual - expected;
    let is_valid = difference.abs() <= tolerance;
    let status = if is_valid {
        ClosureStatus::Balanced
    } else if difference.is_positive() {
        ClosureStatus::Surplus
    } else {
        ClosureStatus::Shortage
    };

    ClosureValidation {
        is_valid,
        difference,
        tolerance,
        status,
    }
}

// =============================================================================
// Closures & Sessions
// =============================================================================

/// A finalized end-of-day reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashClosure {
    pub id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub cashier: String,
    pub opening_amount: Money,
    pub total_sales: Money,
    pub total_expenses: Money,
    #[serde(default)]
    pub total_deposits: Money,
    #[serde(default)]
    pub total_withdrawals: Money,
    pub expected_amount: Money,
    pub actual_amount: Money,
    pub difference: Money,
    pub status: ClosureStatus,
    pub notes: Option<String>,
    /// Number of movements in the closed session, the closing excluded.
    pub movement_count: usize,
    #[ts(as = "String")]
    pub closed_at: DateTime<Utc>,
}

/// The drawer session synthesized from today's movements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashSession {
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    pub movements: Vec<CashMovement>,
    pub summary: CashSummary,
    pub is_open: bool,
}

// =============================================================================
// Ledger
// =============================================================================

/// The movement and closure logs plus the rules for appending to them.
#[derive(Debug, Clone)]
pub struct CashLedger {
    movements: Vec<CashMovement>,
    closures: Vec<CashClosure>,
    utc_offset: FixedOffset,
    tolerance: Money,
}

impl CashLedger {
    /// Wraps persisted logs. `movements` must be in append order.
    pub fn new(
        movements: Vec<CashMovement>,
        closures: Vec<CashClosure>,
        settings: &GeneralSettings,
    ) -> Self {
        Self {
            movements,
            closures,
            utc_offset: settings.utc_offset(),
            tolerance: settings.closure_tolerance,
        }
    }

    pub fn movements(&self) -> &[CashMovement] {
        &self.movements
    }

    pub fn closures(&self) -> &[CashClosure] {
        &self.closures
    }

    /// Gives the logs back for persistence.
    pub fn into_parts(self) -> (Vec<CashMovement>, Vec<CashClosure>) {
        (self.movements, self.closures)
    }

    fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.utc_offset).date_naive()
    }

    /// Today's movements after today's last closing.
    fn session_window(&self, now: DateTime<Utc>) -> Vec<&CashMovement> {
        let today = self.today(now);
        let todays: Vec<&CashMovement> = self
            .movements
            .iter()
            .filter(|m| m.local_date(&self.utc_offset) == today)
            .collect();
        let start = todays
            .iter()
            .rposition(|m| m.movement_type == CashMovementType::Closing)
            .map_or(0, |i| i + 1);
        todays[start..].to_vec()
    }

    /// The open session, if today's window contains an opening.
    pub fn current_session(&self, now: DateTime<Utc>) -> Option<CashSession> {
        let window = self.session_window(now);
        let opening = window
            .iter()
            .find(|m| m.movement_type == CashMovementType::Opening)?;

        Some(CashSession {
            date: self.today(now),
            opened_at: opening.timestamp,
            summary: calculate_cash_summary(window.iter().copied()),
            movements: window.into_iter().cloned().collect(),
            is_open: true,
        })
    }

    /// Opens the drawer with a starting float.
    ///
    /// Fails while a session is already open. After a closing the drawer
    /// may be opened again the same day.
    pub fn open(
        &mut self,
        initial_amount: Money,
        cashier: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<&CashMovement> {
        if let Some(session) = self.current_session(now) {
            return Err(CoreError::SessionAlreadyOpen {
                opened_at: session.opened_at.to_rfc3339(),
            });
        }
        validate_price("opening amount", initial_amount)?;

        let movement = CashMovement::new(
            CashMovementType::Opening,
            initial_amount,
            "Apertura de caja",
            cashier,
            now,
        );
        tracing::info!(amount = %initial_amount, cashier, "Cash register opened");
        Ok(self.push(movement))
    }

    /// Records a manual expense, deposit or withdrawal in the open session.
    ///
    /// `amount` is a positive magnitude; the sign is applied from the type.
    /// Negative amounts are rejected.
    pub fn add_movement(
        &mut self,
        movement_type: CashMovementType,
        amount: Money,
        description: &str,
        cashier: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<&CashMovement> {
        if !matches!(
            movement_type,
            CashMovementType::Expense | CashMovementType::Deposit | CashMovementType::Withdrawal
        ) {
            return Err(ValidationError::NotAllowed {
                field: "movement type".to_string(),
                allowed: vec![
                    "expense".to_string(),
                    "deposit".to_string(),
                    "withdrawal".to_string(),
                ],
            }
            .into());
        }
        validate_price("amount", amount)?;
        if amount.is_zero() {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .into());
        }
        if self.current_session(now).is_none() {
            return Err(CoreError::NoOpenSession);
        }

        let description = description.trim();
        let description = if description.is_empty() {
            movement_type.label()
        } else {
            description
        };
        let movement = CashMovement::new(movement_type, amount, description, cashier, now);
        tracing::debug!(kind = ?movement_type, amount = %movement.amount, "Cash movement recorded");
        Ok(self.push(movement))
    }

    /// Appends a sale movement produced by a settled cash payment.
    ///
    /// A paid order is never refused because the drawer was not opened; the
    /// sale is logged and shows up once a session covers it.
    pub fn record_sale(&mut self, movement: CashMovement) -> &CashMovement {
        if self.current_session(movement.timestamp).is_none() {
            tracing::warn!(
                order_id = movement.order_id.as_deref().unwrap_or_default(),
                amount = %movement.amount,
                "Cash sale recorded with no open register session"
            );
        }
        self.push(movement)
    }

    /// Closes the open session against the counted cash.
    ///
    /// Appends a [`CashClosure`] and a closing movement for `actual_amount`.
    pub fn close(
        &mut self,
        actual_amount: Money,
        notes: Option<String>,
        cashier: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<CashClosure> {
        let session = self.current_session(now).ok_or(CoreError::NoOpenSession)?;
        validate_price("actual amount", actual_amount)?;

        let summary = session.summary;
        let validation = validate_cash_closure(summary.total, actual_amount, self.tolerance);
        let status_label = match validation.status {
            ClosureStatus::Balanced => "balanced",
            ClosureStatus::Surplus => "surplus",
            ClosureStatus::Shortage => "shortage",
        };

        let closure = CashClosure {
            id: Uuid::new_v4().to_string(),
            date: session.date,
            cashier: cashier.to_string(),
            opening_amount: summary.opening,
            total_sales: summary.sales,
            total_expenses: summary.expenses,
            total_deposits: summary.deposits,
            total_withdrawals: summary.withdrawals,
            expected_amount: summary.total,
            actual_amount,
            difference: validation.difference,
            status: validation.status,
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            movement_count: session.movements.len(),
            closed_at: now,
        };

        if validation.is_valid {
            tracing::info!(expected = %summary.total, actual = %actual_amount, "Cash register closed");
        } else {
            tracing::warn!(
                expected = %summary.total,
                actual = %actual_amount,
                difference = %validation.difference,
                status = status_label,
                "Cash register closed out of tolerance"
            );
        }

        self.push(CashMovement::new(
            CashMovementType::Closing,
            actual_amount,
            format!("Cierre de caja - {}", status_label),
            cashier,
            now,
        ));
        self.closures.push(closure.clone());
        Ok(closure)
    }

    fn push(&mut self, movement: CashMovement) -> &CashMovement {
        self.movements.push(movement);
        &self.movements[self.movements.len() - 1]
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Movements and totals for an arbitrary period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashReport {
    pub movements: Vec<CashMovement>,
    pub summary: CashSummary,
    #[ts(as = "String")]
    pub period_start: DateTime<Utc>,
    #[ts(as = "String")]
    pub period_end: DateTime<Utc>,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

/// Report over movements with `start ≤ timestamp ≤ end`.
pub fn generate_cash_report(
    movements: &[CashMovement],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> CashReport {
    let movements: Vec<CashMovement> = movements
        .iter()
        .filter(|m| m.timestamp >= start && m.timestamp <= end)
        .cloned()
        .collect();
    let summary = calculate_cash_summary(&movements);

    CashReport {
        movements,
        summary,
        period_start: start,
        period_end: end,
        generated_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap()
    }

    fn utc_settings() -> GeneralSettings {
        GeneralSettings {
            utc_offset_minutes: 0,
            ..GeneralSettings::default()
        }
    }

    fn ledger() -> CashLedger {
        CashLedger::new(Vec::new(), Vec::new(), &utc_settings())
    }

    #[test]
    fn test_summary_takes_magnitude_of_outflows() {
        let movements = vec![
            CashMovement::new(CashMovementType::Opening, Money::from_major(1000), "", "M", at(8, 0)),
            CashMovement::new(CashMovementType::Sale, Money::from_major(250), "", "M", at(9, 0)),
            CashMovement::new(CashMovementType::Expense, Money::from_major(-50), "", "M", at(10, 0)),
            CashMovement::new(CashMovementType::Deposit, Money::from_major(100), "", "M", at(11, 0)),
            CashMovement::new(CashMovementType::Withdrawal, Money::from_major(30), "", "M", at(12, 0)),
        ];
        assert_eq!(movements[2].amount, Money::from_major(-50));
        assert_eq!(movements[4].amount, Money::from_major(-30));

        let summary = calculate_cash_summary(&movements);
        assert_eq!(summary.expenses, Money::from_major(50));
        assert_eq!(summary.withdrawals, Money::from_major(30));
        assert_eq!(summary.total, Money::from_major(1270));
    }

    #[test]
    fn test_validate_cash_closure() {
        let tolerance = Money::from_major(10);

        let v = validate_cash_closure(Money::from_major(1000), Money::from_major(1005), tolerance);
        assert_eq!(v.status, ClosureStatus::Balanced);
        assert_eq!(v.difference, Money::from_major(5));
        assert!(v.is_valid);

        let v = validate_cash_closure(Money::from_major(1000), Money::from_major(800), tolerance);
        assert_eq!(v.status, ClosureStatus::Shortage);
        assert_eq!(v.difference, Money::from_major(-200));

        let v = validate_cash_closure(Money::from_major(1000), Money::from_major(1011), tolerance);
        assert_eq!(v.status, ClosureStatus::Surplus);
    }

    #[test]
    fn test_full_day() {
        let mut ledger = ledger();
        assert!(ledger.current_session(at(8, 0)).is_none());

        ledger.open(Money::from_major(1000), "María", at(8, 0)).unwrap();
        ledger.record_sale(CashMovement::sale("12345", Money::from_major(250), "María", at(9, 30)));
        ledger
            .add_movement(CashMovementType::Expense, Money::from_major(-50), "Ingredientes", "María", at(11, 15))
            .unwrap();

        let session = ledger.current_session(at(12, 0)).unwrap();
        assert!(session.is_open);
        assert_eq!(session.summary.opening, Money::from_major(1000));
        assert_eq!(session.summary.sales, Money::from_major(250));
        assert_eq!(session.summary.expenses, Money::from_major(50));
        assert_eq!(session.summary.total, Money::from_major(1200));

        let closure = ledger.close(Money::from_major(1200), None, "María", at(22, 0)).unwrap();
        assert_eq!(closure.status, ClosureStatus::Balanced);
        assert_eq!(closure.difference, Money::zero());
        assert_eq!(closure.movement_count, 3);

        let last = ledger.movements().last().unwrap();
        assert_eq!(last.movement_type, CashMovementType::Closing);
        assert_eq!(last.amount, Money::from_major(1200));
        assert_eq!(ledger.closures().len(), 1);
        assert!(ledger.current_session(at(22, 5)).is_none());
    }

    #[test]
    fn test_duplicate_open_rejected() {
        let mut ledger = ledger();
        ledger.open(Money::from_major(1000), "María", at(8, 0)).unwrap();
        assert!(matches!(
            ledger.open(Money::from_major(500), "María", at(9, 0)),
            Err(CoreError::SessionAlreadyOpen { .. })
        ));
        assert_eq!(ledger.movements().len(), 1);
    }

    #[test]
    fn test_reopen_after_close_starts_fresh_session() {
        let mut ledger = ledger();
        ledger.open(Money::from_major(1000), "María", at(8, 0)).unwrap();
        ledger.close(Money::from_major(1000), None, "María", at(14, 0)).unwrap();

        ledger.open(Money::from_major(500), "Juan", at(15, 0)).unwrap();
        let session = ledger.current_session(at(16, 0)).unwrap();
        assert_eq!(session.movements.len(), 1);
        assert_eq!(session.summary.total, Money::from_major(500));
    }

    #[test]
    fn test_yesterdays_session_is_not_current() {
        let mut ledger = ledger();
        ledger.open(Money::from_major(1000), "María", at(8, 0)).unwrap();
        assert!(ledger.current_session(at(8, 0) + Duration::days(1)).is_none());
    }

    #[test]
    fn test_day_boundary_uses_store_offset() {
        // 02:00 UTC on the 16th is still the 15th in Mexico City.
        let settings = GeneralSettings::default();
        let mut ledger = CashLedger::new(Vec::new(), Vec::new(), &settings);
        ledger.open(Money::from_major(1000), "María", at(20, 0)).unwrap();

        let late = Utc.with_ymd_and_hms(2024, 1, 16, 2, 0, 0).unwrap();
        assert!(ledger.current_session(late).is_some());
    }

    #[test]
    fn test_close_without_session() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.close(Money::from_major(100), None, "María", at(22, 0)),
            Err(CoreError::NoOpenSession)
        ));
        assert!(ledger.movements().is_empty());
    }

    #[test]
    fn test_add_movement_rules() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.add_movement(CashMovementType::Deposit, Money::from_major(10), "", "M", at(8, 0)),
            Err(CoreError::NoOpenSession)
        ));

        ledger.open(Money::from_major(1000), "M", at(8, 0)).unwrap();
        assert!(ledger
            .add_movement(CashMovementType::Sale, Money::from_major(10), "", "M", at(9, 0))
            .is_err());
        assert!(ledger
            .add_movement(CashMovementType::Withdrawal, Money::zero(), "", "M", at(9, 0))
            .is_err());

        let movement = ledger
            .add_movement(CashMovementType::Withdrawal, Money::from_major(200), " ", "M", at(9, 0))
            .unwrap();
        assert_eq!(movement.amount, Money::from_major(-200));
        assert_eq!(movement.description, "Retiro");
    }

    #[test]
    fn test_negative_movement_amount_rejected() {
        let mut ledger = ledger();
        ledger.open(Money::from_major(1000), "M", at(8, 0)).unwrap();
        let recorded = ledger.movements().len();

        for movement_type in [
            CashMovementType::Expense,
            CashMovementType::Deposit,
            CashMovementType::Withdrawal,
        ] {
            let err = ledger
                .add_movement(movement_type, Money::from_major(-50), "Gas", "M", at(9, 0))
                .unwrap_err();
            assert!(matches!(
                err,
                CoreError::Validation(ValidationError::OutOfRange { .. })
            ));
        }
        assert_eq!(ledger.movements().len(), recorded);
    }

    #[test]
    fn test_sale_without_session_is_still_recorded() {
        let mut ledger = ledger();
        ledger.record_sale(CashMovement::sale("o1", Money::from_major(100), "M", at(9, 0)));
        assert_eq!(ledger.movements().len(), 1);
        assert_eq!(ledger.movements()[0].order_id.as_deref(), Some("o1"));
    }

    #[test]
    fn test_cash_report_window_is_inclusive() {
        let movements = vec![
            CashMovement::new(CashMovementType::Opening, Money::from_major(1000), "", "M", at(8, 0)),
            CashMovement::new(CashMovementType::Sale, Money::from_major(250), "", "M", at(9, 0)),
            CashMovement::new(CashMovementType::Sale, Money::from_major(180), "", "M", at(12, 0)),
        ];
        let report = generate_cash_report(&movements, at(8, 0), at(9, 0), at(23, 0));

        assert_eq!(report.movements.len(), 2);
        assert_eq!(report.summary.total, Money::from_major(1250));
        assert_eq!(report.generated_at, at(23, 0));
    }
}
