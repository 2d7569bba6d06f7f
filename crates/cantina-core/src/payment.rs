//! # Payment Processor
//!
//! Turns order totals plus the cashier's payment form into a settled
//! payment, a ticket and (for cash) a drawer movement.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Pending ──submit()──► Validating ──┬──► Settled   (ticket issued)      │
//! │     ▲                               │                                   │
//! │     └──────── revise() ◄──────────── └──► Rejected  (order untouched)   │
//! │                                                                         │
//! │  final total = order total − discount + tip        (always MXN)         │
//! │  cash only:   received (→ MXN) ≥ final total, else InsufficientFunds    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The processor never writes anywhere. Table release and persistence of the
//! [`Settlement`] belong to the caller.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cash::CashMovement;
use crate::currency::{convert_currency, Currency, Discount, ExchangeRate, ExchangeRateProvider};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::order::Order;
use crate::settings::GeneralSettings;
use crate::totals::OrderTotals;
use crate::types::{PaymentMethod, TaxRate, TicketType};
use crate::validation::validate_price;

// =============================================================================
// Request & Record
// =============================================================================

/// What the cashier entered on the payment form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    /// Currency of `amount_received`.
    pub currency: Currency,
    /// Cash tendered, in `currency`. Ignored for card and transfer.
    pub amount_received: Money,
    /// Tip in MXN.
    pub tip: Money,
    pub discount: Discount,
    pub discount_reason: Option<String>,
    pub ticket_type: TicketType,
}

/// How an order was settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub method: PaymentMethod,
    pub currency: Currency,
    /// As tendered, in `currency`.
    pub amount_received: Money,
    pub tip: Money,
    pub discount: Discount,
    pub discount_reason: Option<String>,
    pub ticket_type: TicketType,
    pub discount_amount: Money,
    /// MXN.
    pub final_total: Money,
    /// MXN.
    pub change: Money,
    /// Rate in effect when the payment settled.
    pub dollar_rate: ExchangeRate,
}

impl Payment {
    /// Change expressed in the currency the customer paid with.
    pub fn change_in_tender_currency(&self) -> Money {
        convert_currency(self.change, Currency::Mxn, self.currency, self.dollar_rate)
    }
}

/// Figures computed while validating a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuote {
    pub totals: OrderTotals,
    pub discount_amount: Money,
    pub final_total: Money,
    /// Tender converted to MXN; zero for non-cash methods.
    pub amount_received_mxn: Money,
    pub change: Money,
    pub dollar_rate: ExchangeRate,
}

// =============================================================================
// Ticket
// =============================================================================

/// Totals printed on a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TicketTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub discount_amount: Money,
    pub tip: Money,
    pub final_total: Money,
}

/// Immutable receipt snapshot issued once per settled payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// `T` followed by six digits.
    pub number: String,
    /// `dd/mm/yyyy, HH:MM:SS` in store time.
    pub date: String,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub ticket_type: TicketType,
    pub cashier: String,
    /// The order as it stood when paid.
    pub order: Order,
    pub payment: Payment,
    pub totals: TicketTotals,
}

/// `T` + the last six digits of the epoch-millisecond timestamp.
pub fn generate_ticket_number(now: DateTime<Utc>) -> String {
    format!("T{:06}", now.timestamp_millis().rem_euclid(1_000_000))
}

/// Formats a ticket date as `15/01/2024, 14:05:09`.
pub fn format_ticket_date(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// Everything a settled payment produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub ticket: Ticket,
    /// Present for cash payments.
    pub cash_movement: Option<CashMovement>,
    /// Table to free, for dine-in orders.
    pub released_table: Option<String>,
}

// =============================================================================
// Processor
// =============================================================================

/// Settles payments against orders using an injected rate source.
#[derive(Debug, Clone)]
pub struct PaymentProcessor<P> {
    rates: P,
    tax_rate: TaxRate,
    utc_offset: FixedOffset,
}

impl<P: ExchangeRateProvider> PaymentProcessor<P> {
    pub fn new(rates: P, settings: &GeneralSettings) -> Self {
        Self {
            rates,
            tax_rate: settings.tax_rate,
            utc_offset: settings.utc_offset(),
        }
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Validates a request and computes the final figures.
    ///
    /// Pure: the order is only read.
    pub fn quote(&self, order: &Order, request: &PaymentRequest) -> CoreResult<PaymentQuote> {
        if !order.status.is_payable() {
            return Err(CoreError::InvalidOrderStatus {
                order_id: order.id.clone(),
                current_status: order.status.to_string(),
                operation: "be paid".to_string(),
            });
        }
        validate_price("tip", request.tip)?;
        if let Discount::Fixed(value) = request.discount {
            validate_price("discount", value)?;
        }

        let totals = order.totals(self.tax_rate);
        let discount_amount = request.discount.amount(totals.total);
        if discount_amount > totals.total {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: totals.total.cents(),
            }
            .into());
        }
        let final_total = totals.total - discount_amount + request.tip;
        let dollar_rate = self.rates.current_rate();

        let (amount_received_mxn, change) = match request.method {
            PaymentMethod::Cash => {
                let received =
                    convert_currency(request.amount_received, request.currency, Currency::Mxn, dollar_rate);
                if received < final_total {
                    return Err(CoreError::InsufficientFunds {
                        required: final_total,
                        received,
                    });
                }
                (received, received - final_total)
            }
            PaymentMethod::Card | PaymentMethod::Transfer => (Money::zero(), Money::zero()),
        };

        Ok(PaymentQuote {
            totals,
            discount_amount,
            final_total,
            amount_received_mxn,
            change,
            dollar_rate,
        })
    }

    /// Settles the order: marks it completed and issues the ticket.
    ///
    /// On any error the order is left exactly as it was.
    pub fn process(
        &self,
        order: &mut Order,
        request: &PaymentRequest,
        cashier: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<Settlement> {
        let quote = self.quote(order, request)?;

        let payment = Payment {
            method: request.method,
            currency: request.currency,
            amount_received: request.amount_received,
            tip: request.tip,
            discount: request.discount,
            discount_reason: request
                .discount_reason
                .as_ref()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            ticket_type: request.ticket_type,
            discount_amount: quote.discount_amount,
            final_total: quote.final_total,
            change: quote.change,
            dollar_rate: quote.dollar_rate,
        };

        order.complete(payment.clone(), now);

        let cash_movement = (payment.method == PaymentMethod::Cash)
            .then(|| CashMovement::sale(&order.id, quote.final_total, cashier, now));

        let ticket = Ticket {
            number: generate_ticket_number(now),
            date: format_ticket_date(now, self.utc_offset),
            issued_at: now,
            ticket_type: payment.ticket_type,
            cashier: cashier.to_string(),
            order: order.clone(),
            totals: TicketTotals {
                subtotal: quote.totals.subtotal,
                tax: quote.totals.tax,
                delivery_fee: quote.totals.delivery_fee,
                total: quote.totals.total,
                discount_amount: quote.discount_amount,
                tip: payment.tip,
                final_total: quote.final_total,
            },
            payment,
        };

        tracing::info!(
            order_id = %order.id,
            ticket = %ticket.number,
            method = %request.method,
            final_total = %quote.final_total,
            "Payment settled"
        );

        Ok(Settlement {
            ticket,
            cash_movement,
            released_table: order.table_id.clone(),
        })
    }
}

// =============================================================================
// Payment Attempt
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStage {
    Pending,
    Validating,
    Rejected,
    Settled,
}

/// One payment form for one order, tracked through its stages.
#[derive(Debug, Clone)]
pub struct PaymentAttempt {
    order_id: String,
    request: PaymentRequest,
    stage: PaymentStage,
    last_error: Option<String>,
}

impl PaymentAttempt {
    /// A pending attempt with the form's values.
    pub fn new(order: &Order, request: PaymentRequest) -> Self {
        Self {
            order_id: order.id.clone(),
            request,
            stage: PaymentStage::Pending,
            last_error: None,
        }
    }

    pub fn stage(&self) -> PaymentStage {
        self.stage
    }

    pub fn request(&self) -> &PaymentRequest {
        &self.request
    }

    /// Why the last submission was rejected.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replaces the form values after a rejection.
    pub fn revise(&mut self, request: PaymentRequest) -> CoreResult<()> {
        if self.stage == PaymentStage::Settled {
            return Err(CoreError::PaymentAlreadySettled(self.order_id.clone()));
        }
        self.request = request;
        self.stage = PaymentStage::Pending;
        Ok(())
    }

    /// Validates and, if possible, settles. A settled attempt cannot be
    /// submitted again.
    pub fn submit<P: ExchangeRateProvider>(
        &mut self,
        processor: &PaymentProcessor<P>,
        order: &mut Order,
        cashier: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<Settlement> {
        if self.stage == PaymentStage::Settled {
            return Err(CoreError::PaymentAlreadySettled(self.order_id.clone()));
        }
        if order.id != self.order_id {
            return Err(CoreError::InvalidOrderStatus {
                order_id: order.id.clone(),
                current_status: order.status.to_string(),
                operation: format!("take a payment started for order {}", self.order_id),
            });
        }

        self.stage = PaymentStage::Validating;
        match processor.process(order, &self.request, cashier, now) {
            Ok(settlement) => {
                self.stage = PaymentStage::Settled;
                self.last_error = None;
                Ok(settlement)
            }
            Err(err) => {
                tracing::debug!(order_id = %order.id, error = %err, "Payment rejected");
                self.stage = PaymentStage::Rejected;
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
