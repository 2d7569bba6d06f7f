//! # cantina-core: Order & Money Engine for Cantina POS
//!
//! Pure business logic for a single-location restaurant point of sale:
//! line totals, tax, discounts, tips, currency conversion, bill splitting,
//! payment settlement and cash-drawer reconciliation.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cantina POS Data Flow                            │
//! │                                                                         │
//! │  UI item selection                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Order (order.rs) ──► calculate_total (totals.rs) ──► subtotal/tax/total│
//! │       │                                                                 │
//! │       ├──► split bills (split_bill.rs) ──► per-customer totals          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PaymentProcessor (payment.rs) ──► Ticket (receipt.rs)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CashLedger (cash.rs) ──► "sale" movement, daily summary, closure       │
//! │                                                                         │
//! │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer `Money` (centavos), tax and quantity arithmetic
//! - [`currency`] - MXN/USD conversion, exchange-rate provider, discounts
//! - [`types`] - Shared enums, tax rate, catalog and table records
//! - [`totals`] - Order totals calculator
//! - [`order`] - The order aggregate
//! - [`split_bill`] - Split-bill allocation and totals
//! - [`payment`] - Payment processor and tickets
//! - [`cash`] - Cash session ledger
//! - [`receipt`] - Ticket template and text rendering
//! - [`settings`] - General settings
//! - [`validation`] - Input validation and parsing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cantina_core::money::Money;
//! use cantina_core::order::{Order, SelectedModifier};
//! use cantina_core::types::{OrderType, TaxRate};
//!
//! let mut order = Order::new(OrderType::Takeout);
//! order
//!     .add_line(
//!         "prod-1",
//!         "Tacos al pastor",
//!         Money::from_major(100),
//!         None,
//!         vec![SelectedModifier::new("Extra queso", Money::from_major(10))],
//!         2,
//!         None,
//!     )
//!     .unwrap();
//!
//! let totals = order.totals(TaxRate::from_bps(1600));
//! assert_eq!(totals.subtotal, Money::from_major(220));
//! assert_eq!(totals.tax, Money::from_cents(3520));
//! assert_eq!(totals.total, Money::from_cents(25520));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cash;
pub mod currency;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod receipt;
pub mod settings;
pub mod split_bill;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cash::{
    CashClosure, CashLedger, CashMovement, CashMovementType, CashReport, CashSession, CashSummary,
    ClosureStatus,
};
pub use currency::{Currency, Discount, ExchangeRate, ExchangeRateProvider, SharedExchangeRate};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{DeliveryDetails, Order, OrderLineItem, SelectedModifier, SplitBill};
pub use payment::{Payment, PaymentProcessor, PaymentRequest, Settlement, Ticket};
pub use receipt::TicketTemplate;
pub use settings::GeneralSettings;
pub use totals::OrderTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// IVA applied to every order unless the settings say otherwise (16%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1600;

/// Dollar rate used until the cashier enters the day's rate (MXN 19.00).
pub const DEFAULT_DOLLAR_RATE_CENTAVOS: i64 = 1900;

/// Allowed drift between counted and expected cash at closing ($10.00 MXN).
pub const DEFAULT_CLOSURE_TOLERANCE_CENTAVOS: i64 = 1000;

/// Maximum quantity of a single line item.
///
/// Catches typing 1000 instead of 10 on the keypad.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum number of line items in one order.
pub const MAX_ORDER_ITEMS: usize = 200;

/// Largest price or amount accepted anywhere ($100,000,000.00 MXN).
///
/// A full order at this price stays far inside `i64` centavos.
pub const MAX_AMOUNT_CENTAVOS: i64 = 10_000_000_000;
