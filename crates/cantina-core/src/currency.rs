//! # Currency & Discounts
//!
//! MXN/USD conversion, the exchange-rate provider read by the payment
//! processor, and discount application.
//!
//! ## Exchange Rate Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier enters "19.50"                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  parse_exchange_rate ──► ExchangeRate(1950)  (rejects ≤ 0)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SharedExchangeRate::set ──► read by PaymentProcessor::quote            │
//! │                               snapshot copied onto the Payment          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the latest rate is kept. Last write wins.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{parse_amount, parse_percentage_bps};

// =============================================================================
// Currency
// =============================================================================

/// Currencies accepted at the register. MXN is the base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Mxn,
    Usd,
}

impl Currency {
    /// ISO code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Mxn => "MXN",
            Currency::Usd => "USD",
        }
    }

    /// Formats an amount in this currency: `$255.20 MXN`.
    pub fn format(&self, amount: Money) -> String {
        format!("{} {}", amount, self.code())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// Pesos per US dollar, stored as centavos per dollar (19.00 → 1900).
///
/// Always positive: the only ways to build one are [`ExchangeRate::new`]
/// and deserialization, and both reject zero and negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub struct ExchangeRate(i64);

impl ExchangeRate {
    /// Creates a rate from centavos per dollar.
    pub fn new(centavos_per_dollar: i64) -> Result<Self, ValidationError> {
        if centavos_per_dollar <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "dollar rate".to_string(),
            });
        }
        Ok(ExchangeRate(centavos_per_dollar))
    }

    /// Centavos per dollar.
    #[inline]
    pub const fn centavos(&self) -> i64 {
        self.0
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        ExchangeRate(crate::DEFAULT_DOLLAR_RATE_CENTAVOS)
    }
}

/// Shows the rate as `19.50`.
impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl<'de> Deserialize<'de> for ExchangeRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let centavos = i64::deserialize(deserializer)?;
        ExchangeRate::new(centavos).map_err(serde::de::Error::custom)
    }
}

/// Source of the current dollar rate.
///
/// The payment processor takes a provider instead of reading a global, so
/// tests pin a fixed rate and the host can swap the value at runtime.
pub trait ExchangeRateProvider {
    fn current_rate(&self) -> ExchangeRate;
}

/// A fixed rate is its own provider.
impl ExchangeRateProvider for ExchangeRate {
    fn current_rate(&self) -> ExchangeRate {
        *self
    }
}

/// Process-wide rate that the cashier can update during the day.
///
/// Cloning shares the same underlying value.
#[derive(Debug, Clone, Default)]
pub struct SharedExchangeRate {
    inner: Arc<RwLock<ExchangeRate>>,
}

impl SharedExchangeRate {
    pub fn new(rate: ExchangeRate) -> Self {
        Self {
            inner: Arc::new(RwLock::new(rate)),
        }
    }

    /// Replaces the current rate.
    pub fn set(&self, rate: ExchangeRate) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        tracing::info!(rate = %rate, "Dollar rate updated");
        *guard = rate;
    }
}

impl ExchangeRateProvider for SharedExchangeRate {
    fn current_rate(&self) -> ExchangeRate {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Converts an amount between the two supported currencies.
///
/// MXN → USD divides by the rate, USD → MXN multiplies by it. Both round to
/// the nearest minor unit, half away from zero.
///
/// ## Example
/// ```rust
/// use cantina_core::currency::{convert_currency, Currency, ExchangeRate};
/// use cantina_core::money::Money;
///
/// let rate = ExchangeRate::new(1900).unwrap();
/// let usd = convert_currency(Money::from_major(190), Currency::Mxn, Currency::Usd, rate);
/// assert_eq!(usd, Money::from_major(10));
/// ```
pub fn convert_currency(amount: Money, from: Currency, to: Currency, rate: ExchangeRate) -> Money {
    match (from, to) {
        (Currency::Mxn, Currency::Usd) => amount.scale(100, rate.centavos()),
        (Currency::Usd, Currency::Mxn) => amount.scale(rate.centavos(), 100),
        _ => amount,
    }
}

// =============================================================================
// Discounts
// =============================================================================

/// A discount applied to an order total at payment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Discount {
    /// No discount.
    #[default]
    None,
    /// Fixed amount off; never more than the amount it applies to.
    Fixed(Money),
    /// Percentage in basis points (10% = 1000). Not clamped: 150% discounts
    /// more than the amount, so callers must guard.
    Percentage(u32),
}

impl Discount {
    /// Builds a discount from the payment form's kind and value fields.
    ///
    /// An unrecognised kind yields [`Discount::None`]. An empty value is
    /// treated as zero.
    pub fn from_input(kind: &str, value: &str) -> CoreResult<Self> {
        let value = value.trim();
        match kind.trim().to_lowercase().as_str() {
            "percentage" if value.is_empty() => Ok(Discount::Percentage(0)),
            "percentage" => Ok(Discount::Percentage(parse_percentage_bps("discount", value)?)),
            "fixed" if value.is_empty() => Ok(Discount::Fixed(Money::zero())),
            "fixed" => Ok(Discount::Fixed(parse_amount("discount", value)?)),
            _ => Ok(Discount::None),
        }
    }

    /// Amount taken off `amount`.
    pub fn amount(&self, amount: Money) -> Money {
        match *self {
            Discount::None => Money::zero(),
            Discount::Fixed(value) => value.min(amount),
            Discount::Percentage(bps) => amount.percentage(bps),
        }
    }

    /// Short label for tickets: `10%`, `$50.00`.
    pub fn label(&self) -> String {
        match *self {
            Discount::None => String::new(),
            Discount::Fixed(value) => value.to_string(),
            Discount::Percentage(bps) => {
                if bps % 100 == 0 {
                    format!("{}%", bps / 100)
                } else {
                    format!("{}.{:02}%", bps / 100, bps % 100)
                }
            }
        }
    }
}

/// Returns how much `discount` takes off `amount`.
pub fn apply_discount(amount: Money, discount: &Discount) -> Money {
    discount.amount(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(centavos: i64) -> ExchangeRate {
        ExchangeRate::new(centavos).unwrap()
    }

    #[test]
    fn test_convert_mxn_to_usd() {
        let usd = convert_currency(Money::from_major(190), Currency::Mxn, Currency::Usd, rate(1900));
        assert_eq!(usd, Money::from_major(10));
    }

    #[test]
    fn test_convert_usd_to_mxn() {
        let mxn = convert_currency(Money::from_major(10), Currency::Usd, Currency::Mxn, rate(1900));
        assert_eq!(mxn, Money::from_major(190));
    }

    #[test]
    fn test_convert_same_currency_is_identity() {
        let x = Money::from_cents(12345);
        for r in [1, 1900, 2150, 99999] {
            assert_eq!(convert_currency(x, Currency::Mxn, Currency::Mxn, rate(r)), x);
            assert_eq!(convert_currency(x, Currency::Usd, Currency::Usd, rate(r)), x);
        }
    }

    #[test]
    fn test_convert_rounds_to_nearest_cent() {
        // $100.00 MXN at 19.50 = 5.128... USD
        let usd = convert_currency(Money::from_major(100), Currency::Mxn, Currency::Usd, rate(1950));
        assert_eq!(usd, Money::from_cents(513));
    }

    #[test]
    fn test_exchange_rate_rejects_non_positive() {
        assert!(ExchangeRate::new(0).is_err());
        assert!(ExchangeRate::new(-1900).is_err());
        assert!(serde_json::from_str::<ExchangeRate>("0").is_err());
        assert_eq!(serde_json::from_str::<ExchangeRate>("1950").unwrap(), rate(1950));
    }

    #[test]
    fn test_exchange_rate_display() {
        assert_eq!(rate(1950).to_string(), "19.50");
        assert_eq!(ExchangeRate::default().to_string(), "19.00");
    }

    #[test]
    fn test_shared_rate_updates_all_clones() {
        let shared = SharedExchangeRate::new(rate(1900));
        let reader = shared.clone();

        shared.set(rate(2000));
        assert_eq!(reader.current_rate(), rate(2000));
    }

    #[test]
    fn test_percentage_discount() {
        let discount = Discount::from_input("percentage", "10").unwrap();
        assert_eq!(apply_discount(Money::from_major(100), &discount), Money::from_major(10));
    }

    #[test]
    fn test_fixed_discount_is_clamped() {
        let discount = Discount::from_input("fixed", "150").unwrap();
        assert_eq!(apply_discount(Money::from_major(100), &discount), Money::from_major(100));
    }

    #[test]
    fn test_unknown_discount_kind_is_zero() {
        let discount = Discount::from_input("unknown", "10").unwrap();
        assert_eq!(discount, Discount::None);
        assert_eq!(apply_discount(Money::from_major(100), &discount), Money::zero());
    }

    #[test]
    fn test_percentage_discount_not_clamped() {
        let discount = Discount::Percentage(15_000);
        assert_eq!(discount.amount(Money::from_major(100)), Money::from_major(150));
    }

    #[test]
    fn test_discount_rejects_garbage_value() {
        assert!(Discount::from_input("fixed", "abc").is_err());
        assert!(Discount::from_input("percentage", "-5").is_err());
    }

    #[test]
    fn test_discount_serde_shape() {
        let json = serde_json::to_value(Discount::Percentage(1000)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "percentage", "value": 1000}));

        let none: Discount = serde_json::from_str(r#"{"type":"none"}"#).unwrap();
        assert_eq!(none, Discount::None);
    }

    #[test]
    fn test_discount_label() {
        assert_eq!(Discount::Percentage(1000).label(), "10%");
        assert_eq!(Discount::Percentage(1250).label(), "12.50%");
        assert_eq!(Discount::Fixed(Money::from_major(50)).label(), "$50.00");
    }
}
