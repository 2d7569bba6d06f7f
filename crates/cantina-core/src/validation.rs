//! # Validation Module
//!
//! Input validation and parsing for Cantina POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI forms                                                     │
//! │  ├── Raw strings: "12.50", "19.5", "10"                                │
//! │  └── THIS MODULE: parse_amount / parse_exchange_rate                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain operations                                            │
//! │  ├── Order::add_item → validate_quantity, validate_price               │
//! │  └── Order::place_delivery → validate_required, validate_phone         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage (SQLite)                                             │
//! │  └── PRIMARY KEY / NOT NULL constraints                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cantina_core::validation::{parse_amount, validate_quantity};
//! use cantina_core::money::Money;
//!
//! assert_eq!(parse_amount("tip", "12.50").unwrap(), Money::from_cents(1250));
//! validate_quantity(5).unwrap();
//! ```

use crate::currency::ExchangeRate;
use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_AMOUNT_CENTAVOS, MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a field is non-blank and returns it trimmed.
///
/// ## Example
/// ```rust
/// use cantina_core::validation::validate_required;
///
/// assert_eq!(validate_required("customer name", "  Ana ").unwrap(), "Ana");
/// assert!(validate_required("customer name", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value.to_string())
}

/// Validates a customer or split-bill name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = validate_required("customer name", name)?;

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: 100,
        });
    }

    Ok(name)
}

/// Validates a phone number for delivery orders.
///
/// ## Rules
/// - Must not be empty
/// - Digits, spaces, `+`, `-` and parentheses only
/// - Between 7 and 15 digits
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = validate_required("phone", phone)?;

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, +, - and parentheses".to_string(),
        });
    }

    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count() as i64;
    if !(7..=15).contains(&digits) {
        return Err(ValidationError::OutOfRange {
            field: "phone digits".to_string(),
            min: 7,
            max: 15,
        });
    }

    Ok(phone)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (courtesy items); anything above
/// [`MAX_AMOUNT_CENTAVOS`] is rejected.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.cents() > MAX_AMOUNT_CENTAVOS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTAVOS,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates order size before adding another line.
pub fn validate_order_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "order items".to_string(),
            min: 0,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Parsers
// =============================================================================

/// Parses a non-negative decimal with at most two fractional digits into
/// hundredths: `"12.5"` → 1250.
fn parse_hundredths(field: &str, input: &str) -> ValidationResult<i64> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let input = input.trim();
    let input = input.strip_prefix('$').unwrap_or(input);
    if input.is_empty() {
        return Err(ValidationError::required(field));
    }
    let out_of_range = || ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_AMOUNT_CENTAVOS,
    };
    if input.starts_with('-') {
        return Err(out_of_range());
    }

    let (whole, frac) = match input.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (input, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("not a number"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("not a number"));
    }
    if frac.len() > 2 {
        return Err(invalid("at most two decimal places"));
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("too large"))?
    };
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid("not a number"))? * 10,
        _ => frac.parse().map_err(|_| invalid("not a number"))?,
    };

    whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac))
        .filter(|&v| v <= MAX_AMOUNT_CENTAVOS)
        .ok_or_else(out_of_range)
}

/// Parses a peso/dollar amount typed by the cashier.
///
/// Accepts an optional leading `$` and up to two decimals. Rejects
/// negatives, `NaN`-like text and sub-centavo precision.
///
/// ## Example
/// ```rust
/// use cantina_core::validation::parse_amount;
/// use cantina_core::money::Money;
///
/// assert!(parse_amount("amount", "$1,000").is_err());
/// assert_eq!(parse_amount("amount", "1000").unwrap(), Money::from_major(1000));
/// assert!(parse_amount("amount", "NaN").is_err());
/// assert!(parse_amount("amount", "-5").is_err());
/// ```
pub fn parse_amount(field: &str, input: &str) -> ValidationResult<Money> {
    parse_hundredths(field, input).map(Money::from_cents)
}

/// Parses a percentage (`"10"`, `"12.5"`) into basis points.
pub fn parse_percentage_bps(field: &str, input: &str) -> ValidationResult<u32> {
    let hundredths = parse_hundredths(field, input)?;
    u32::try_from(hundredths).map_err(|_| ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: u32::MAX as i64,
    })
}

/// Parses the dollar rate entered at the start of the day (`"19.50"`).
pub fn parse_exchange_rate(input: &str) -> ValidationResult<ExchangeRate> {
    let centavos = parse_hundredths("dollar rate", input)?;
    ExchangeRate::new(centavos)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Mesa 1").is_ok());
        assert!(validate_required("name", "").is_err());
        assert!(validate_required("name", " \t ").is_err());
    }

    #[test]
    fn test_validate_customer_name() {
        assert_eq!(validate_customer_name(" Ana ").unwrap(), "Ana");
        assert!(validate_customer_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("555-123-4567").is_ok());
        assert!(validate_phone("+52 (55) 1234 5678").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_cents(1099)).is_ok());
        assert!(validate_price("price", Money::from_cents(-100)).is_err());
        assert!(validate_price("price", Money::from_cents(MAX_AMOUNT_CENTAVOS)).is_ok());
        assert!(matches!(
            validate_price("price", Money::from_cents(MAX_AMOUNT_CENTAVOS + 1)),
            Err(ValidationError::OutOfRange { max: MAX_AMOUNT_CENTAVOS, .. })
        ));
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(1600).is_ok());
        assert!(validate_tax_rate_bps(10_000).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("a", "12").unwrap(), Money::from_major(12));
        assert_eq!(parse_amount("a", "12.5").unwrap(), Money::from_cents(1250));
        assert_eq!(parse_amount("a", "12.05").unwrap(), Money::from_cents(1205));
        assert_eq!(parse_amount("a", ".5").unwrap(), Money::from_cents(50));
        assert_eq!(parse_amount("a", "$7.00").unwrap(), Money::from_cents(700));

        assert!(parse_amount("a", "").is_err());
        assert!(parse_amount("a", ".").is_err());
        assert!(parse_amount("a", "1.005").is_err());
        assert!(parse_amount("a", "1e3").is_err());
        assert!(parse_amount("a", "99999999999999999999").is_err());
    }

    #[test]
    fn test_parse_amount_upper_bound() {
        assert_eq!(
            parse_amount("price", "100000000.00").unwrap().cents(),
            MAX_AMOUNT_CENTAVOS
        );
        assert!(matches!(
            parse_amount("price", "100000000.01"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(parse_amount("price", "50000000000000000").is_err());
    }

    #[test]
    fn test_parse_percentage_bps() {
        assert_eq!(parse_percentage_bps("discount", "10").unwrap(), 1000);
        assert_eq!(parse_percentage_bps("discount", "12.5").unwrap(), 1250);
    }

    #[test]
    fn test_parse_exchange_rate() {
        assert_eq!(parse_exchange_rate("19.50").unwrap().centavos(), 1950);
        assert!(parse_exchange_rate("0").is_err());
        assert!(parse_exchange_rate("abc").is_err());
        assert!(parse_exchange_rate("-19").is_err());
    }
}
