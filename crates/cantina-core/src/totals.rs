//! # Order Totals Calculator
//!
//! Derives subtotal, tax and total from line items. Totals are never stored
//! on the order; every read calls [`calculate_total`] again.
//!
//! ```text
//! line subtotal = price × qty + Σ(modifier price) × qty
//! subtotal      = Σ line subtotal
//! tax           = round(subtotal × rate)
//! total         = subtotal + tax (+ delivery fee, untaxed)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::order::OrderLineItem;
use crate::types::TaxRate;

/// Derived totals of an order, a split bill or any list of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    /// Delivery charge; zero for anything but a delivery order.
    #[serde(default)]
    pub delivery_fee: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Adds an untaxed delivery fee on top of the item totals.
    pub fn with_delivery_fee(self, fee: Money) -> Self {
        OrderTotals {
            delivery_fee: fee,
            total: self.subtotal + self.tax + fee,
            ..self
        }
    }
}

/// Computes totals for a list of line items.
///
/// Accepts any iterator of item references so callers can total a filtered
/// subset (a split bill, the unassigned items) without cloning.
pub fn calculate_total<'a, I>(items: I, rate: TaxRate) -> OrderTotals
where
    I: IntoIterator<Item = &'a OrderLineItem>,
{
    let subtotal: Money = items.into_iter().map(OrderLineItem::line_subtotal).sum();
    let tax = subtotal.calculate_tax(rate);

    OrderTotals {
        subtotal,
        tax,
        delivery_fee: Money::zero(),
        total: subtotal + tax,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::SelectedModifier;

    fn item(price: i64, qty: i64, modifiers: &[i64]) -> OrderLineItem {
        OrderLineItem {
            id: format!("item-{}-{}", price, qty),
            product_id: "p".to_string(),
            name: "Item".to_string(),
            quantity: qty,
            price: Money::from_cents(price),
            variant: None,
            modifiers: modifiers
                .iter()
                .map(|&m| SelectedModifier::new("mod", Money::from_cents(m)))
                .collect(),
            special_instructions: None,
            assigned_to: None,
        }
    }

    #[test]
    fn test_single_item_with_modifier() {
        let items = vec![item(10_000, 2, &[1_000])];
        let totals = calculate_total(&items, TaxRate::from_bps(1600));

        assert_eq!(totals.subtotal, Money::from_major(220));
        assert_eq!(totals.tax, Money::from_cents(3520));
        assert_eq!(totals.total, Money::from_cents(25520));
        assert_eq!(totals.delivery_fee, Money::zero());
    }

    #[test]
    fn test_every_modifier_applies_per_unit() {
        let items = vec![item(5_000, 3, &[500, 250])];
        let totals = calculate_total(&items, TaxRate::zero());
        // 3 × 50.00 + 3 × (5.00 + 2.50)
        assert_eq!(totals.subtotal, Money::from_cents(17_250));
    }

    #[test]
    fn test_empty_items() {
        let items: Vec<OrderLineItem> = Vec::new();
        let totals = calculate_total(&items, TaxRate::default());
        assert_eq!(totals, OrderTotals::default());
    }

    #[test]
    fn test_total_is_subtotal_plus_tax() {
        let lists = vec![
            vec![item(3_333, 3, &[])],
            vec![item(1, 1, &[]), item(7, 999, &[3])],
            vec![item(12_345, 7, &[101, 202]), item(99, 2, &[1])],
        ];
        for rate in [0, 825, 1600, 10_000] {
            let rate = TaxRate::from_bps(rate);
            for items in &lists {
                let t = calculate_total(items, rate);
                assert_eq!(t.total, t.subtotal + t.tax);
                assert_eq!(t.tax, t.subtotal.calculate_tax(rate));
                // within half a centavo of the exact product
                let exact = t.subtotal.cents() as i128 * rate.bps() as i128;
                let diff = (t.tax.cents() as i128 * 10_000 - exact).abs();
                assert!(diff <= 5_000);
            }
        }
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let items = vec![item(4_550, 2, &[1_500]), item(2_000, 1, &[])];
        let first = calculate_total(&items, TaxRate::default());
        let second = calculate_total(&items, TaxRate::default());
        assert_eq!(first, second);
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_delivery_fee_is_untaxed() {
        let items = vec![item(10_000, 1, &[])];
        let totals = calculate_total(&items, TaxRate::from_bps(1600))
            .with_delivery_fee(Money::from_major(35));

        assert_eq!(totals.tax, Money::from_major(16));
        assert_eq!(totals.total, Money::from_major(151));
    }
}
