//! # Split-Bill Allocator
//!
//! Per-customer views over an order's items and their independent totals.
//!
//! ```text
//! Order items ──┬── assigned_to = Ana   ──► Ana's view  ──► calculate_total
//!               ├── assigned_to = Luis  ──► Luis's view ──► calculate_total
//!               └── assigned_to = None  ──► shared      ──► calculate_total
//!
//! Σ view subtotals + shared subtotal == order subtotal
//! ```
//!
//! Tax is rounded per bill, so the bill taxes can differ from the order
//! tax by a centavo per bill. Subtotals always add up exactly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::order::{Order, OrderLineItem, SplitBill};
use crate::totals::{calculate_total, OrderTotals};
use crate::types::TaxRate;

/// A split bill with its items resolved and totaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SplitBillView {
    pub id: String,
    pub customer_name: String,
    pub items: Vec<OrderLineItem>,
    pub totals: OrderTotals,
}

/// Items charged to a split bill, in order.
pub fn split_bill_items<'a>(
    order: &'a Order,
    split_bill_id: &'a str,
) -> impl Iterator<Item = &'a OrderLineItem> + 'a {
    order
        .items
        .iter()
        .filter(move |i| i.assigned_to.as_deref() == Some(split_bill_id))
}

/// Totals of one split bill, using the same formula as the whole order.
pub fn calculate_split_bill_total(
    order: &Order,
    split_bill_id: &str,
    rate: TaxRate,
) -> CoreResult<OrderTotals> {
    if order.split_bill(split_bill_id).is_none() {
        return Err(CoreError::SplitBillNotFound(split_bill_id.to_string()));
    }
    Ok(calculate_total(split_bill_items(order, split_bill_id), rate))
}

/// Resolves one split bill into a view.
pub fn split_bill_view(order: &Order, bill: &SplitBill, rate: TaxRate) -> SplitBillView {
    let items: Vec<OrderLineItem> = split_bill_items(order, &bill.id).cloned().collect();
    let totals = calculate_total(&items, rate);
    SplitBillView {
        id: bill.id.clone(),
        customer_name: bill.customer_name.clone(),
        items,
        totals,
    }
}

/// Views for every split bill on the order.
pub fn split_bill_views(order: &Order, rate: TaxRate) -> Vec<SplitBillView> {
    order
        .split_bills
        .iter()
        .map(|bill| split_bill_view(order, bill, rate))
        .collect()
}

/// Totals of the items no split bill has claimed.
pub fn unassigned_totals(order: &Order, rate: TaxRate) -> OrderTotals {
    calculate_total(order.unassigned_items(), rate)
}

// =============================================================================
// Unit Tests
// =============================================================================
