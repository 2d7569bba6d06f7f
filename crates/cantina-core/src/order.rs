//! # Order Aggregate
//!
//! The mutable order entity and the operations that keep it consistent.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Order Lifecycle                                 │
//! │                                                                         │
//! │  Order::new()           in-memory draft, no created_at                  │
//! │       │                                                                 │
//! │       ├── add_item / remove_item / update_quantity                      │
//! │       ├── create_split_bill / assign_item_to_split_bill                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  save(now)              Active (dine-in, takeout) or Preparing          │
//! │       │                 (delivery), created_at stamped                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PaymentProcessor       Completed, paid_at stamped                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Split Bill Membership
//! Each line item carries at most one `assigned_to` split-bill id. Split
//! bills hold no item copies; their items are derived from that field (see
//! [`crate::split_bill`]). Reassigning an item moves it, and removing an
//! item removes it from its bill.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::currency::Discount;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::payment::Payment;
use crate::totals::{calculate_total, OrderTotals};
use crate::types::{OrderStatus, OrderType, Product, ProductModifier, ProductVariant, TaxRate};
use crate::validation::{
    validate_customer_name, validate_order_size, validate_phone, validate_price,
    validate_quantity, validate_required,
};

/// Default delivery charge ($50.00 MXN).
pub const DEFAULT_DELIVERY_FEE_CENTAVOS: i64 = 5000;

/// Minutes from placing a delivery order to its estimated arrival.
pub const DELIVERY_ESTIMATE_MINUTES: i64 = 45;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Line Items
// =============================================================================

/// A modifier as captured on a line item: name and unit price at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectedModifier {
    pub name: String,
    pub price: Money,
}

impl SelectedModifier {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

impl From<&ProductModifier> for SelectedModifier {
    fn from(modifier: &ProductModifier) -> Self {
        SelectedModifier::new(modifier.name.clone(), modifier.price)
    }
}

/// One product instance on an order.
///
/// Name, price and modifier prices are copied from the catalog when the
/// item is added, so later catalog edits never change an open order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: String,
    pub product_id: String,
    pub name: String,
    /// Always ≥ 1 while the item is on an order.
    pub quantity: i64,
    /// Unit price in MXN, from the variant when one was chosen.
    pub price: Money,
    pub variant: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<SelectedModifier>,
    pub special_instructions: Option<String>,
    /// Split bill this item is charged to, if any.
    pub assigned_to: Option<String>,
}

impl OrderLineItem {
    /// Sum of modifier prices for one unit.
    pub fn modifiers_total(&self) -> Money {
        self.modifiers.iter().map(|m| m.price).sum()
    }

    /// `price × qty + modifiers × qty`
    pub fn line_subtotal(&self) -> Money {
        (self.price + self.modifiers_total()).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Split Bills, Adjustments, Delivery
// =============================================================================

/// A named sub-account within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SplitBill {
    pub id: String,
    pub customer_name: String,
}

/// An order-level discount or promotion. Orders carry empty lists of these
/// today; payment-time discounts go through [`crate::payment::PaymentRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderAdjustment {
    pub id: String,
    pub description: String,
    pub discount: Discount,
}

/// Where and how a delivery order is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
    /// Time the customer asked for, free text ("20:30").
    pub delivery_time: Option<String>,
    pub delivery_fee: Money,
    pub assigned_driver: Option<String>,
    #[ts(as = "Option<String>")]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl DeliveryDetails {
    /// Details with the default fee and no driver.
    pub fn new(phone: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            address: address.into(),
            neighborhood: String::new(),
            city: String::new(),
            zip_code: String::new(),
            delivery_time: None,
            delivery_fee: Money::from_cents(DEFAULT_DELIVERY_FEE_CENTAVOS),
            assigned_driver: None,
            estimated_delivery: None,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// The aggregate root for one dine-in, takeout or delivery transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Required for dine-in orders.
    pub table_id: Option<String>,
    pub customer: Option<String>,
    pub customer_id: Option<String>,
    pub waiter: Option<String>,
    pub special_instructions: Option<String>,
    pub items: Vec<OrderLineItem>,
    #[serde(default)]
    pub split_bills: Vec<SplitBill>,
    #[serde(default)]
    pub discounts: Vec<OrderAdjustment>,
    #[serde(default)]
    pub promotions: Vec<OrderAdjustment>,
    pub status: OrderStatus,
    pub delivery: Option<DeliveryDetails>,
    pub payment: Option<Payment>,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Starts an empty draft.
    pub fn new(order_type: OrderType) -> Self {
        Self {
            id: new_id(),
            order_type,
            table_id: None,
            customer: None,
            customer_id: None,
            waiter: None,
            special_instructions: None,
            items: Vec::new(),
            split_bills: Vec::new(),
            discounts: Vec::new(),
            promotions: Vec::new(),
            status: OrderStatus::Draft,
            delivery: None,
            payment: None,
            created_at: None,
            paid_at: None,
        }
    }

    /// Starts a dine-in draft for a table.
    pub fn dine_in(table_id: impl Into<String>, waiter: Option<String>) -> Self {
        let mut order = Order::new(OrderType::DineIn);
        order.table_id = Some(table_id.into());
        order.waiter = waiter;
        order
    }

    fn status_error(&self, operation: &str) -> CoreError {
        CoreError::InvalidOrderStatus {
            order_id: self.id.clone(),
            current_status: self.status.to_string(),
            operation: operation.to_string(),
        }
    }

    fn ensure_editable(&self, operation: &str) -> CoreResult<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(self.status_error(operation))
        }
    }

    fn ensure_delivery(&self, operation: &str) -> CoreResult<()> {
        if self.order_type == OrderType::Delivery {
            Ok(())
        } else {
            Err(self.status_error(operation))
        }
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// Adds a catalog product.
    ///
    /// The unit price comes from the variant when one is given, otherwise
    /// from the product's base price. Modifier names and prices are copied.
    /// Returns the new item's id.
    pub fn add_item(
        &mut self,
        product: &Product,
        variant: Option<&ProductVariant>,
        modifiers: &[ProductModifier],
        quantity: i64,
        special_instructions: Option<String>,
    ) -> CoreResult<String> {
        let price = variant.map_or(product.price_pesos, |v| v.price_pesos);
        self.add_line(
            &product.id,
            &product.name,
            price,
            variant.map(|v| v.name.clone()),
            modifiers.iter().map(SelectedModifier::from).collect(),
            quantity,
            special_instructions,
        )
    }

    /// Adds a line from already-resolved values.
    #[allow(clippy::too_many_arguments)]
    pub fn add_line(
        &mut self,
        product_id: &str,
        name: &str,
        price: Money,
        variant: Option<String>,
        modifiers: Vec<SelectedModifier>,
        quantity: i64,
        special_instructions: Option<String>,
    ) -> CoreResult<String> {
        self.ensure_editable("add items")?;
        validate_quantity(quantity)?;
        validate_order_size(self.items.len())?;
        validate_price("price", price)?;
        for modifier in &modifiers {
            validate_price("modifier price", modifier.price)?;
        }

        let special_instructions = special_instructions
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let item = OrderLineItem {
            id: new_id(),
            product_id: product_id.to_string(),
            name: name.to_string(),
            quantity,
            price,
            variant,
            modifiers,
            special_instructions,
            assigned_to: None,
        };
        let id = item.id.clone();
        self.items.push(item);
        Ok(id)
    }

    /// Looks up a line item.
    pub fn item(&self, item_id: &str) -> Option<&OrderLineItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    fn item_mut(&mut self, item_id: &str) -> CoreResult<&mut OrderLineItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))
    }

    /// Removes an item, and with it any split-bill membership.
    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<OrderLineItem> {
        self.ensure_editable("remove items")?;
        let index = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Sets an item's quantity. Zero or less removes the item.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return self.remove_item(item_id).map(|_| ());
        }
        self.ensure_editable("change quantities")?;
        validate_quantity(quantity)?;
        self.item_mut(item_id)?.quantity = quantity;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Split Bills
    // -------------------------------------------------------------------------

    /// Adds an empty split bill and returns its id.
    pub fn create_split_bill(&mut self, customer_name: &str) -> CoreResult<String> {
        self.ensure_editable("split the bill")?;
        let customer_name = validate_customer_name(customer_name)?;
        let bill = SplitBill {
            id: new_id(),
            customer_name,
        };
        let id = bill.id.clone();
        self.split_bills.push(bill);
        Ok(id)
    }

    /// Looks up a split bill.
    pub fn split_bill(&self, split_bill_id: &str) -> Option<&SplitBill> {
        self.split_bills.iter().find(|b| b.id == split_bill_id)
    }

    /// Charges an item to a split bill, moving it off any previous bill.
    pub fn assign_item_to_split_bill(&mut self, item_id: &str, split_bill_id: &str) -> CoreResult<()> {
        self.ensure_editable("split the bill")?;
        if self.split_bill(split_bill_id).is_none() {
            return Err(CoreError::SplitBillNotFound(split_bill_id.to_string()));
        }
        self.item_mut(item_id)?.assigned_to = Some(split_bill_id.to_string());
        Ok(())
    }

    /// Returns an item to the shared (unassigned) part of the order.
    pub fn unassign_item(&mut self, item_id: &str) -> CoreResult<()> {
        self.ensure_editable("split the bill")?;
        self.item_mut(item_id)?.assigned_to = None;
        Ok(())
    }

    /// Deletes a split bill; its items become unassigned.
    pub fn remove_split_bill(&mut self, split_bill_id: &str) -> CoreResult<SplitBill> {
        self.ensure_editable("split the bill")?;
        let index = self
            .split_bills
            .iter()
            .position(|b| b.id == split_bill_id)
            .ok_or_else(|| CoreError::SplitBillNotFound(split_bill_id.to_string()))?;
        for item in &mut self.items {
            if item.assigned_to.as_deref() == Some(split_bill_id) {
                item.assigned_to = None;
            }
        }
        Ok(self.split_bills.remove(index))
    }

    // -------------------------------------------------------------------------
    // Save & Delivery
    // -------------------------------------------------------------------------

    /// Finalizes a draft: dine-in and takeout become `Active`, delivery
    /// becomes `Preparing` with an estimated arrival.
    ///
    /// Occupying the table is the caller's job (see `cantina_db`'s service).
    pub fn save(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        if self.status != OrderStatus::Draft {
            return Err(self.status_error("be saved again"));
        }
        if self.items.is_empty() {
            return Err(ValidationError::required("items").into());
        }

        let status = match self.order_type {
            OrderType::DineIn => {
                let table = self.table_id.as_deref().unwrap_or_default();
                validate_required("table", table)?;
                OrderStatus::Active
            }
            OrderType::Takeout => OrderStatus::Active,
            OrderType::Delivery => {
                let delivery = self
                    .delivery
                    .as_mut()
                    .ok_or_else(|| ValidationError::required("delivery details"))?;
                delivery.estimated_delivery = Some(now + Duration::minutes(DELIVERY_ESTIMATE_MINUTES));
                OrderStatus::Preparing
            }
        };

        self.status = status;
        self.created_at = Some(now);
        Ok(())
    }

    /// Attaches customer and address to a delivery draft, then saves it.
    ///
    /// Customer name, phone and address are required. On error the draft is
    /// left exactly as it was.
    pub fn place_delivery(
        &mut self,
        customer_name: &str,
        details: DeliveryDetails,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.ensure_delivery("be placed for delivery")?;
        let customer = validate_customer_name(customer_name)?;
        let phone = validate_phone(&details.phone)?;
        let address = validate_required("address", &details.address)?;
        validate_price("delivery fee", details.delivery_fee)?;

        let mut placed = self.clone();
        placed.customer = Some(customer);
        placed.delivery = Some(DeliveryDetails {
            phone,
            address,
            ..details
        });
        placed.save(now)?;

        *self = placed;
        Ok(())
    }

    /// Moves a delivery order along its workflow.
    ///
    /// ```text
    /// preparing → ready → in-transit → delivered
    /// preparing | ready | in-transit → cancelled
    /// ```
    pub fn set_delivery_status(&mut self, next: OrderStatus) -> CoreResult<()> {
        self.ensure_delivery("change delivery status")?;

        use OrderStatus::*;
        let allowed = matches!(
            (self.status, next),
            (Preparing, Ready)
                | (Ready, InTransit)
                | (InTransit, Delivered)
                | (Preparing | Ready | InTransit, Cancelled)
        );
        if !allowed {
            return Err(CoreError::InvalidStatusTransition {
                order_id: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        self.status = next;
        Ok(())
    }

    /// Assigns the driver taking a delivery order.
    pub fn assign_driver(&mut self, driver: &str) -> CoreResult<()> {
        self.ensure_delivery("assign a driver")?;
        if matches!(
            self.status,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Completed
        ) {
            return Err(self.status_error("assign a driver"));
        }
        let driver = validate_required("driver", driver)?;
        let delivery = self
            .delivery
            .as_mut()
            .ok_or_else(|| ValidationError::required("delivery details"))?;
        delivery.assigned_driver = Some(driver);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Payment & Totals
    // -------------------------------------------------------------------------

    /// Marks the order paid. Only the payment processor calls this.
    pub(crate) fn complete(&mut self, payment: Payment, now: DateTime<Utc>) {
        self.status = OrderStatus::Completed;
        self.payment = Some(payment);
        self.paid_at = Some(now);
    }

    /// Delivery charge, zero unless this is a delivery order.
    pub fn delivery_fee(&self) -> Money {
        self.delivery
            .as_ref()
            .filter(|_| self.order_type == OrderType::Delivery)
            .map_or(Money::zero(), |d| d.delivery_fee)
    }

    /// Current totals, derived from the items on every call.
    pub fn totals(&self, rate: TaxRate) -> OrderTotals {
        calculate_total(&self.items, rate).with_delivery_fee(self.delivery_fee())
    }

    /// Items not charged to any split bill.
    pub fn unassigned_items(&self) -> impl Iterator<Item = &OrderLineItem> {
        self.items.iter().filter(|i| i.assigned_to.is_none())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
