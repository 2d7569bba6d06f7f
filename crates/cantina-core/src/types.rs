//! # Domain Types
//!
//! Shared enums and the records supplied by the catalog and table
//! collaborators.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Table       │   │    TaxRate      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  price_pesos    │   │  number, seats  │   │  bps (u32)      │       │
//! │  │  variants[]     │   │  status         │   │  1600 = 16%     │       │
//! │  │  modifiers[]    │   │  order_id       │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  OrderType: dine-in | takeout | delivery                               │
//! │  OrderStatus: draft | active | completed                               │
//! │             | preparing | ready | in-transit | delivered | cancelled   │
//! │  PaymentMethod: cash | card | transfer                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1600 bps = 16% (IVA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

/// Defaults to the 16% IVA.
impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Order Type & Status
// =============================================================================

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    /// Served at a table; the order must reference a table.
    #[default]
    DineIn,
    /// Picked up at the counter.
    Takeout,
    /// Sent to the customer's address.
    Delivery,
}

/// Lifecycle of an order.
///
/// ```text
/// Draft ──save()──► Active ──payment──► Completed
///
/// Delivery:
/// Draft ──save()──► Preparing ──► Ready ──► InTransit ──► Delivered
///                       │           │           │             │
///                       └───────────┴───────────┴─► Cancelled │
///                                   payment (any non-cancelled) ─► Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// In-memory order being composed; never persisted in this state.
    #[default]
    Draft,
    /// Saved dine-in or takeout order awaiting payment.
    Active,
    /// Paid.
    Completed,
    /// Delivery order in the kitchen.
    Preparing,
    /// Delivery order waiting for the driver.
    Ready,
    /// Delivery order on the road.
    InTransit,
    /// Delivery order handed over.
    Delivered,
    /// Delivery order that will not be fulfilled.
    Cancelled,
}

impl OrderStatus {
    /// Whether a payment may be processed against an order in this state.
    pub fn is_payable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Active
                | OrderStatus::Preparing
                | OrderStatus::Ready
                | OrderStatus::InTransit
                | OrderStatus::Delivered
        )
    }

    /// Whether line items and split bills can still change.
    pub fn is_editable(&self) -> bool {
        matches!(self, OrderStatus::Draft | OrderStatus::Active)
    }

    /// Returns the wire name (`"in-transit"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Active => "active",
            OrderStatus::Completed => "completed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::InTransit => "in-transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method & Ticket Type
// =============================================================================

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash into the drawer; the only method that needs a tender.
    #[default]
    Cash,
    /// Card on an external terminal.
    Card,
    /// Bank transfer.
    Transfer,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
        })
    }
}

/// Printed receipt or electronic invoice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    #[default]
    Normal,
    Electronic,
}

// =============================================================================
// Catalog
// =============================================================================

/// A size or presentation of a product with its own price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    pub name: String,
    pub price_pesos: Money,
    pub price_dollars: Money,
}

/// An optional add-on ("Extra queso") charged per unit of the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductModifier {
    pub id: String,
    pub name: String,
    pub price: Money,
}

/// A menu product as supplied by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sku: String,
    pub category_id: Option<String>,
    /// Base price; ignored when a variant is selected.
    pub price_pesos: Money,
    pub price_dollars: Money,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub modifiers: Vec<ProductModifier>,
}

impl Product {
    /// Looks up a variant by id.
    pub fn variant(&self, variant_id: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Looks up a modifier by id.
    pub fn modifier(&self, modifier_id: &str) -> Option<&ProductModifier> {
        self.modifiers.iter().find(|m| m.id == modifier_id)
    }

    /// Case-insensitive substring match on name, sku and description.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.sku.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
    }
}

/// A menu category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

/// Filters products by a search term. An empty term returns everything.
pub fn search_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let term = term.trim();
    if term.is_empty() {
        return products.iter().collect();
    }
    products.iter().filter(|p| p.matches(term)).collect()
}

// =============================================================================
// Tables
// =============================================================================

/// Occupancy of a table on the floor plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

/// Position on the floor-plan canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TablePosition {
    pub x: i32,
    pub y: i32,
}

/// A dining table as supplied by the table collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub number: u32,
    pub seats: u32,
    pub status: TableStatus,
    pub waiter: Option<String>,
    pub customer: Option<String>,
    /// Order currently served at this table.
    pub order_id: Option<String>,
    #[serde(default)]
    pub position: TablePosition,
}

impl Table {
    /// Marks the table occupied by an order.
    pub fn occupy(&mut self, order_id: &str, customer: Option<String>, waiter: Option<String>) {
        self.status = TableStatus::Occupied;
        self.order_id = Some(order_id.to_string());
        self.customer = customer;
        self.waiter = waiter;
    }

    /// Frees the table after payment.
    pub fn release(&mut self) {
        self.status = TableStatus::Available;
        self.order_id = None;
        self.customer = None;
        self.waiter = None;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, sku: &str, description: &str) -> Product {
        Product {
            id: sku.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            sku: sku.to_string(),
            category_id: None,
            price_pesos: Money::from_major(100),
            price_dollars: Money::from_cents(525),
            variants: vec![],
            modifiers: vec![],
        }
    }

    #[test]
    fn test_tax_rate_default_is_iva() {
        assert_eq!(TaxRate::default().bps(), 1600);
        assert!((TaxRate::default().percentage() - 16.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_order_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InTransit).unwrap(),
            "\"in-transit\""
        );
        assert_eq!(serde_json::to_string(&OrderType::DineIn).unwrap(), "\"dine-in\"");
        assert_eq!(OrderStatus::InTransit.to_string(), "in-transit");
    }

    #[test]
    fn test_payable_statuses() {
        assert!(OrderStatus::Active.is_payable());
        assert!(OrderStatus::Delivered.is_payable());
        assert!(!OrderStatus::Draft.is_payable());
        assert!(!OrderStatus::Completed.is_payable());
        assert!(!OrderStatus::Cancelled.is_payable());
    }

    #[test]
    fn test_search_products() {
        let products = vec![
            product("Ensalada César", "ENS001", "Lechuga romana"),
            product("Hamburguesa Clásica", "HAM001", "Carne de res"),
        ];

        assert_eq!(search_products(&products, "").len(), 2);
        assert_eq!(search_products(&products, "ham")[0].sku, "HAM001");
        assert_eq!(search_products(&products, "ROMANA")[0].sku, "ENS001");
        assert!(search_products(&products, "pizza").is_empty());
    }

    #[test]
    fn test_table_occupy_and_release() {
        let mut table = Table {
            id: "t1".to_string(),
            number: 1,
            seats: 4,
            status: TableStatus::Available,
            waiter: None,
            customer: None,
            order_id: None,
            position: TablePosition { x: 50, y: 50 },
        };

        table.occupy("order-1", Some("Mesa 1".to_string()), Some("Juan".to_string()));
        assert_eq!(table.status, TableStatus::Occupied);
        assert_eq!(table.order_id.as_deref(), Some("order-1"));

        table.release();
        assert_eq!(table.status, TableStatus::Available);
        assert!(table.order_id.is_none());
        assert!(table.customer.is_none());
        assert!(table.waiter.is_none());
    }
}
