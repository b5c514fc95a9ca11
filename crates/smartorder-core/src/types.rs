//! # Domain Types
//!
//! Core domain types for the order/table/cart lifecycle.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │   TableCart    │   │     Order      │   │   TableInfo    │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  TableKey      │   │  order_id      │   │  TableKey      │      │
//! │  │  CartLineItem* │   │  OrderItem*    │   │  TableStatus   │      │
//! │  │  (one line per │   │  (immutable    │   │  IDLE/DINING/  │      │
//! │  │  dish+options) │   │  snapshot)     │   │  TO_PAY        │      │
//! │  └────────────────┘   └────────────────┘   └────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Cart lines and order items freeze the dish name and unit price at the
//! moment they are created. A later menu edit never rewrites an open cart
//! or a placed order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::{StoreId, TableKey, TableNo};
use crate::money::Money;

// =============================================================================
// Selected Options & Signatures
// =============================================================================

/// One option chosen for a dish (e.g. "Size / Large", "Spice / Mild").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    pub group_id: String,
    pub group_name: String,
    pub option_id: String,
    pub option_name: String,
    /// Surcharge for this option; zero when the option is free.
    #[serde(default)]
    pub extra_price: Money,
}

/// Builds the normalized signature for a set of selected options.
///
/// The signature is the sorted, comma-joined list of option ids; the empty
/// string when no options are selected. Order-independent: the same set of
/// options always produces the same signature, so it can serve as part of
/// the cart line key.
pub fn option_signature(options: &[SelectedOption]) -> String {
    if options.is_empty() {
        return String::new();
    }
    let mut ids: Vec<&str> = options.iter().map(|o| o.option_id.as_str()).collect();
    ids.sort_unstable();
    ids.join(",")
}

// =============================================================================
// Cart
// =============================================================================

/// A line in a table's cart.
///
/// ## Invariants
/// - `qty >= 1` while the line exists; a qty of 0 removes it
/// - at most one line per `(dish_id, option_signature)` in a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub dish_id: String,
    /// Dish name at the time the line was added (frozen).
    pub dish_name: String,
    pub qty: i64,
    /// Unit price at the time the line was added (frozen).
    pub unit_price: Money,
    pub selected_options: Vec<SelectedOption>,
    /// Derived from `selected_options`; stored so lookups never recompute.
    pub option_signature: String,
}

impl CartLineItem {
    /// Line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.qty)
    }
}

/// The cart of one table.
///
/// Created lazily on first touch and never deleted, only emptied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCart {
    pub store_id: StoreId,
    pub table_no: TableNo,
    pub items: Vec<CartLineItem>,
    pub updated_at: DateTime<Utc>,
}

impl TableCart {
    pub fn new(key: &TableKey) -> Self {
        TableCart {
            store_id: key.store_id.clone(),
            table_no: key.table_no.clone(),
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Total quantity across all lines.
    pub fn total_qty(&self) -> i64 {
        self.items.iter().map(|i| i.qty).sum()
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.line_total()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Occupancy status of a table.
///
/// Transitions are driven entirely by OrderLedger call sites; this type
/// carries no transition guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Idle,
    Dining,
    ToPay,
}

impl Default for TableStatus {
    fn default() -> Self {
        TableStatus::Idle
    }
}

/// One table's registry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub store_id: StoreId,
    pub table_no: TableNo,
    pub status: TableStatus,
}

impl TableInfo {
    pub fn new(key: &TableKey) -> Self {
        TableInfo {
            store_id: key.store_id.clone(),
            table_no: key.table_no.clone(),
            status: TableStatus::Idle,
        }
    }
}

/// Binding between a scannable code and a table.
///
/// ## Invariant
/// A code maps to exactly one table, and a table has at most one active
/// code; binding evicts the previous owner on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCode {
    pub store_id: StoreId,
    pub table_no: TableNo,
    pub code: String,
}

// =============================================================================
// Orders
// =============================================================================

/// Workflow tag on an order.
///
/// Any status may follow any status; workflow validation is the caller's
/// responsibility (kitchen and cashier screens drive it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    Accepted,
    Ready,
    Closed,
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// A line item inside an order. Immutable snapshot taken at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub dish_id: String,
    pub dish_name: String,
    pub qty: i64,
    pub unit_price: Money,
    /// Pre-computed line total supplied by the caller; when absent the
    /// total falls back to `unit_price × qty`.
    #[serde(default)]
    pub line_total: Option<Money>,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
    #[serde(default)]
    pub item_remark: Option<String>,
}

impl OrderItem {
    /// Effective total of this line.
    pub fn effective_total(&self) -> Money {
        self.line_total
            .unwrap_or_else(|| self.unit_price.multiply_quantity(self.qty))
    }
}

/// An order placed against a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Globally unique id (UUID v4).
    pub order_id: String,
    pub store_id: StoreId,
    pub table_no: TableNo,
    #[serde(default)]
    pub client_id: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub people_count: Option<i32>,
    #[serde(default)]
    pub remark: Option<String>,
    /// Immutable item snapshot taken at creation.
    pub items: Vec<OrderItem>,
    /// Σ(line_total if present else unit_price × qty), fixed at creation.
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paid_by: Option<String>,
    #[serde(default)]
    pub cleared_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cleared_by: Option<String>,
}

/// Computes an order total from its items.
pub fn order_total(items: &[OrderItem]) -> Money {
    items.iter().map(|i| i.effective_total()).sum()
}

/// Request payload for placing an order. The request layer fills it from
/// the authenticated session and the table's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub store_id: StoreId,
    pub table_no: TableNo,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub people_count: Option<i32>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
