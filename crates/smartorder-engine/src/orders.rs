//! # Order Ledger
//!
//! Order records, their status/payment state machine, and the table
//! occupancy side effects.
//!
//! ## Serialization Point
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Per-table Order File                             │
//! │                                                                     │
//! │  DashMap<TableKey, Arc<Mutex<Vec<Order>>>>                          │
//! │                         │                                           │
//! │   create_order ─────────┤  all four hold the SAME per-table         │
//! │   settle_table ─────────┤  mutex, so a create racing a sweep        │
//! │   clear_table ──────────┤  lands strictly before or after it,       │
//! │   update_* ─────────────┘  never interleaved                        │
//! │                                                                     │
//! │  order_index: DashMap<order_id, TableKey>  (single-order lookups)   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Workflow
//! Order `status` is a free-form workflow tag (NEW → ACCEPTED → READY →
//! CLOSED on the kitchen screens); the ledger never validates transitions.
//! Table status, by contrast, is derived here and only here:
//!
//! - create        → table DINING
//! - paid / settle → table TO_PAY
//! - clear         → table DINING if open orders remain, else IDLE

use std::sync::{Arc, Mutex};

use chrono::Utc;
use dashmap::DashMap;
use smartorder_core::types::{
    CreateOrderRequest, Order, OrderStatus, PaymentStatus, TableStatus,
};
use smartorder_core::{order_total, StoreId, TableKey, TableNo};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::events::{ChangeEvent, ChangeNotifier};
use crate::tables::TableRegistry;

/// Order ledger. Mutates [`TableRegistry`] as a side effect.
pub struct OrderLedger {
    /// Orders grouped by table; the per-table mutex is the serialization
    /// point shared by creation, settlement and clearing.
    by_table: DashMap<TableKey, Arc<Mutex<Vec<Order>>>>,
    /// Global order id → owning table.
    order_index: DashMap<String, TableKey>,
    registry: Arc<TableRegistry>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl OrderLedger {
    pub fn new(registry: Arc<TableRegistry>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        OrderLedger {
            by_table: DashMap::new(),
            order_index: DashMap::new(),
            registry,
            notifier,
        }
    }

    fn table_file(&self, key: &TableKey) -> Arc<Mutex<Vec<Order>>> {
        self.by_table
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    /// Places a new order against a table.
    ///
    /// Each call creates an independent order even if one is already open
    /// for the table. Items are snapshotted as given; the total is
    /// Σ(line_total if present else unit_price × qty). The table is
    /// unconditionally moved to DINING (idempotent if already DINING).
    pub fn create_order(&self, request: CreateOrderRequest) -> EngineResult<Order> {
        let key = TableKey::new(request.store_id.clone(), request.table_no.clone());
        let now = Utc::now();

        let order = Order {
            order_id: Uuid::new_v4().to_string(),
            store_id: request.store_id,
            table_no: request.table_no,
            client_id: request.client_id,
            status: OrderStatus::New,
            payment_status: PaymentStatus::Unpaid,
            people_count: request.people_count,
            remark: request.remark,
            total_amount: order_total(&request.items),
            items: request.items,
            created_at: now,
            updated_at: now,
            paid_at: None,
            paid_by: None,
            cleared_at: None,
            cleared_by: None,
        };

        let file = self.table_file(&key);
        let table = {
            let mut orders = file.lock().expect("order file mutex poisoned");
            self.order_index.insert(order.order_id.clone(), key.clone());
            orders.push(order.clone());
            // Table transition happens inside the critical section so a
            // concurrent clear_table cannot recompute occupancy between
            // our insert and our DINING write. The event is deferred
            // until the lock is released.
            self.registry.write_status(&key, TableStatus::Dining)
        };

        info!(order_id = %order.order_id, table = %key, total = %order.total_amount, "order created");
        self.notifier.notify(ChangeEvent::TableUpdated(table));
        self.notifier.notify(ChangeEvent::OrderCreated(order.clone()));
        Ok(order)
    }

    /// Lists orders with optional filters, newest first.
    pub fn list_orders(
        &self,
        store_id: Option<&StoreId>,
        table_no: Option<&TableNo>,
        status: Option<OrderStatus>,
    ) -> Vec<Order> {
        let mut result: Vec<Order> = Vec::new();
        for entry in self.by_table.iter() {
            let key = entry.key();
            if let Some(store) = store_id {
                if &key.store_id != store {
                    continue;
                }
            }
            if let Some(table) = table_no {
                if &key.table_no != table {
                    continue;
                }
            }
            let orders = entry.value().lock().expect("order file mutex poisoned");
            result.extend(
                orders
                    .iter()
                    .filter(|o| status.map_or(true, |s| o.status == s))
                    .cloned(),
            );
        }
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// Fetches one order by id.
    pub fn get_order(&self, order_id: &str) -> EngineResult<Order> {
        let key = self
            .order_index
            .get(order_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;
        let file = self.table_file(&key);
        let orders = file.lock().expect("order file mutex poisoned");
        orders
            .iter()
            .find(|o| o.order_id == order_id)
            .cloned()
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))
    }

    /// Overwrites the workflow status of one order. No transition
    /// validation, by design: the kitchen screens own the workflow.
    pub fn update_status(
        &self,
        store_id: &StoreId,
        order_id: &str,
        status: OrderStatus,
    ) -> EngineResult<Order> {
        let snapshot = self.mutate_order(store_id, order_id, |order| {
            order.status = status;
            order.updated_at = Utc::now();
        })?;
        debug!(order_id, ?status, "order status updated");
        self.notifier
            .notify(ChangeEvent::OrderUpdated(snapshot.clone()));
        Ok(snapshot)
    }

    /// Overwrites the payment state of one order.
    ///
    /// A transition to PAID moves the table to TO_PAY even if other
    /// unpaid orders remain at that table (observed behavior: the
    /// cashier screen drives per-order payment this way).
    pub fn update_payment(
        &self,
        store_id: &StoreId,
        order_id: &str,
        payment_status: PaymentStatus,
        paid_by: Option<String>,
    ) -> EngineResult<Order> {
        let now = Utc::now();
        let snapshot = self.mutate_order(store_id, order_id, |order| {
            order.payment_status = payment_status;
            order.paid_by = paid_by.clone();
            order.paid_at = Some(now);
            order.updated_at = now;
        })?;

        if payment_status == PaymentStatus::Paid {
            let key = TableKey::new(snapshot.store_id.clone(), snapshot.table_no.clone());
            self.registry.set_status(&key, TableStatus::ToPay);
        }

        debug!(order_id, ?payment_status, "order payment updated");
        self.notifier
            .notify(ChangeEvent::OrderUpdated(snapshot.clone()));
        Ok(snapshot)
    }

    /// Marks every currently UNPAID order at the table as PAID with one
    /// shared timestamp and actor. Returns the number of orders
    /// transitioned; the table moves to TO_PAY only when that count is
    /// non-zero.
    ///
    /// Atomic with respect to concurrent `create_order` on the same
    /// table: a racing create lands strictly before the sweep (and is
    /// settled) or strictly after it (and stays unpaid).
    pub fn settle_table(&self, key: &TableKey, paid_by: &str) -> usize {
        let file = self.table_file(key);
        let now = Utc::now();

        let (settled, count, table) = {
            let mut orders = file.lock().expect("order file mutex poisoned");
            let mut settled = Vec::new();
            for order in orders
                .iter_mut()
                .filter(|o| o.payment_status == PaymentStatus::Unpaid)
            {
                order.payment_status = PaymentStatus::Paid;
                order.paid_by = Some(paid_by.to_string());
                order.paid_at = Some(now);
                order.updated_at = now;
                settled.push(order.clone());
            }
            let count = settled.len();
            let table = if count > 0 {
                Some(self.registry.write_status(key, TableStatus::ToPay))
            } else {
                None
            };
            (settled, count, table)
        };

        info!(table = %key, count, paid_by, "table settled");
        if let Some(table) = table {
            self.notifier.notify(ChangeEvent::TableUpdated(table));
        }
        for order in settled {
            self.notifier.notify(ChangeEvent::OrderUpdated(order));
        }
        count
    }

    /// Closes out every PAID-but-not-CLOSED order at the table, then
    /// recomputes occupancy from the state it just wrote: DINING if any
    /// non-CLOSED order remains (e.g. one placed between settle and
    /// clear), IDLE otherwise.
    pub fn clear_table(&self, key: &TableKey, cleared_by: &str) {
        let file = self.table_file(key);
        let now = Utc::now();

        let (closed, table) = {
            let mut orders = file.lock().expect("order file mutex poisoned");
            let mut closed = Vec::new();
            for order in orders.iter_mut().filter(|o| {
                o.payment_status == PaymentStatus::Paid && o.status != OrderStatus::Closed
            }) {
                order.status = OrderStatus::Closed;
                order.cleared_by = Some(cleared_by.to_string());
                order.cleared_at = Some(now);
                order.updated_at = now;
                closed.push(order.clone());
            }

            // Read-after-write: the scan below observes the closures
            // made above, still under the table lock.
            let any_open = orders.iter().any(|o| o.status != OrderStatus::Closed);
            let next = if any_open {
                TableStatus::Dining
            } else {
                TableStatus::Idle
            };
            (closed, self.registry.write_status(key, next))
        };

        info!(table = %key, closed = closed.len(), cleared_by, "table cleared");
        self.notifier.notify(ChangeEvent::TableUpdated(table));
        for order in closed {
            self.notifier.notify(ChangeEvent::OrderUpdated(order));
        }
    }

    /// Locates an order by id, verifies tenant scope, applies `f` under
    /// the owning table's lock and returns the mutated snapshot.
    fn mutate_order<F>(&self, store_id: &StoreId, order_id: &str, f: F) -> EngineResult<Order>
    where
        F: FnOnce(&mut Order),
    {
        let key = self
            .order_index
            .get(order_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;

        if &key.store_id != store_id {
            return Err(EngineError::OrderScopeMismatch {
                order_id: order_id.to_string(),
                store_id: store_id.to_string(),
            });
        }

        let file = self.table_file(&key);
        let mut orders = file.lock().expect("order file mutex poisoned");
        let order = orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;
        f(order);
        Ok(order.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
