//! # Cart Store
//!
//! Per-(store, table) shopping carts.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Cart Store Layout                               │
//! │                                                                     │
//! │  DashMap<TableKey, Arc<Mutex<TableCart>>>                           │
//! │     │                    │                                          │
//! │     │                    └── one mutex per table: concurrent        │
//! │     │                        add/update/remove on the SAME table    │
//! │     │                        serialize; different tables and        │
//! │     │                        different stores never contend         │
//! │     └── sharded map lookup, no global lock                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line identity
//! A cart holds at most one line per `(dish_id, option_signature)`.
//! Adding the same dish with the same options increments the existing
//! line; different option sets produce separate lines.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use smartorder_core::types::{option_signature, CartLineItem, SelectedOption, TableCart};
use smartorder_core::validation::validate_add_qty;
use smartorder_core::{Money, TableKey};
use tracing::debug;

use crate::error::EngineResult;
use crate::events::{ChangeEvent, ChangeNotifier};

/// Per-table cart store.
///
/// Carts are created lazily on first touch and never deleted, only
/// emptied; an empty cart is a normal state, not an absence.
pub struct CartStore {
    carts: DashMap<TableKey, Arc<Mutex<TableCart>>>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl CartStore {
    pub fn new(notifier: Arc<dyn ChangeNotifier>) -> Self {
        CartStore {
            carts: DashMap::new(),
            notifier,
        }
    }

    /// Returns the per-table cart cell, creating it on first touch.
    fn cell(&self, key: &TableKey) -> Arc<Mutex<TableCart>> {
        self.carts
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(TableCart::new(key))))
            .clone()
    }

    /// Gets the current cart, lazily creating an empty one. Never errors.
    pub fn get_or_create(&self, key: &TableKey) -> TableCart {
        let cell = self.cell(key);
        let cart = cell.lock().expect("cart mutex poisoned");
        cart.clone()
    }

    /// Adds a dish to the cart, merging into an existing line when the
    /// `(dish_id, option_signature)` pair matches.
    ///
    /// Returns the full cart after the mutation.
    #[allow(clippy::too_many_arguments)]
    pub fn add_item(
        &self,
        key: &TableKey,
        dish_id: &str,
        dish_name: &str,
        unit_price: Money,
        qty: i64,
        selected_options: Vec<SelectedOption>,
    ) -> EngineResult<TableCart> {
        validate_add_qty(qty)?;
        let signature = option_signature(&selected_options);
        debug!(table = %key, dish_id, qty, signature = %signature, "cart add_item");

        let cell = self.cell(key);
        let snapshot = {
            let mut cart = cell.lock().expect("cart mutex poisoned");
            match cart
                .items
                .iter_mut()
                .find(|line| line.dish_id == dish_id && line.option_signature == signature)
            {
                Some(line) => line.qty += qty,
                None => cart.items.push(CartLineItem {
                    dish_id: dish_id.to_string(),
                    dish_name: dish_name.to_string(),
                    qty,
                    unit_price,
                    selected_options,
                    option_signature: signature,
                }),
            }
            cart.updated_at = chrono::Utc::now();
            cart.clone()
        };

        self.notifier.notify(ChangeEvent::CartUpdated(snapshot.clone()));
        Ok(snapshot)
    }

    /// Sets the quantity of cart line(s) for a dish.
    ///
    /// ## Signature matching
    /// `signature = None` is a **wildcard**: every line of the dish is
    /// affected. `Some(sig)` matches exactly one line. This asymmetry
    /// with [`add_item`]/[`remove_item`] (which always match exactly) is
    /// observed production behavior and is kept on purpose.
    ///
    /// `qty <= 0` removes the matching line(s). An unknown dish is a
    /// silent no-op: the cart is returned untouched, with no timestamp
    /// bump and no event.
    pub fn update_qty(
        &self,
        key: &TableKey,
        dish_id: &str,
        signature: Option<&str>,
        qty: i64,
    ) -> TableCart {
        debug!(table = %key, dish_id, ?signature, qty, "cart update_qty");

        let cell = self.cell(key);
        let (snapshot, touched) = {
            let mut cart = cell.lock().expect("cart mutex poisoned");
            let matches = |line: &CartLineItem| {
                line.dish_id == dish_id
                    && signature.map_or(true, |sig| line.option_signature == sig)
            };
            let touched = cart.items.iter().any(matches);
            if touched {
                if qty <= 0 {
                    cart.items.retain(|line| !matches(line));
                } else {
                    for line in cart.items.iter_mut().filter(|line| matches(line)) {
                        line.qty = qty;
                    }
                }
                cart.updated_at = chrono::Utc::now();
            }
            (cart.clone(), touched)
        };

        if touched {
            self.notifier.notify(ChangeEvent::CartUpdated(snapshot.clone()));
        }
        snapshot
    }

    /// Removes the line(s) matching `(dish_id, signature)` exactly.
    /// A missing signature matches the empty signature (no options).
    /// Unknown dish is a silent no-op: no timestamp bump, no event.
    pub fn remove_item(&self, key: &TableKey, dish_id: &str, signature: Option<&str>) -> TableCart {
        let signature = signature.unwrap_or("");
        debug!(table = %key, dish_id, signature, "cart remove_item");

        let cell = self.cell(key);
        let (snapshot, touched) = {
            let mut cart = cell.lock().expect("cart mutex poisoned");
            let before = cart.items.len();
            cart.items
                .retain(|line| !(line.dish_id == dish_id && line.option_signature == signature));
            let touched = cart.items.len() != before;
            if touched {
                cart.updated_at = chrono::Utc::now();
            }
            (cart.clone(), touched)
        };

        if touched {
            self.notifier.notify(ChangeEvent::CartUpdated(snapshot.clone()));
        }
        snapshot
    }

    /// Empties the cart. The cart record itself survives.
    pub fn clear(&self, key: &TableKey) -> TableCart {
        debug!(table = %key, "cart clear");

        let cell = self.cell(key);
        let snapshot = {
            let mut cart = cell.lock().expect("cart mutex poisoned");
            cart.items.clear();
            cart.updated_at = chrono::Utc::now();
            cart.clone()
        };

        self.notifier.notify(ChangeEvent::CartUpdated(snapshot.clone()));
        snapshot
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
