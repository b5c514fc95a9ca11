//! # SmartOrder Engine
//!
//! The stateful core of the SmartOrder restaurant platform: carts,
//! tables, orders, billing and the background renewal sweep, all
//! in-memory and safe under concurrent access.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        OrderingEngine                               │
//! │                                                                     │
//! │  CartStore          per-table carts, merge by (dish, options)       │
//! │  TableRegistry      occupancy status, scoped listing                │
//! │  TableCodeDirectory scannable code ↔ table bindings                 │
//! │  TableSessionLock   TTL guest-session locks                         │
//! │  OrderLedger        orders + table status side effects              │
//! │  BillingLedger      wallets, subscriptions, AI metering             │
//! │  RenewalScheduler   periodic subscription auto-renewal              │
//! │                                                                     │
//! │  every mutation ──► ChangeNotifier (CART_UPDATED, ORDER_CREATED,    │
//! │                     ORDER_UPDATED, TABLE_UPDATED, MENU_UPDATED)     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure data types live in `smartorder-core`; this crate owns the state
//! and the concurrency. Identity is addressed by `(store_id, table_no)`
//! throughout, so tenants never observe each other's state.
//!
//! ## Example
//! ```
//! use smartorder_core::{Money, TableKey};
//! use smartorder_engine::OrderingEngine;
//!
//! let engine = OrderingEngine::with_defaults();
//! let table = TableKey::parse("store-1", "A1").unwrap();
//! let cart = engine
//!     .carts()
//!     .add_item(&table, "dish-1", "Pad Thai", Money::from_cents(1099), 2, vec![])
//!     .unwrap();
//! assert_eq!(cart.subtotal().cents(), 2198);
//! ```

pub mod billing;
pub mod cart;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod orders;
pub mod renewal;
pub mod session;
pub mod table_codes;
pub mod tables;

pub use billing::BillingLedger;
pub use cart::CartStore;
pub use config::{ConfigError, EngineConfig};
pub use engine::OrderingEngine;
pub use error::{EngineError, EngineResult};
pub use events::{ChangeEvent, ChangeNotifier, LoggingNotifier, NoopNotifier};
pub use orders::OrderLedger;
pub use renewal::{auto_renew_subscriptions, RenewalScheduler};
pub use session::TableSessionLock;
pub use table_codes::TableCodeDirectory;
pub use tables::TableRegistry;
