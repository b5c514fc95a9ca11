//! # smartorder-core: Pure Domain Model for SmartOrder
//!
//! This crate is the **heart** of SmartOrder. It contains the domain types
//! and pure calculations for a multi-tenant restaurant ordering service,
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      SmartOrder Architecture                        │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │            Request layer (HTTP, auth — out of scope)          │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │            smartorder-engine (stateful lifecycle)             │ │
//! │  │   CartStore · TableRegistry · OrderLedger · BillingLedger     │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │              ★ smartorder-core (THIS CRATE) ★                 │ │
//! │  │                                                               │ │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐      │ │
//! │  │   │  keys   │  │  money  │  │  types  │  │  billing   │      │ │
//! │  │   │TableKey │  │  Money  │  │  Order  │  │  Wallet    │      │ │
//! │  │   │StoreId  │  │ (cents) │  │  Cart   │  │  Ledger    │      │ │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └────────────┘      │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`keys`] - Tenant/table key types ([`StoreId`], [`TableKey`])
//! - [`money`] - Integer-cent [`Money`] type (no floating point!)
//! - [`types`] - Carts, tables, orders and option signatures
//! - [`billing`] - Wallets, ledger entries, subscriptions, pricing
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation helpers

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod keys;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use smartorder_core::Money` instead of
// `use smartorder_core::money::Money`

pub use billing::{
    LedgerEntry, LedgerEntryType, Pricing, StoreSummary, Subscription, SubscriptionStatus, Wallet,
};
pub use error::ValidationError;
pub use keys::{StoreId, TableKey, TableNo};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default subscription window granted on first lazy access, in days.
pub const DEFAULT_SUBSCRIPTION_DAYS: i64 = 30;

/// Trial subscription window granted at tenant registration, in days.
pub const TRIAL_SUBSCRIPTION_DAYS: i64 = 3;

/// Subscription window purchased by one monthly renewal, in days.
pub const RENEWAL_DAYS: i64 = 30;
