//! # Billing Types
//!
//! Wallets, ledger entries, subscriptions and platform pricing.
//!
//! ## Financial Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Wallet.balance == running sum of the store's LedgerEntry amounts   │
//! │                                                                     │
//! │  topup   ──► +amount  (TOPUP entry)                                 │
//! │  charge  ──► -amount  (AI_CALL / SUBSCRIPTION / ... entry)          │
//! │                                                                     │
//! │  The ledger is append-only and displayed newest-first.              │
//! │  There is NO non-negative floor: a balance may go into debt.        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::StoreId;
use crate::money::Money;

// =============================================================================
// Ledger
// =============================================================================

/// Category of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    Topup,
    AiCall,
    Subscription,
    /// Manual platform-admin correction.
    Adjustment,
}

/// One signed, append-only financial movement against a store's wallet.
/// Credits are positive, debits negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub store_id: StoreId,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    pub reason: String,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

/// A store's wallet: balance plus its full ledger, newest entries first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub store_id: StoreId,
    pub balance: Money,
    pub ledger: Vec<LedgerEntry>,
}

// =============================================================================
// Subscription
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Paused,
}

/// A store's platform subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub store_id: StoreId,
    pub status: SubscriptionStatus,
    pub expire_at: DateTime<Utc>,
}

impl Subscription {
    /// Active and not yet expired at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.expire_at > now
    }

    /// Whole days between `now` and expiry, negative once lapsed.
    pub fn days_left_at(&self, now: DateTime<Utc>) -> i64 {
        (self.expire_at - now).num_days()
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Platform-wide pricing. A single record shared by all tenants, mutable
/// only by platform admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub platform_monthly_fee: Money,
    pub store_monthly_fee: Money,
    pub ai_call_price: Money,
}

impl Default for Pricing {
    fn default() -> Self {
        Pricing {
            platform_monthly_fee: Money::from_major_minor(199, 0),
            store_monthly_fee: Money::from_major_minor(99, 0),
            ai_call_price: Money::from_cents(1),
        }
    }
}

// =============================================================================
// Per-store summary
// =============================================================================

/// Read-only join of a store's billing state for platform-admin screens.
/// Eventually consistent with respect to concurrent mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub store_id: StoreId,
    pub balance: Money,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expire_at: DateTime<Utc>,
    pub ai_calls: u64,
    pub ai_tokens: u64,
}

// =============================================================================
// Unit Tests
// =============================================================================
