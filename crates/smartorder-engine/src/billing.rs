//! # Billing Ledger
//!
//! Wallets, subscriptions, AI usage metering and platform pricing, one
//! account per store.
//!
//! ## Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  accounts: DashMap<StoreId, Arc<Mutex<StoreAccount>>>               │
//! │                                                                     │
//! │  Every compound operation (check balance + charge + renew,          │
//! │  bump counters + charge) runs under ONE account lock, so there      │
//! │  is no window for a concurrent topup/charge between its steps.     │
//! │                                                                     │
//! │  pricing: RwLock<Pricing>  (platform-wide, read-mostly)             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Balances have no floor: charges always apply, and debt shows up as a
//! negative balance. Only `charge_store_subscription` gates on balance,
//! and it does so atomically with its renewal.

use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use smartorder_core::billing::{
    LedgerEntry, LedgerEntryType, Pricing, StoreSummary, Subscription, SubscriptionStatus, Wallet,
};
use smartorder_core::validation::{validate_amount, validate_days};
use smartorder_core::{Money, StoreId, RENEWAL_DAYS};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::EngineResult;

/// Mutable billing state of one store, guarded as a unit.
struct StoreAccount {
    balance: Money,
    /// Append-only, oldest first; reads reverse it.
    ledger: Vec<LedgerEntry>,
    subscription: Subscription,
    ai_calls: u64,
    ai_tokens: u64,
}

impl StoreAccount {
    fn new(store_id: &StoreId, subscription_days: i64) -> Self {
        StoreAccount {
            balance: Money::zero(),
            ledger: Vec::new(),
            subscription: Subscription {
                store_id: store_id.clone(),
                status: SubscriptionStatus::Active,
                expire_at: Utc::now() + Duration::days(subscription_days),
            },
            ai_calls: 0,
            ai_tokens: 0,
        }
    }

    /// Applies one signed movement: credit for positive amounts, debit
    /// for negative ones. The ledger entry carries the signed amount.
    fn apply(&mut self, store_id: &StoreId, entry_type: LedgerEntryType, reason: &str, amount: Money) {
        self.balance += amount;
        self.ledger.push(LedgerEntry {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.clone(),
            entry_type,
            reason: reason.to_string(),
            amount,
            created_at: Utc::now(),
        });
    }

    /// Pushes expiry forward from whichever is later, now or the current
    /// expiry. A lapsed subscription restarts from now instead of
    /// back-dating the new period.
    fn renew(&mut self, days: i64, now: DateTime<Utc>) {
        let base = self.subscription.expire_at.max(now);
        self.subscription.expire_at = base + Duration::days(days);
        self.subscription.status = SubscriptionStatus::Active;
    }
}

/// Billing state for all stores. Accounts are created lazily on first
/// touch with a fresh default-length subscription.
pub struct BillingLedger {
    accounts: DashMap<StoreId, Arc<Mutex<StoreAccount>>>,
    pricing: RwLock<Pricing>,
    /// Subscription length granted to a store on first touch.
    default_subscription_days: i64,
    trial_days: i64,
}

impl BillingLedger {
    pub fn new(default_subscription_days: i64, trial_days: i64) -> Self {
        BillingLedger {
            accounts: DashMap::new(),
            pricing: RwLock::new(Pricing::default()),
            default_subscription_days,
            trial_days,
        }
    }

    fn account(&self, store_id: &StoreId) -> Arc<Mutex<StoreAccount>> {
        self.accounts
            .entry(store_id.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(StoreAccount::new(
                    store_id,
                    self.default_subscription_days,
                )))
            })
            .clone()
    }

    // =========================================================================
    // Wallet
    // =========================================================================

    /// Wallet snapshot with the ledger newest-first.
    pub fn get_wallet(&self, store_id: &StoreId) -> Wallet {
        let account = self.account(store_id);
        let account = account.lock().expect("billing account mutex poisoned");
        Wallet {
            store_id: store_id.clone(),
            balance: account.balance,
            ledger: account.ledger.iter().rev().cloned().collect(),
        }
    }

    /// Credits the wallet. Amount must be strictly positive.
    pub fn topup(&self, store_id: &StoreId, amount: Money, reason: &str) -> EngineResult<Wallet> {
        validate_amount("amount", amount)?;
        let account = self.account(store_id);
        {
            let mut account = account.lock().expect("billing account mutex poisoned");
            account.apply(store_id, LedgerEntryType::Topup, reason, amount);
        }
        info!(store = %store_id, amount = %amount, "wallet topped up");
        Ok(self.get_wallet(store_id))
    }

    /// Debits the wallet. Amount must be strictly positive; the ledger
    /// entry records the negated value. The balance may go negative.
    pub fn charge(
        &self,
        store_id: &StoreId,
        amount: Money,
        entry_type: LedgerEntryType,
        reason: &str,
    ) -> EngineResult<Wallet> {
        validate_amount("amount", amount)?;
        let account = self.account(store_id);
        {
            let mut account = account.lock().expect("billing account mutex poisoned");
            account.apply(store_id, entry_type, reason, -amount);
        }
        debug!(store = %store_id, amount = %amount, ?entry_type, "wallet charged");
        Ok(self.get_wallet(store_id))
    }

    // =========================================================================
    // AI metering
    // =========================================================================

    /// Records one AI call: bumps the usage counters and debits the
    /// per-call price in a single critical section. No entry is written
    /// when the configured price is zero.
    pub fn record_ai_call(&self, store_id: &StoreId, tokens: u64) {
        let price = self.pricing.read().expect("pricing lock poisoned").ai_call_price;
        let account = self.account(store_id);
        let mut account = account.lock().expect("billing account mutex poisoned");
        account.ai_calls += 1;
        account.ai_tokens += tokens;
        if !price.is_zero() {
            account.apply(store_id, LedgerEntryType::AiCall, "AI call", -price);
        }
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Current subscription, creating the account (and its default
    /// subscription) on first touch.
    pub fn get_subscription(&self, store_id: &StoreId) -> Subscription {
        let account = self.account(store_id);
        let account = account.lock().expect("billing account mutex poisoned");
        account.subscription.clone()
    }

    /// Resets the store to a short trial subscription expiring
    /// `trial_days` from now, regardless of its previous state.
    pub fn create_trial_subscription(&self, store_id: &StoreId) -> Subscription {
        let account = self.account(store_id);
        let mut account = account.lock().expect("billing account mutex poisoned");
        account.subscription = Subscription {
            store_id: store_id.clone(),
            status: SubscriptionStatus::Active,
            expire_at: Utc::now() + Duration::days(self.trial_days),
        };
        info!(store = %store_id, days = self.trial_days, "trial subscription created");
        account.subscription.clone()
    }

    pub fn is_subscription_active(&self, store_id: &StoreId) -> bool {
        self.get_subscription(store_id).is_active_at(Utc::now())
    }

    /// Extends the subscription by `days` from max(now, current expiry)
    /// and reactivates it. No charge is taken here.
    pub fn renew_subscription(&self, store_id: &StoreId, days: i64) -> EngineResult<Subscription> {
        validate_days(days)?;
        let account = self.account(store_id);
        let mut account = account.lock().expect("billing account mutex poisoned");
        account.renew(days, Utc::now());
        info!(store = %store_id, days, expire_at = %account.subscription.expire_at, "subscription renewed");
        Ok(account.subscription.clone())
    }

    pub fn pause_subscription(&self, store_id: &StoreId) -> Subscription {
        let account = self.account(store_id);
        let mut account = account.lock().expect("billing account mutex poisoned");
        account.subscription.status = SubscriptionStatus::Paused;
        info!(store = %store_id, "subscription paused");
        account.subscription.clone()
    }

    /// Charges the monthly store fee and renews for [`RENEWAL_DAYS`] if
    /// the balance covers the fee. Check, charge and renewal happen
    /// under one account lock. Returns whether the renewal went through.
    pub fn charge_store_subscription(&self, store_id: &StoreId) -> bool {
        let fee = self.pricing.read().expect("pricing lock poisoned").store_monthly_fee;
        let account = self.account(store_id);
        let mut account = account.lock().expect("billing account mutex poisoned");
        if account.balance < fee {
            debug!(store = %store_id, balance = %account.balance, fee = %fee, "renewal skipped, insufficient balance");
            return false;
        }
        account.apply(store_id, LedgerEntryType::Subscription, "Monthly subscription", -fee);
        account.renew(RENEWAL_DAYS, Utc::now());
        info!(store = %store_id, fee = %fee, expire_at = %account.subscription.expire_at, "subscription charged and renewed");
        true
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    pub fn get_pricing(&self) -> Pricing {
        *self.pricing.read().expect("pricing lock poisoned")
    }

    /// Replaces the platform pricing record. All fields must be
    /// non-negative; in-flight operations that already read the old
    /// pricing complete under it.
    pub fn update_pricing(&self, pricing: Pricing) -> EngineResult<Pricing> {
        for (field, value) in [
            ("platformMonthlyFee", pricing.platform_monthly_fee),
            ("storeMonthlyFee", pricing.store_monthly_fee),
            ("aiCallPrice", pricing.ai_call_price),
        ] {
            if value.is_negative() {
                return Err(smartorder_core::ValidationError::InvalidAmount {
                    field,
                    reason: "must not be negative".to_string(),
                }
                .into());
            }
        }
        *self.pricing.write().expect("pricing lock poisoned") = pricing;
        info!("platform pricing updated");
        Ok(pricing)
    }

    // =========================================================================
    // Platform views
    // =========================================================================

    /// Snapshot of every known store's billing state. Each account is
    /// locked briefly in turn, so the view is per-store consistent but
    /// not a cross-store snapshot.
    pub fn list_store_summaries(&self) -> Vec<StoreSummary> {
        let mut summaries: Vec<StoreSummary> = self
            .accounts
            .iter()
            .map(|entry| {
                let account = entry.value().lock().expect("billing account mutex poisoned");
                StoreSummary {
                    store_id: entry.key().clone(),
                    balance: account.balance,
                    subscription_status: account.subscription.status,
                    subscription_expire_at: account.subscription.expire_at,
                    ai_calls: account.ai_calls,
                    ai_tokens: account.ai_tokens,
                }
            })
            .collect();
        summaries.sort_by(|a, b| a.store_id.as_str().cmp(b.store_id.as_str()));
        summaries
    }

    /// Ids of every store with an account, for the renewal sweep.
    pub(crate) fn known_stores(&self) -> Vec<StoreId> {
        self.accounts.iter().map(|entry| entry.key().clone()).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smartorder_core::{DEFAULT_SUBSCRIPTION_DAYS, TRIAL_SUBSCRIPTION_DAYS};

    fn ledger() -> BillingLedger {
        BillingLedger::new(DEFAULT_SUBSCRIPTION_DAYS, TRIAL_SUBSCRIPTION_DAYS)
    }

    fn store() -> StoreId {
        StoreId::new("s1").unwrap()
    }

    #[test]
    fn test_lazy_account_creation() {
        let billing = ledger();
        let wallet = billing.get_wallet(&store());
        assert!(wallet.balance.is_zero());
        assert!(wallet.ledger.is_empty());

        let sub = billing.get_subscription(&store());
        assert_eq!(sub.status, SubscriptionStatus::Active);
        let days = sub.days_left_at(Utc::now());
        assert!((DEFAULT_SUBSCRIPTION_DAYS - 1..=DEFAULT_SUBSCRIPTION_DAYS).contains(&days));
    }

    #[test]
    fn test_topup_and_charge_ledger() {
        let billing = ledger();
        billing
            .topup(&store(), Money::from_cents(10_000), "Manual top-up")
            .unwrap();
        let wallet = billing
            .charge(
                &store(),
                Money::from_cents(2_500),
                LedgerEntryType::Adjustment,
                "Correction",
            )
            .unwrap();

        assert_eq!(wallet.balance.cents(), 7_500);
        assert_eq!(wallet.ledger.len(), 2);
        // Newest first.
        assert_eq!(wallet.ledger[0].amount.cents(), -2_500);
        assert_eq!(wallet.ledger[1].amount.cents(), 10_000);
    }

    #[test]
    fn test_topup_rejects_non_positive() {
        let billing = ledger();
        assert!(billing.topup(&store(), Money::zero(), "nope").is_err());
        assert!(billing
            .topup(&store(), Money::from_cents(-100), "nope")
            .is_err());
    }

    #[test]
    fn test_charge_allows_negative_balance() {
        let billing = ledger();
        let wallet = billing
            .charge(
                &store(),
                Money::from_cents(500),
                LedgerEntryType::AiCall,
                "AI call",
            )
            .unwrap();
        assert_eq!(wallet.balance.cents(), -500);
    }

    #[test]
    fn test_record_ai_call_meters_and_debits() {
        let billing = ledger();
        billing.record_ai_call(&store(), 1_200);
        billing.record_ai_call(&store(), 800);

        let summaries = billing.list_store_summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].ai_calls, 2);
        assert_eq!(summaries[0].ai_tokens, 2_000);
        // Default price is 1 cent per call.
        assert_eq!(summaries[0].balance.cents(), -2);

        let wallet = billing.get_wallet(&store());
        assert!(wallet
            .ledger
            .iter()
            .all(|e| e.entry_type == LedgerEntryType::AiCall));
    }

    #[test]
    fn test_record_ai_call_free_when_price_zero() {
        let billing = ledger();
        let mut pricing = billing.get_pricing();
        pricing.ai_call_price = Money::zero();
        billing.update_pricing(pricing).unwrap();

        billing.record_ai_call(&store(), 100);
        let wallet = billing.get_wallet(&store());
        assert!(wallet.balance.is_zero());
        assert!(wallet.ledger.is_empty());
    }

    #[test]
    fn test_trial_subscription_resets_expiry() {
        let billing = ledger();
        // The default subscription is longer than the trial; the trial
        // still overwrites it.
        billing.get_subscription(&store());
        let trial = billing.create_trial_subscription(&store());
        let days = trial.days_left_at(Utc::now());
        assert!((TRIAL_SUBSCRIPTION_DAYS - 1..=TRIAL_SUBSCRIPTION_DAYS).contains(&days));
    }

    #[test]
    fn test_renew_extends_from_later_of_now_and_expiry() {
        let billing = ledger();
        let before = billing.get_subscription(&store());
        let renewed = billing.renew_subscription(&store(), 30).unwrap();
        assert_eq!(renewed.expire_at, before.expire_at + Duration::days(30));

        assert!(billing.renew_subscription(&store(), 0).is_err());
    }

    #[test]
    fn test_renew_reactivates_paused() {
        let billing = ledger();
        billing.pause_subscription(&store());
        assert!(!billing.is_subscription_active(&store()));

        let renewed = billing.renew_subscription(&store(), 7).unwrap();
        assert_eq!(renewed.status, SubscriptionStatus::Active);
        assert!(billing.is_subscription_active(&store()));
    }

    #[test]
    fn test_charge_store_subscription_gates_on_balance() {
        let billing = ledger();
        // Empty wallet: no renewal, no charge.
        assert!(!billing.charge_store_subscription(&store()));
        assert!(billing.get_wallet(&store()).balance.is_zero());

        let fee = billing.get_pricing().store_monthly_fee;
        billing.topup(&store(), fee, "Manual top-up").unwrap();
        let before = billing.get_subscription(&store());

        assert!(billing.charge_store_subscription(&store()));
        let wallet = billing.get_wallet(&store());
        assert!(wallet.balance.is_zero());
        assert_eq!(wallet.ledger[0].entry_type, LedgerEntryType::Subscription);

        let after = billing.get_subscription(&store());
        assert_eq!(after.expire_at, before.expire_at + Duration::days(RENEWAL_DAYS));
    }

    #[test]
    fn test_update_pricing_rejects_negative() {
        let billing = ledger();
        let mut pricing = billing.get_pricing();
        pricing.ai_call_price = Money::from_cents(-1);
        assert!(billing.update_pricing(pricing).is_err());
        // Old pricing still in force.
        assert_eq!(billing.get_pricing().ai_call_price.cents(), 1);
    }

    #[test]
    fn test_concurrent_ai_calls_are_atomic() {
        let billing = Arc::new(ledger());
        let s = store();
        let mut handles = Vec::new();
        for _ in 0..10 {
            let billing = Arc::clone(&billing);
            let s = s.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    billing.record_ai_call(&s, 10);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let summaries = billing.list_store_summaries();
        assert_eq!(summaries[0].ai_calls, 500);
        assert_eq!(summaries[0].ai_tokens, 5_000);
        assert_eq!(summaries[0].balance.cents(), -500);
        assert_eq!(billing.get_wallet(&s).ledger.len(), 500);
    }
}
