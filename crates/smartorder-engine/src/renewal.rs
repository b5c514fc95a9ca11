//! # Renewal Scheduler
//!
//! Periodic sweep that auto-renews subscriptions approaching expiry by
//! charging the monthly store fee.
//!
//! The sweep itself is a free function so tests can drive it directly
//! without a runtime; [`RenewalScheduler`] is the tokio wrapper that
//! runs it on an interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::billing::BillingLedger;

/// Runs one renewal sweep and returns the number of successful renewals.
///
/// A store is eligible when its subscription is ACTIVE and expires
/// within `lookahead_days` from now (0 ≤ days left ≤ lookahead). Paused
/// and already-lapsed subscriptions are skipped. For each eligible store
/// the monthly fee is charged and the subscription renewed atomically;
/// stores whose balance cannot cover the fee are left untouched and
/// retried on the next sweep.
pub fn auto_renew_subscriptions(billing: &BillingLedger, lookahead_days: i64) -> usize {
    let now = Utc::now();
    let mut renewed = 0usize;
    for store_id in billing.known_stores() {
        let sub = billing.get_subscription(&store_id);
        if !sub.is_active_at(now) {
            continue;
        }
        let days_left = sub.days_left_at(now);
        if days_left < 0 || days_left > lookahead_days {
            continue;
        }
        // The balance check re-runs inside charge_store_subscription
        // under the account lock; this sweep never holds two locks.
        if billing.charge_store_subscription(&store_id) {
            renewed += 1;
        } else {
            debug!(store = %store_id, days_left, "auto-renewal deferred");
        }
    }
    if renewed > 0 {
        info!(renewed, "auto-renewal sweep finished");
    }
    renewed
}

/// Background task driving [`auto_renew_subscriptions`] on a fixed
/// interval. Aborted on shutdown; a sweep in flight is cancelled at the
/// next await point, which is safe because each renewal is atomic.
pub struct RenewalScheduler {
    handle: JoinHandle<()>,
}

impl RenewalScheduler {
    /// Spawns the sweep loop on the current tokio runtime. The first
    /// sweep runs one full `interval` after spawn.
    pub fn spawn(billing: Arc<BillingLedger>, interval: Duration, lookahead_days: i64) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Skip the immediate first tick.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                auto_renew_subscriptions(&billing, lookahead_days);
            }
        });
        RenewalScheduler { handle }
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for RenewalScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smartorder_core::{StoreId, DEFAULT_SUBSCRIPTION_DAYS, TRIAL_SUBSCRIPTION_DAYS};

    fn billing() -> BillingLedger {
        BillingLedger::new(DEFAULT_SUBSCRIPTION_DAYS, TRIAL_SUBSCRIPTION_DAYS)
    }

    fn funded_store(billing: &BillingLedger, id: &str) -> StoreId {
        let store = StoreId::new(id).unwrap();
        let fee = billing.get_pricing().store_monthly_fee;
        billing.topup(&store, fee, "Manual top-up").unwrap();
        store
    }

    #[test]
    fn test_sweep_renews_only_expiring_stores() {
        let billing = billing();

        // Expires in 3 days (trial): inside the 7-day window.
        let near = funded_store(&billing, "near");
        billing.create_trial_subscription(&near);
        let near_before = billing.get_subscription(&near);

        // Expires in 30 days: outside the window.
        let far = funded_store(&billing, "far");
        let far_before = billing.get_subscription(&far);

        assert_eq!(auto_renew_subscriptions(&billing, 7), 1);
        assert!(billing.get_subscription(&near).expire_at > near_before.expire_at);
        assert_eq!(billing.get_subscription(&far).expire_at, far_before.expire_at);
    }

    #[test]
    fn test_sweep_skips_paused_and_broke_stores() {
        let billing = billing();

        let paused = funded_store(&billing, "paused");
        billing.create_trial_subscription(&paused);
        billing.pause_subscription(&paused);

        let broke = StoreId::new("broke").unwrap();
        billing.create_trial_subscription(&broke);

        assert_eq!(auto_renew_subscriptions(&billing, 7), 0);
        // The broke store keeps its wallet untouched for the retry.
        assert!(billing.get_wallet(&broke).balance.is_zero());
    }

    #[test]
    fn test_renewed_store_drops_out_of_next_sweep() {
        let billing = billing();
        let store = funded_store(&billing, "s1");
        billing.create_trial_subscription(&store);

        assert_eq!(auto_renew_subscriptions(&billing, 7), 1);
        // Now ~33 days out, beyond the lookahead.
        assert_eq!(auto_renew_subscriptions(&billing, 7), 0);
    }

    #[tokio::test]
    async fn test_scheduler_runs_sweeps() {
        let billing = Arc::new(self::billing());
        let store = funded_store(&billing, "s1");
        billing.create_trial_subscription(&store);
        let before = billing.get_subscription(&store);

        let scheduler =
            RenewalScheduler::spawn(Arc::clone(&billing), Duration::from_millis(20), 7);
        tokio::time::sleep(Duration::from_millis(120)).await;
        scheduler.shutdown();

        assert!(billing.get_subscription(&store).expire_at > before.expire_at);
    }
}
