//! # Ordering Engine
//!
//! Top-level facade wiring every component together from one config and
//! one change notifier. Applications hold a single [`OrderingEngine`]
//! and reach the components through its accessors.

use std::sync::Arc;

use tracing::info;

use crate::billing::BillingLedger;
use crate::cart::CartStore;
use crate::config::EngineConfig;
use crate::events::{ChangeNotifier, NoopNotifier};
use crate::orders::OrderLedger;
use crate::renewal::RenewalScheduler;
use crate::session::TableSessionLock;
use crate::table_codes::TableCodeDirectory;
use crate::tables::TableRegistry;

/// All engine components behind one handle. Cheap to share via the
/// inner `Arc`s; construct once per process.
pub struct OrderingEngine {
    carts: CartStore,
    tables: Arc<TableRegistry>,
    table_codes: TableCodeDirectory,
    sessions: TableSessionLock,
    orders: OrderLedger,
    billing: Arc<BillingLedger>,
    scheduler: Option<RenewalScheduler>,
}

impl OrderingEngine {
    /// Builds the engine without a background scheduler. Usable outside
    /// a tokio runtime; call [`OrderingEngine::start_renewal_scheduler`]
    /// once a runtime is available.
    pub fn new(config: &EngineConfig, notifier: Arc<dyn ChangeNotifier>) -> Self {
        let tables = Arc::new(TableRegistry::new(Arc::clone(&notifier)));
        let billing = Arc::new(BillingLedger::new(
            config.default_subscription_days,
            config.trial_days,
        ));
        OrderingEngine {
            carts: CartStore::new(Arc::clone(&notifier)),
            orders: OrderLedger::new(Arc::clone(&tables), Arc::clone(&notifier)),
            tables,
            table_codes: TableCodeDirectory::new(),
            sessions: TableSessionLock::new(config.session_lock_ttl),
            billing,
            scheduler: None,
        }
    }

    /// Engine with default config and no notifier, for tests and tools.
    pub fn with_defaults() -> Self {
        OrderingEngine::new(&EngineConfig::default(), Arc::new(NoopNotifier))
    }

    /// Spawns the subscription auto-renewal loop on the current tokio
    /// runtime. Replaces a previously started scheduler.
    pub fn start_renewal_scheduler(&mut self, config: &EngineConfig) {
        self.scheduler = Some(RenewalScheduler::spawn(
            Arc::clone(&self.billing),
            config.renewal_interval,
            config.renewal_lookahead_days,
        ));
        info!(
            interval_secs = config.renewal_interval.as_secs(),
            lookahead_days = config.renewal_lookahead_days,
            "renewal scheduler started"
        );
    }

    /// Aborts the renewal scheduler if one is running. In-flight
    /// renewals are atomic per store, so aborting mid-sweep never leaves
    /// a charge without its renewal.
    pub fn shutdown(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.shutdown();
            info!("renewal scheduler stopped");
        }
    }

    pub fn carts(&self) -> &CartStore {
        &self.carts
    }

    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    pub fn table_codes(&self) -> &TableCodeDirectory {
        &self.table_codes
    }

    pub fn sessions(&self) -> &TableSessionLock {
        &self.sessions
    }

    pub fn orders(&self) -> &OrderLedger {
        &self.orders
    }

    pub fn billing(&self) -> &BillingLedger {
        &self.billing
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
