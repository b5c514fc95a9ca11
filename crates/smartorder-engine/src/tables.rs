//! # Table Registry
//!
//! Per-(store, table) occupancy status.
//!
//! ## Who Writes Here
//! Status writes come exclusively from OrderLedger call sites (order
//! creation, payment, settlement, clearing). The registry itself never
//! validates a transition: `set_status` is an unconditional overwrite,
//! and the occupancy state machine's correctness lives entirely in the
//! callers.

use std::sync::Arc;

use dashmap::DashMap;
use smartorder_core::types::{TableInfo, TableStatus};
use smartorder_core::{StoreId, TableKey};
use tracing::debug;

use crate::events::{ChangeEvent, ChangeNotifier};

/// Registry of table occupancy records.
pub struct TableRegistry {
    tables: DashMap<TableKey, TableInfo>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl TableRegistry {
    pub fn new(notifier: Arc<dyn ChangeNotifier>) -> Self {
        TableRegistry {
            tables: DashMap::new(),
            notifier,
        }
    }

    /// Gets the table record, creating it as `IDLE` on first touch.
    pub fn get_or_create(&self, key: &TableKey) -> TableInfo {
        self.tables
            .entry(key.clone())
            .or_insert_with(|| TableInfo::new(key))
            .clone()
    }

    /// Unconditionally overwrites the table status. No transition guard.
    pub fn set_status(&self, key: &TableKey, status: TableStatus) -> TableInfo {
        let snapshot = self.write_status(key, status);
        self.notifier
            .notify(ChangeEvent::TableUpdated(snapshot.clone()));
        snapshot
    }

    /// Status write without the notification. For callers that hold a
    /// lock of their own and must defer the `TABLE_UPDATED` event until
    /// after it is released; the returned snapshot is what they emit.
    pub(crate) fn write_status(&self, key: &TableKey, status: TableStatus) -> TableInfo {
        debug!(table = %key, ?status, "table set_status");
        let mut entry = self
            .tables
            .entry(key.clone())
            .or_insert_with(|| TableInfo::new(key));
        entry.status = status;
        entry.clone()
    }

    /// All tables of one store, ordered by table number.
    pub fn list_by_store(&self, store_id: &StoreId) -> Vec<TableInfo> {
        let mut tables: Vec<TableInfo> = self
            .tables
            .iter()
            .filter(|entry| &entry.key().store_id == store_id)
            .map(|entry| entry.value().clone())
            .collect();
        tables.sort_by(|a, b| a.table_no.cmp(&b.table_no));
        tables
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoopNotifier;

    fn registry() -> TableRegistry {
        TableRegistry::new(Arc::new(NoopNotifier))
    }

    #[test]
    fn test_defaults_to_idle() {
        let registry = registry();
        let key = TableKey::parse("s1", "t1").unwrap();
        assert_eq!(registry.get_or_create(&key).status, TableStatus::Idle);
    }

    #[test]
    fn test_set_status_overwrites_unconditionally() {
        let registry = registry();
        let key = TableKey::parse("s1", "t1").unwrap();

        // TO_PAY -> DINING would be invalid in a guarded state machine;
        // the registry accepts it, the guard lives in OrderLedger.
        registry.set_status(&key, TableStatus::ToPay);
        let info = registry.set_status(&key, TableStatus::Dining);
        assert_eq!(info.status, TableStatus::Dining);
    }

    #[test]
    fn test_list_by_store_is_ordered_and_scoped() {
        let registry = registry();
        for no in ["t3", "t1", "t2"] {
            registry.get_or_create(&TableKey::parse("s1", no).unwrap());
        }
        registry.get_or_create(&TableKey::parse("s2", "t9").unwrap());

        let tables = registry.list_by_store(&StoreId::new("s1").unwrap());
        let nos: Vec<&str> = tables.iter().map(|t| t.table_no.as_str()).collect();
        assert_eq!(nos, vec!["t1", "t2", "t3"]);
    }
}
