//! # Table Code Directory
//!
//! Bijective binding between scannable codes and tables.
//!
//! ## Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  by_code:  code ──► TableKey      by_table:  TableKey ──► code      │
//! │                                                                     │
//! │  bind(table, code) evicts any binding sharing EITHER side before    │
//! │  inserting, so a code always points at exactly one table and a      │
//! │  table carries at most one active code.                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Codes are globally unique across stores (a diner scans a bare code
//! with no tenant context), so both indexes live behind one mutex: the
//! double-sided eviction in `bind` must be atomic. The critical section
//! is two map ops; directory traffic is administrative and rare.

use std::collections::HashMap;
use std::sync::Mutex;

use smartorder_core::types::TableCode;
use smartorder_core::TableKey;
use tracing::debug;

#[derive(Default)]
struct DirectoryInner {
    by_code: HashMap<String, TableKey>,
    by_table: HashMap<TableKey, String>,
}

/// Code ↔ table directory.
pub struct TableCodeDirectory {
    inner: Mutex<DirectoryInner>,
}

impl TableCodeDirectory {
    pub fn new() -> Self {
        TableCodeDirectory {
            inner: Mutex::new(DirectoryInner::default()),
        }
    }

    /// Binds `code` to `key`, evicting any previous owner of either side.
    pub fn bind(&self, key: &TableKey, code: &str) -> TableCode {
        debug!(table = %key, code, "bind table code");
        let mut inner = self.inner.lock().expect("directory mutex poisoned");

        // Evict the table's previous code and the code's previous table.
        if let Some(old_code) = inner.by_table.remove(key) {
            inner.by_code.remove(&old_code);
        }
        if let Some(old_key) = inner.by_code.remove(code) {
            inner.by_table.remove(&old_key);
        }

        inner.by_code.insert(code.to_string(), key.clone());
        inner.by_table.insert(key.clone(), code.to_string());

        TableCode {
            store_id: key.store_id.clone(),
            table_no: key.table_no.clone(),
            code: code.to_string(),
        }
    }

    /// Resolves a scanned code to its table, if bound.
    pub fn get_by_code(&self, code: &str) -> Option<TableCode> {
        let inner = self.inner.lock().expect("directory mutex poisoned");
        inner.by_code.get(code).map(|key| TableCode {
            store_id: key.store_id.clone(),
            table_no: key.table_no.clone(),
            code: code.to_string(),
        })
    }

    /// Returns the active code of a table, if any.
    pub fn get_by_table(&self, key: &TableKey) -> Option<TableCode> {
        let inner = self.inner.lock().expect("directory mutex poisoned");
        inner.by_table.get(key).map(|code| TableCode {
            store_id: key.store_id.clone(),
            table_no: key.table_no.clone(),
            code: code.clone(),
        })
    }

    /// Removes the table's binding, if any.
    pub fn unbind(&self, key: &TableKey) {
        debug!(table = %key, "unbind table code");
        let mut inner = self.inner.lock().expect("directory mutex poisoned");
        if let Some(code) = inner.by_table.remove(key) {
            inner.by_code.remove(&code);
        }
    }
}

impl Default for TableCodeDirectory {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
