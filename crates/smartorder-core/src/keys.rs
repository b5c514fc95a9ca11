//! # Tenant and Table Keys
//!
//! Explicit key types for addressing per-tenant and per-table state.
//!
//! ## Why Not Strings?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Composite string keys ("storeId:tableNo") collide the moment a     │
//! │  store id contains the delimiter. Every map in the engine is keyed  │
//! │  by TableKey or StoreId instead, so the compiler tells callers      │
//! │  which scope an operation addresses.                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are validated at construction: a blank `storeId` or
//! `tableNo` is rejected before any component is touched.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

// =============================================================================
// StoreId
// =============================================================================

/// Identifier of one tenant ("store").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(String);

impl StoreId {
    /// Creates a store id, rejecting blank input.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::Required { field: "storeId" });
        }
        Ok(StoreId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TableNo
// =============================================================================

/// Table number within one store. Kept as a string: the original system
/// accepts values like "A12" and orders them lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableNo(String);

impl TableNo {
    /// Creates a table number, rejecting blank input.
    pub fn new(no: impl Into<String>) -> Result<Self, ValidationError> {
        let no = no.into();
        if no.trim().is_empty() {
            return Err(ValidationError::Required { field: "tableNo" });
        }
        Ok(TableNo(no))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TableKey
// =============================================================================

/// Composite key addressing one table of one store.
///
/// This is the serialization point for every per-table guarantee in the
/// engine: cart mutations, table status writes and order sweeps for the
/// same `TableKey` are strictly ordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableKey {
    pub store_id: StoreId,
    pub table_no: TableNo,
}

impl TableKey {
    pub fn new(store_id: StoreId, table_no: TableNo) -> Self {
        TableKey { store_id, table_no }
    }

    /// Validating constructor for raw caller-supplied identifiers.
    pub fn parse(
        store_id: impl Into<String>,
        table_no: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(TableKey {
            store_id: StoreId::new(store_id)?,
            table_no: TableNo::new(table_no)?,
        })
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.store_id, self.table_no)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_identifiers_rejected() {
        assert!(StoreId::new("").is_err());
        assert!(StoreId::new("   ").is_err());
        assert!(TableNo::new("").is_err());
        assert!(TableKey::parse("s1", " ").is_err());
    }

    #[test]
    fn test_parse_roundtrip() {
        let key = TableKey::parse("s1", "t1").unwrap();
        assert_eq!(key.store_id.as_str(), "s1");
        assert_eq!(key.table_no.as_str(), "t1");
        assert_eq!(key.to_string(), "s1/t1");
    }

    #[test]
    fn test_keys_with_delimiter_chars_do_not_collide() {
        // "a:b" + "c" and "a" + "b:c" used to collide as "a:b:c"
        let k1 = TableKey::parse("a:b", "c").unwrap();
        let k2 = TableKey::parse("a", "b:c").unwrap();
        assert_ne!(k1, k2);
    }
}
