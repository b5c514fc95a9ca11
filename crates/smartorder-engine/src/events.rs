//! # Change Notification
//!
//! Outbound fire-and-forget events emitted after state-changing operations.
//!
//! ## Delivery Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Engine mutation ──► ChangeNotifier::notify(event)                  │
//! │                              │                                      │
//! │                              ▼                                      │
//! │  External notifier (WebSocket hub, message bus, ...)                │
//! │                                                                     │
//! │  Delivery failures are the notifier's concern. The engine never     │
//! │  retries and never fails an operation because of notification.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events are emitted after the state change is committed and after the
//! relevant lock is released, so a slow notifier cannot extend a critical
//! section.

use serde::Serialize;
use serde_json::Value;
use smartorder_core::{Order, StoreId, TableCart, TableInfo};
use tracing::debug;

// =============================================================================
// Events
// =============================================================================

/// A named change event with its payload.
///
/// `MenuUpdated` is part of the event vocabulary for completeness; menu
/// state itself lives outside this engine, so only callers that own menu
/// state emit it.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChangeEvent {
    CartUpdated(TableCart),
    OrderCreated(Order),
    OrderUpdated(Order),
    TableUpdated(TableInfo),
    MenuUpdated { store_id: StoreId },
}

impl ChangeEvent {
    /// Wire name of the event, as subscribers see it.
    pub fn event_type(&self) -> &'static str {
        match self {
            ChangeEvent::CartUpdated(_) => "CART_UPDATED",
            ChangeEvent::OrderCreated(_) => "ORDER_CREATED",
            ChangeEvent::OrderUpdated(_) => "ORDER_UPDATED",
            ChangeEvent::TableUpdated(_) => "TABLE_UPDATED",
            ChangeEvent::MenuUpdated { .. } => "MENU_UPDATED",
        }
    }

    /// JSON payload for the notifier. Serialization of domain types is
    /// infallible in practice; a failure degrades to a null payload
    /// rather than failing the operation that emitted the event.
    pub fn payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Notifier Trait
// =============================================================================

/// Outbound notification seam.
///
/// Implementations must be cheap or hand off internally (channel, spawn):
/// `notify` is called synchronously from request paths.
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, event: ChangeEvent);
}

/// Discards all events. Default for embedders that have no subscribers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify(&self, _event: ChangeEvent) {}
}

/// Logs every event through `tracing`. Useful in development and as a
/// reference implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

impl ChangeNotifier for LoggingNotifier {
    fn notify(&self, event: ChangeEvent) {
        debug!(event = event.event_type(), payload = %event.payload(), "change event");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use smartorder_core::TableKey;

    #[test]
    fn test_event_type_names() {
        let key = TableKey::parse("s1", "t1").unwrap();
        let cart = TableCart::new(&key);
        assert_eq!(
            ChangeEvent::CartUpdated(cart).event_type(),
            "CART_UPDATED"
        );
        let table = TableInfo::new(&key);
        assert_eq!(
            ChangeEvent::TableUpdated(table).event_type(),
            "TABLE_UPDATED"
        );
        assert_eq!(
            ChangeEvent::MenuUpdated {
                store_id: key.store_id
            }
            .event_type(),
            "MENU_UPDATED"
        );
    }

    #[test]
    fn test_payload_is_json() {
        let key = TableKey::parse("s1", "t1").unwrap();
        let payload = ChangeEvent::TableUpdated(TableInfo::new(&key)).payload();
        assert_eq!(payload["storeId"], "s1");
        assert_eq!(payload["status"], "IDLE");
    }
}
