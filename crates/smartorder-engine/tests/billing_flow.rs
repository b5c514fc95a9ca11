//! Billing scenarios: metering under load, renewal gating, tenant
//! onboarding and the code directory.

use std::sync::Arc;

use smartorder_core::billing::{LedgerEntryType, SubscriptionStatus};
use smartorder_core::{Money, StoreId, TableKey};
use smartorder_engine::{auto_renew_subscriptions, OrderingEngine};

/// Honors `RUST_LOG` so failing scenarios can be re-run with engine
/// tracing visible. Safe to call from every test; only the first
/// registration wins.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn store(id: &str) -> StoreId {
    StoreId::new(id).unwrap()
}

#[test]
fn concurrent_metering_loses_nothing() {
    init_tracing();
    let engine = Arc::new(OrderingEngine::with_defaults());
    let s = store("store-1");
    let price = engine.billing().get_pricing().ai_call_price;

    let mut handles = Vec::new();
    for worker in 0..10 {
        let engine = Arc::clone(&engine);
        let s = s.clone();
        handles.push(std::thread::spawn(move || {
            for i in 0..5 {
                engine.billing().record_ai_call(&s, (worker * 5 + i) as u64);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let summaries = engine.billing().list_store_summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].ai_calls, 50);
    assert_eq!(summaries[0].ai_tokens, (0..50).sum::<u64>());
    assert_eq!(summaries[0].balance, -(price * 50));

    let wallet = engine.billing().get_wallet(&s);
    assert_eq!(wallet.ledger.len(), 50);
    assert!(wallet
        .ledger
        .iter()
        .all(|e| e.entry_type == LedgerEntryType::AiCall && e.amount == -price));
}

#[test]
fn onboarding_trial_then_funded_renewal() {
    init_tracing();
    let engine = OrderingEngine::with_defaults();
    let s = store("store-1");

    let trial = engine.billing().create_trial_subscription(&s);
    assert_eq!(trial.status, SubscriptionStatus::Active);
    assert!(engine.billing().is_subscription_active(&s));

    // Trial expires within the 7-day window but the wallet is empty:
    // the sweep leaves it for the next round.
    assert_eq!(auto_renew_subscriptions(engine.billing(), 7), 0);

    let fee = engine.billing().get_pricing().store_monthly_fee;
    engine.billing().topup(&s, fee, "Bank transfer").unwrap();
    assert_eq!(auto_renew_subscriptions(engine.billing(), 7), 1);

    let renewed = engine.billing().get_subscription(&s);
    assert!(renewed.days_left_at(chrono::Utc::now()) > 30);
    assert!(engine.billing().get_wallet(&s).balance.is_zero());
}

#[test]
fn paused_store_keeps_its_money() {
    init_tracing();
    let engine = OrderingEngine::with_defaults();
    let s = store("store-1");

    let fee = engine.billing().get_pricing().store_monthly_fee;
    engine.billing().topup(&s, fee, "Bank transfer").unwrap();
    engine.billing().create_trial_subscription(&s);
    engine.billing().pause_subscription(&s);

    assert_eq!(auto_renew_subscriptions(engine.billing(), 7), 0);
    assert_eq!(engine.billing().get_wallet(&s).balance, fee);
    assert!(!engine.billing().is_subscription_active(&s));
}

#[test]
fn wallet_survives_debt_and_recovers() {
    init_tracing();
    let engine = OrderingEngine::with_defaults();
    let s = store("store-1");

    engine
        .billing()
        .charge(&s, Money::from_cents(5_000), LedgerEntryType::Adjustment, "Chargeback")
        .unwrap();
    assert_eq!(engine.billing().get_wallet(&s).balance.cents(), -5_000);

    engine
        .billing()
        .topup(&s, Money::from_cents(8_000), "Bank transfer")
        .unwrap();
    let wallet = engine.billing().get_wallet(&s);
    assert_eq!(wallet.balance.cents(), 3_000);
    // Newest-first ordering.
    assert_eq!(wallet.ledger[0].amount.cents(), 8_000);
    assert_eq!(wallet.ledger[1].amount.cents(), -5_000);
}

#[test]
fn code_binding_steals_from_previous_owner() {
    init_tracing();
    let engine = OrderingEngine::with_defaults();
    let a1 = TableKey::parse("store-1", "A1").unwrap();
    let b2 = TableKey::parse("store-1", "B2").unwrap();

    engine.table_codes().bind(&a1, "QR-001");
    engine.table_codes().bind(&b2, "QR-001");

    // Exactly one owner at any time, both directions consistent.
    let owner = engine.table_codes().get_by_code("QR-001").unwrap();
    assert_eq!(owner.table_no.as_str(), "B2");
    assert!(engine.table_codes().get_by_table(&a1).is_none());

    // Rebinding the owner to a new code frees the old one.
    engine.table_codes().bind(&b2, "QR-002");
    assert!(engine.table_codes().get_by_code("QR-001").is_none());
    assert_eq!(
        engine.table_codes().get_by_table(&b2).unwrap().code,
        "QR-002"
    );
}
