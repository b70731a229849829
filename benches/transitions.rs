//! Benchmark suite for escrow transitions
//!
//! Measures the cost of driving an order through its lifecycle, using the
//! divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use escrow_engine::{DisputeDecision, EscrowEngine, OpenOrder, OrderEvent};
use escrow_engine::{Actor, OrderId};
use rust_decimal::Decimal;

fn main() {
    divan::main();
}

const PAYER: u64 = 10;
const PAYEE: u64 = 20;
const ADMIN: u64 = 99;

fn open(engine: &EscrowEngine, id: OrderId, amount: Decimal) {
    engine.fund(PAYER, amount).unwrap();
    engine
        .open(OpenOrder {
            id,
            conversation: id,
            message: None,
            title: String::new(),
            description: String::new(),
            amount,
            deadline: None,
            payer: PAYER,
            payee: PAYEE,
        })
        .unwrap();
}

/// Full happy path: open, accept, start, deliver, confirm
#[divan::bench]
fn confirmation_lifecycle() {
    let engine = EscrowEngine::new();
    let amount = Decimal::new(1000000, 4);

    open(&engine, 1, amount);
    engine.accept(1, PAYEE).unwrap();
    engine
        .apply(1, Actor::Party(PAYEE), OrderEvent::StartWork)
        .unwrap();
    engine
        .apply(1, Actor::Party(PAYEE), OrderEvent::Deliver)
        .unwrap();
    engine
        .apply(1, Actor::Party(PAYER), OrderEvent::ConfirmCompletion)
        .unwrap();
}

/// Dispute path: open, accept, dispute, release
#[divan::bench]
fn dispute_resolution_lifecycle() {
    let engine = EscrowEngine::new();
    let amount = Decimal::new(1000000, 4);

    open(&engine, 1, amount);
    engine.accept(1, PAYEE).unwrap();
    engine
        .apply(
            1,
            Actor::Party(PAYER),
            OrderEvent::RaiseDispute {
                reason: "benchmark dispute".to_string(),
            },
        )
        .unwrap();
    engine
        .resolve_dispute(1, ADMIN, DisputeDecision::Release, None)
        .unwrap();
}

/// Many independent orders on one engine
#[divan::bench]
fn hundred_independent_orders() {
    let engine = EscrowEngine::new();
    let amount = Decimal::new(10000, 4);

    for id in 1..=100u64 {
        open(&engine, id, amount);
        engine.accept(id, PAYEE).unwrap();
        engine
            .apply(id, Actor::Party(PAYEE), OrderEvent::StartWork)
            .unwrap();
        engine
            .apply(id, Actor::Party(PAYEE), OrderEvent::Deliver)
            .unwrap();
        engine
            .apply(id, Actor::Party(PAYER), OrderEvent::ConfirmCompletion)
            .unwrap();
    }
}
