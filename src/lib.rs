//! Escrow Engine Library
//! # Overview
//!
//! This library mediates custody of funds between the two counterparties of
//! a marketplace order: the payer funds the order, the payee performs the
//! work, and the platform holds the amount in escrow from acceptance until
//! the order is completed, cancelled, or arbitrated.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (OrderRecord, OrderStatus, Wallet, etc.)
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - transition validation and orchestration
//!   - [`core::ledger`] - party balances and settlement idempotency
//!   - [`core::order_store`] - per-record locked order storage
//! - [`io`] - CSV replay input and summary output
//! - [`strategy`] - sequential and concurrent replay pipelines
//! - [`presentation`] - pure status label/color derivations for UI surfaces
//!
//! # Lifecycle
//!
//! `pending -> accepted -> in_progress -> delivered -> completed ->
//! released`, with three branches: a revision request returns a delivered
//! order to `in_progress`, either party may raise a `dispute` before
//! completion, and administrators may force-cancel (refunding the payer) or
//! force-complete (paying the payee) an unsettled order. `cancelled`,
//! `refunded`, and `released` are terminal; across the whole lifecycle the
//! escrowed amount is credited to exactly one party exactly once.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod presentation;
pub mod strategy;
pub mod types;

pub use self::core::{EscrowEngine, Ledger, MovementKind, OrderStore};
pub use io::write_orders_csv;
pub use types::{
    Actor, AdminId, ConversationId, DisputeDecision, EscrowError, MessageId, OpenOrder,
    OrderEvent, OrderId, OrderRecord, OrderStatus, PartyId, Wallet,
};
