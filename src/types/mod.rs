//! Types module
//!
//! Contains core data structures used throughout the engine.
//! This module organizes types into logical submodules:
//! - `order`: the escrowed order record, statuses, events, and actors
//! - `wallet`: party balance types
//! - `error`: error types for the escrow engine

pub mod error;
pub mod order;
pub mod wallet;

pub use error::EscrowError;
pub use order::{
    Actor, AdminId, ConversationId, DisputeDecision, MessageId, OpenOrder, OrderEvent, OrderId,
    OrderRecord, OrderStatus, PartyId,
};
pub use wallet::Wallet;
