//! Wallet types for the escrow engine
//!
//! A wallet holds one party's spendable balance. Escrowed funds are not a
//! wallet balance: from acceptance until a terminal status they exist only
//! as the committed `amount` on the order record, and re-enter a wallet
//! through exactly one settlement.

use super::order::PartyId;
use rust_decimal::Decimal;

/// A party's spendable balance
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    /// The owning party
    pub party: PartyId,

    /// Funds available for new orders
    pub available: Decimal,
}

impl Wallet {
    /// Create a new empty wallet for a party
    pub fn new(party: PartyId) -> Self {
        Wallet {
            party,
            available: Decimal::ZERO,
        }
    }
}
