//! Ledger access for party balances
//!
//! The `Ledger` maintains every party's spendable balance and records the
//! settlements made against escrowed orders. All balance arithmetic is
//! checked; a failed movement leaves the wallet untouched.
//!
//! # Thread Safety
//!
//! Wallets live in a `DashMap`, so movements against different parties
//! proceed in parallel while movements against the same wallet are
//! serialized by the entry lock.
//!
//! # Settlement idempotency
//!
//! `settle` is the credit path used when an escrowed amount leaves a record
//! (payout to the payee or refund to the payer). It is keyed by
//! `(order, movement kind)`: the first call for a key credits the wallet and
//! records the key, any repeat is a logged no-op. A caller that retries a
//! settlement after a crash therefore converges on exactly one credit.

use crate::types::{EscrowError, OrderId, PartyId, Wallet};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Kind of settlement leaving an escrowed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementKind {
    /// Escrowed amount paid out to the payee
    Payout,

    /// Escrowed amount returned to the payer
    Refund,
}

impl MovementKind {
    /// Stable name for logs
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::Payout => "payout",
            MovementKind::Refund => "refund",
        }
    }
}

/// Concurrent ledger of party wallets and order settlements
#[derive(Debug, Default)]
pub struct Ledger {
    /// Wallets by party id
    wallets: DashMap<PartyId, Wallet>,

    /// Settlements already credited, by `(order, kind)`
    settlements: DashMap<(OrderId, MovementKind), PartyId>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Ledger {
            wallets: DashMap::new(),
            settlements: DashMap::new(),
        }
    }

    /// Credit funds to a party's wallet
    ///
    /// Creates the wallet on first use. Uses checked arithmetic so an
    /// overflowing credit is rejected without mutating the wallet.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the addition would overflow.
    pub fn credit(&self, party: PartyId, amount: Decimal) -> Result<(), EscrowError> {
        let mut wallet = self
            .wallets
            .entry(party)
            .or_insert_with(|| Wallet::new(party));

        let new_available = wallet
            .available
            .checked_add(amount)
            .ok_or_else(|| EscrowError::arithmetic_overflow("credit", party))?;

        wallet.available = new_available;
        Ok(())
    }

    /// Debit funds from a party's wallet
    ///
    /// Validates that sufficient spendable funds exist before mutating.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` if the debit exceeds the balance, or
    /// `ArithmeticOverflow` if the subtraction would underflow.
    pub fn debit(&self, party: PartyId, amount: Decimal) -> Result<(), EscrowError> {
        let mut wallet = self
            .wallets
            .entry(party)
            .or_insert_with(|| Wallet::new(party));

        if wallet.available < amount {
            return Err(EscrowError::insufficient_funds(
                party,
                wallet.available,
                amount,
            ));
        }

        let new_available = wallet
            .available
            .checked_sub(amount)
            .ok_or_else(|| EscrowError::arithmetic_overflow("debit", party))?;

        wallet.available = new_available;
        Ok(())
    }

    /// Credit an escrowed amount to a party, at most once per `(order, kind)`
    ///
    /// The settlement registry entry is reserved before the credit runs, so
    /// two racing calls for the same key cannot both credit. A repeat call
    /// is a warn-logged no-op returning `Ok(false)`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if the wallet was credited
    /// * `Ok(false)` if this settlement had already been recorded
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the credit would overflow; the
    /// settlement is not recorded in that case.
    pub fn settle(
        &self,
        order: OrderId,
        kind: MovementKind,
        party: PartyId,
        amount: Decimal,
    ) -> Result<bool, EscrowError> {
        match self.settlements.entry((order, kind)) {
            Entry::Occupied(_) => {
                tracing::warn!(
                    order,
                    kind = kind.as_str(),
                    "settlement already recorded, skipping credit"
                );
                Ok(false)
            }
            Entry::Vacant(slot) => {
                self.credit(party, amount)?;
                slot.insert(party);
                tracing::info!(
                    order,
                    kind = kind.as_str(),
                    party,
                    %amount,
                    "settlement credited"
                );
                Ok(true)
            }
        }
    }

    /// Whether a settlement has been recorded for `(order, kind)`
    pub fn is_settled(&self, order: OrderId, kind: MovementKind) -> bool {
        self.settlements.contains_key(&(order, kind))
    }

    /// A party's spendable balance, zero if no wallet exists
    pub fn balance(&self, party: PartyId) -> Decimal {
        self.wallets
            .get(&party)
            .map(|wallet| wallet.available)
            .unwrap_or(Decimal::ZERO)
    }

    /// Snapshot of all wallets
    pub fn wallets(&self) -> Vec<Wallet> {
        self.wallets
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_credit_creates_wallet() {
        let ledger = Ledger::new();

        ledger.credit(1, Decimal::new(1000000, 4)).unwrap();

        assert_eq!(ledger.balance(1), Decimal::new(1000000, 4));
    }

    #[test]
    fn test_credit_accumulates() {
        let ledger = Ledger::new();

        ledger.credit(1, Decimal::new(10000, 4)).unwrap();
        ledger.credit(1, Decimal::new(25000, 4)).unwrap();
        ledger.credit(1, Decimal::new(5000, 4)).unwrap();

        assert_eq!(ledger.balance(1), Decimal::new(40000, 4));
    }

    #[test]
    fn test_debit_decreases_balance() {
        let ledger = Ledger::new();

        ledger.credit(1, Decimal::new(100000, 4)).unwrap();
        ledger.debit(1, Decimal::new(30000, 4)).unwrap();

        assert_eq!(ledger.balance(1), Decimal::new(70000, 4));
    }

    #[test]
    fn test_debit_with_insufficient_funds() {
        let ledger = Ledger::new();

        ledger.credit(1, Decimal::new(50000, 4)).unwrap();
        let result = ledger.debit(1, Decimal::new(100000, 4));

        assert!(matches!(
            result.unwrap_err(),
            EscrowError::InsufficientFunds { .. }
        ));

        // Balance unchanged by the rejected debit
        assert_eq!(ledger.balance(1), Decimal::new(50000, 4));
    }

    #[test]
    fn test_debit_from_nonexistent_wallet() {
        let ledger = Ledger::new();

        let result = ledger.debit(1, Decimal::new(10000, 4));

        assert!(matches!(
            result.unwrap_err(),
            EscrowError::InsufficientFunds { .. }
        ));
        assert_eq!(ledger.balance(1), Decimal::ZERO);
    }

    #[test]
    fn test_balance_of_unknown_party_is_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance(99), Decimal::ZERO);
    }

    #[test]
    fn test_settle_credits_once() {
        let ledger = Ledger::new();
        let amount = Decimal::new(5000000, 4);

        let first = ledger.settle(1, MovementKind::Payout, 20, amount).unwrap();
        let second = ledger.settle(1, MovementKind::Payout, 20, amount).unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(ledger.balance(20), amount);
        assert!(ledger.is_settled(1, MovementKind::Payout));
    }

    #[test]
    fn test_settle_distinguishes_kinds_and_orders() {
        let ledger = Ledger::new();
        let amount = Decimal::new(10000, 4);

        assert!(ledger.settle(1, MovementKind::Payout, 20, amount).unwrap());
        assert!(ledger.settle(1, MovementKind::Refund, 10, amount).unwrap());
        assert!(ledger.settle(2, MovementKind::Payout, 20, amount).unwrap());

        assert_eq!(ledger.balance(20), Decimal::new(20000, 4));
        assert_eq!(ledger.balance(10), Decimal::new(10000, 4));
    }

    #[test]
    fn test_wallets_snapshot() {
        let ledger = Ledger::new();

        ledger.credit(1, Decimal::ONE).unwrap();
        ledger.credit(2, Decimal::TWO).unwrap();

        let mut wallets = ledger.wallets();
        wallets.sort_by_key(|wallet| wallet.party);

        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].party, 1);
        assert_eq!(wallets[1].available, Decimal::TWO);
    }

    #[test]
    fn test_concurrent_settle_credits_exactly_once() {
        use std::sync::Arc;
        use std::thread;

        let ledger = Arc::new(Ledger::new());
        let amount = Decimal::new(5000000, 4);
        let mut handles = vec![];

        for _ in 0..10 {
            let ledger = Arc::clone(&ledger);
            handles.push(thread::spawn(move || {
                ledger.settle(1, MovementKind::Payout, 20, amount).unwrap()
            }));
        }

        let credited: usize = handles
            .into_iter()
            .map(|handle| handle.join().unwrap() as usize)
            .sum();

        assert_eq!(credited, 1);
        assert_eq!(ledger.balance(20), amount);
    }

    #[test]
    fn test_concurrent_credits_to_same_wallet() {
        use std::sync::Arc;
        use std::thread;

        let ledger = Arc::new(Ledger::new());
        let mut handles = vec![];

        for _ in 0..100 {
            let ledger = Arc::clone(&ledger);
            handles.push(thread::spawn(move || {
                ledger.credit(1, Decimal::new(100, 4)).unwrap();
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.balance(1), Decimal::new(10000, 4));
    }
}
