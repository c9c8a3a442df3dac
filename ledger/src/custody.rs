//! Asset custody capability.
//!
//! The ledger never moves value itself. Every inbound deposit and outbound
//! payout goes through a [`Custody`] implementation, so the accounting can be
//! exercised against a fake backend in tests.

use staking_types::Address;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    #[error("insufficient funds: need {needed}, available {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("custody balance overflow")]
    Overflow,

    #[error("rejected: {0}")]
    Rejected(String),
}

/// The narrow value-transfer interface the ledger depends on.
pub trait Custody {
    /// Assets currently held in custody.
    fn balance(&self) -> u128;

    /// Move `amount` from `from` into custody.
    fn receive(&mut self, from: &Address, amount: u128) -> Result<(), CustodyError>;

    /// Move `amount` out of custody to `to`. Fails if custody holds less.
    fn transfer(&mut self, to: &Address, amount: u128) -> Result<(), CustodyError>;
}

/// In-memory custody that also tracks the external wallets it exchanges
/// value with.
///
/// Used by the simulator. `receive` debits the sender's wallet and
/// `transfer` credits the recipient's, so total value is conserved.
#[derive(Clone, Debug, Default)]
pub struct MemoryCustody {
    held: u128,
    wallets: HashMap<Address, u128>,
}

impl MemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give an external wallet spendable funds (genesis allocation).
    pub fn credit_wallet(&mut self, owner: &Address, amount: u128) -> Result<(), CustodyError> {
        let entry = self.wallets.entry(*owner).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(CustodyError::Overflow)?;
        Ok(())
    }

    /// Spendable funds held by an external wallet.
    pub fn wallet_balance(&self, owner: &Address) -> u128 {
        self.wallets.get(owner).copied().unwrap_or(0)
    }

    /// Custody holdings plus every external wallet.
    pub fn total_supply(&self) -> u128 {
        self.wallets
            .values()
            .fold(self.held, |acc, v| acc.saturating_add(*v))
    }
}

impl Custody for MemoryCustody {
    fn balance(&self) -> u128 {
        self.held
    }

    fn receive(&mut self, from: &Address, amount: u128) -> Result<(), CustodyError> {
        let available = self.wallet_balance(from);
        if available < amount {
            return Err(CustodyError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        let held = self.held.checked_add(amount).ok_or(CustodyError::Overflow)?;
        self.wallets.insert(*from, available - amount);
        self.held = held;
        Ok(())
    }

    fn transfer(&mut self, to: &Address, amount: u128) -> Result<(), CustodyError> {
        if self.held < amount {
            return Err(CustodyError::InsufficientFunds {
                needed: amount,
                available: self.held,
            });
        }
        let credited = self
            .wallet_balance(to)
            .checked_add(amount)
            .ok_or(CustodyError::Overflow)?;
        self.held -= amount;
        self.wallets.insert(*to, credited);
        Ok(())
    }
}
