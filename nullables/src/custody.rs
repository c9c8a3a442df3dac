//! Nullable custody — an asset vault whose failures can be scripted.

use staking_ledger::{Custody, CustodyError};
use staking_types::Address;

/// A test custody backend.
///
/// Accepts every deposit, pays out while it holds enough, and records each
/// movement for assertions. A failure can be queued for the next receive or
/// transfer to exercise rollback paths.
#[derive(Debug, Default)]
pub struct NullCustody {
    held: u128,
    received: Vec<(Address, u128)>,
    transferred: Vec<(Address, u128)>,
    fail_next_receive: Option<String>,
    fail_next_transfer: Option<String>,
}

impl NullCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custody that already holds `amount` (e.g. a pre-funded reward pool).
    pub fn with_balance(amount: u128) -> Self {
        Self {
            held: amount,
            ..Self::default()
        }
    }

    /// Reject the next `receive` with `reason`.
    pub fn fail_next_receive(&mut self, reason: impl Into<String>) {
        self.fail_next_receive = Some(reason.into());
    }

    /// Reject the next `transfer` with `reason`.
    pub fn fail_next_transfer(&mut self, reason: impl Into<String>) {
        self.fail_next_transfer = Some(reason.into());
    }

    /// Drop any queued failure that has not fired yet.
    pub fn clear_failures(&mut self) {
        self.fail_next_receive = None;
        self.fail_next_transfer = None;
    }

    /// Simulate an external transfer straight into custody.
    pub fn inject(&mut self, amount: u128) {
        self.held = self.held.saturating_add(amount);
    }

    /// Simulate value leaving custody outside the ledger's control.
    pub fn drain(&mut self, amount: u128) {
        self.held = self.held.saturating_sub(amount);
    }

    /// All successful receives, oldest first.
    pub fn received(&self) -> &[(Address, u128)] {
        &self.received
    }

    /// All successful transfers, oldest first.
    pub fn transferred(&self) -> &[(Address, u128)] {
        &self.transferred
    }
}

impl Custody for NullCustody {
    fn balance(&self) -> u128 {
        self.held
    }

    fn receive(&mut self, from: &Address, amount: u128) -> Result<(), CustodyError> {
        if let Some(reason) = self.fail_next_receive.take() {
            return Err(CustodyError::Rejected(reason));
        }
        self.held = self.held.checked_add(amount).ok_or(CustodyError::Overflow)?;
        self.received.push((*from, amount));
        Ok(())
    }

    fn transfer(&mut self, to: &Address, amount: u128) -> Result<(), CustodyError> {
        if let Some(reason) = self.fail_next_transfer.take() {
            return Err(CustodyError::Rejected(reason));
        }
        if self.held < amount {
            return Err(CustodyError::InsufficientFunds {
                needed: amount,
                available: self.held,
            });
        }
        self.held -= amount;
        self.transferred.push((*to, amount));
        Ok(())
    }
}
