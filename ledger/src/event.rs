//! Ledger notifications.

use serde::{Deserialize, Serialize};
use staking_types::Address;

/// One notification per successful mutating call, in execution order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Principal was deposited.
    Deposited { account: Address, amount: u128 },
    /// Principal was withdrawn and paid out.
    Withdrawn { account: Address, amount: u128 },
    /// Accrued reward was paid out.
    RewardPaid { account: Address, amount: u128 },
    /// The reward pool was topped up.
    Funded { funder: Address, amount: u128 },
}

impl LedgerEvent {
    /// Event name as it appears in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposited { .. } => "Deposited",
            Self::Withdrawn { .. } => "Withdrawn",
            Self::RewardPaid { .. } => "RewardPaid",
            Self::Funded { .. } => "Funded",
        }
    }
}

/// Synchronous fan-out of ledger events.
///
/// Listeners run inline on the emitting call; keep them fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
