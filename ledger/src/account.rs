//! Per-participant ledger entry.

use serde::{Deserialize, Serialize};
use staking_types::Timestamp;

/// Accounting state for one participant.
///
/// Created lazily on first deposit and never removed. An account with no
/// principal and no accrued reward is logically empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantAccount {
    /// Deposited amount, withdrawable at any time.
    pub principal: u128,
    /// Reward credited by settlement but not yet paid out.
    pub accrued_reward: u128,
    /// Time up to which reward has been settled. Never moves backwards.
    pub last_accrual: Timestamp,
}

impl ParticipantAccount {
    /// A fresh, empty account whose accrual clock starts at `now`.
    pub fn opened_at(now: Timestamp) -> Self {
        Self {
            principal: 0,
            accrued_reward: 0,
            last_accrual: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.principal == 0 && self.accrued_reward == 0
    }
}
