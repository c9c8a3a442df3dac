//! Ledger construction parameters.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use staking_types::{parse_units, RewardRate};

/// Configuration for a [`StakingLedger`](crate::StakingLedger).
///
/// Values are decimal strings (`"0.1"`, `"100"`) so config files stay
/// readable; they are validated when the ledger is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Reward per second per staked unit.
    #[serde(default = "default_zero")]
    pub reward_rate: String,

    /// Units the operator moves into the reward pool at startup.
    #[serde(default = "default_zero")]
    pub initial_funding: String,
}

fn default_zero() -> String {
    "0".to_string()
}

impl LedgerConfig {
    /// Parse and validate the configured rate.
    pub fn reward_rate(&self) -> Result<RewardRate, LedgerError> {
        Ok(RewardRate::parse(&self.reward_rate)?)
    }

    /// Parse the startup funding into raw units.
    pub fn initial_funding(&self) -> Result<u128, LedgerError> {
        Ok(parse_units(&self.initial_funding)?)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            reward_rate: default_zero(),
            initial_funding: default_zero(),
        }
    }
}
