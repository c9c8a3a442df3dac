//! Ledger snapshots — the full accounting state at a point in time.
//!
//! A snapshot carries a Blake2b-256 hash over its contents so a restored
//! ledger can be checked for tampering or truncation before use. Accounts
//! are sorted by address, making the hash independent of map order.

use serde::{Deserialize, Serialize};
use staking_types::{Address, RewardRate, Timestamp};

use crate::error::LedgerError;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 of every other field.
    pub hash: [u8; 32],
    pub version: u32,
    pub reward_rate: RewardRate,
    pub total_staked: u128,
    pub total_accrued: u128,
    pub accounts: Vec<AccountSnapshot>,
}

/// One participant's entry in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Address,
    pub principal: u128,
    pub accrued_reward: u128,
    pub last_accrual: Timestamp,
}

impl LedgerSnapshot {
    pub fn create(
        reward_rate: RewardRate,
        total_staked: u128,
        total_accrued: u128,
        mut accounts: Vec<AccountSnapshot>,
    ) -> Self {
        accounts.sort_by(|a, b| a.address.cmp(&b.address));
        let mut snap = Self {
            hash: [0u8; 32],
            version: SNAPSHOT_VERSION,
            reward_rate,
            total_staked,
            total_accrued,
            accounts,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.reward_rate.raw().to_le_bytes());
        hasher.update(self.total_staked.to_le_bytes());
        hasher.update(self.total_accrued.to_le_bytes());
        for account in &self.accounts {
            hasher.update(account.address.as_bytes());
            hasher.update(account.principal.to_le_bytes());
            hasher.update(account.accrued_reward.to_le_bytes());
            hasher.update(account.last_accrual.as_secs().to_le_bytes());
        }

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Whether the stored hash matches the contents and the version is known.
    pub fn verify(&self) -> bool {
        self.version == SNAPSHOT_VERSION && self.hash == self.compute_hash()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::CorruptSnapshot(e.to_string()))
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}
