//! Staking ledger — custody accounting with time-proportional rewards.
//!
//! Participants deposit a native asset, withdraw it, and earn rewards at
//! `principal × rate × elapsed` against a separately funded reward pool.
//! The engine never promises more reward than custody can pay.
//!
//! This crate handles:
//! - Per-participant principal and reward accounting
//! - Settlement of accrued reward before every balance change
//! - Atomic payouts through a narrow [`Custody`] capability
//! - Ordered event log and synchronous subscribers
//! - Integrity-checked snapshots for persistence

pub mod account;
pub mod accrual;
pub mod config;
pub mod custody;
pub mod engine;
pub mod error;
pub mod event;
pub mod snapshot;

pub use account::ParticipantAccount;
pub use config::LedgerConfig;
pub use custody::{Custody, CustodyError, MemoryCustody};
pub use engine::StakingLedger;
pub use error::LedgerError;
pub use event::{EventBus, LedgerEvent};
pub use snapshot::{AccountSnapshot, LedgerSnapshot};
