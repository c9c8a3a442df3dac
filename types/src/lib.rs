//! Fundamental types for the staking ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! participant addresses, timestamps, the fixed-point reward rate, and
//! decimal conversion for raw amounts.

pub mod address;
pub mod error;
pub mod rate;
pub mod time;
pub mod units;

pub use address::Address;
pub use error::TypeError;
pub use rate::{RewardRate, RATE_SCALE};
pub use time::Timestamp;
pub use units::{format_units, parse_units, UNIT};
