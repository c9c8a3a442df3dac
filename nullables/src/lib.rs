//! Nullable infrastructure for deterministic testing.
//!
//! External collaborators of the ledger (the clock and asset custody) get
//! test-friendly implementations here that:
//! - Return deterministic values
//! - Can be controlled programmatically, including scripted failures
//! - Never touch real funds or the system clock
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod custody;

pub use clock::NullClock;
pub use custody::NullCustody;
