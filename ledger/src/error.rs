//! Ledger errors.
//!
//! Precondition failures carry fixed reason strings so callers can match on
//! the exact cause.

use crate::custody::CustodyError;
use staking_types::TypeError;
use thiserror::Error;

pub const CANNOT_STAKE_ZERO: &str = "Cannot stake 0";
pub const CANNOT_WITHDRAW_ZERO: &str = "Cannot withdraw 0";
pub const CANNOT_FUND_ZERO: &str = "Cannot fund 0";
pub const NO_REWARD_TO_CLAIM: &str = "No reward to claim";
pub const NOTHING_TO_EXIT: &str = "Nothing to exit";
pub const INSUFFICIENT_BALANCE: &str = "Insufficient balance";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{0}")]
    InvalidAmount(&'static str),

    #[error("Insufficient balance")]
    InsufficientBalance { requested: u128, available: u128 },

    #[error("transfer failed: {0}")]
    TransferFailure(#[from] CustodyError),

    #[error("invalid ledger parameters: {0}")]
    Construction(#[from] TypeError),

    #[error("timestamp precedes the account's last settlement")]
    InvalidTimestamp,

    #[error("arithmetic overflow in ledger computation")]
    Overflow,

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    /// Stable, machine-matchable reason code for this failure.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidAmount(reason) => *reason,
            Self::InsufficientBalance { .. } => INSUFFICIENT_BALANCE,
            Self::TransferFailure(_) => "TransferFailure",
            Self::Construction(_) => "ConstructionError",
            Self::InvalidTimestamp => "InvalidTimestamp",
            Self::Overflow => "Overflow",
            Self::InvariantViolation(_) => "InvariantViolation",
            Self::CorruptSnapshot(_) => "CorruptSnapshot",
            Self::Serialization(_) => "Serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_messages_are_exact() {
        assert_eq!(
            LedgerError::InvalidAmount(CANNOT_STAKE_ZERO).to_string(),
            "Cannot stake 0"
        );
        let err = LedgerError::InsufficientBalance {
            requested: 2,
            available: 1,
        };
        assert_eq!(err.to_string(), "Insufficient balance");
        assert_eq!(err.reason(), "Insufficient balance");
    }

    #[test]
    fn reason_codes_match_variants() {
        assert_eq!(LedgerError::InvalidAmount(NOTHING_TO_EXIT).reason(), "Nothing to exit");
        assert_eq!(LedgerError::Overflow.reason(), "Overflow");
        assert_eq!(
            LedgerError::from(CustodyError::Rejected("down".into())).reason(),
            "TransferFailure"
        );
        assert_eq!(
            LedgerError::from(TypeError::Negative("-1".into())).reason(),
            "ConstructionError"
        );
    }
}
