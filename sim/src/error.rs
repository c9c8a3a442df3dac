//! Simulator error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("config error: {0}")]
    Config(String),

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] staking_ledger::LedgerError),

    #[error("custody error: {0}")]
    Custody(#[from] staking_ledger::CustodyError),
}
