//! Errors raised while constructing or parsing fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("value must be non-negative, got {0}")]
    Negative(String),

    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),
}
