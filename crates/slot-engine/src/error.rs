//! Error types for the slot engine

use thiserror::Error;

use crate::Credits;

/// Core error type
///
/// Every variant is recoverable. A call that returns one of these has left
/// the session exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("Insufficient funds: balance {balance} is below bet {bet}")]
    InsufficientFunds { balance: Credits, bet: u64 },

    #[error("Spin already in progress")]
    SpinInProgress,

    #[error("Bet cannot change while reels are spinning")]
    BetLocked,

    #[error("Malformed strip data: {0}")]
    MalformedStripData(String),

    #[error("Invalid config: {0}")]
    Config(String),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
