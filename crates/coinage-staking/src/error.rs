//! Staking errors

use coinage_token::{Balance, LedgerError};

/// Staking errors
///
/// Every error aborts the operation that raised it with no change to pool
/// state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StakingError {
    #[error("Staking pool not initialized")]
    NotInitialized,

    #[error("Staking pool already initialized")]
    AlreadyInitialized,

    #[error("Caller is not the pool owner")]
    Unauthorized,

    #[error("Insufficient allowance: approved {allowance}, required {required}")]
    InsufficientAllowance { allowance: Balance, required: Balance },

    #[error("Balance {balance} below minimum stake {minimum}")]
    BelowMinimumStake { balance: Balance, minimum: Balance },

    #[error("No staked balance")]
    NoStakedBalance,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("Mint of {requested} exceeds supply headroom {headroom}")]
    SupplyCeilingExceeded { requested: Balance, headroom: Balance },

    #[error("Timestamp {now} precedes last processed timestamp {last}")]
    StaleTimestamp { now: u64, last: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Staking result
pub type Result<T> = std::result::Result<T, StakingError>;
