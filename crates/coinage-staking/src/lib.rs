//! # Coinage Staking - Coin-Age Proof-of-Stake Rewards
//!
//! Staking sub-ledger and interest engine layered over a fungible token
//! ledger. Rewards accrue on *coin-age*: amount staked × time held.
//!
//! ## Accrual
//!
//! ```text
//! coin_age = Σ  amount × min(now - staked_at, max_age) / 86_400     (entries aged ≥ min_age)
//! reward   = coin_age × annual_rate / (365 × 10^precision)
//! minted   = reward - already_claimed
//! ```
//!
//! ## Defaults
//!
//! | Parameter | Value |
//! |-----------|-------|
//! | Decimals | 18 |
//! | Initial supply | 1,000,000 CNG |
//! | Supply ceiling | 10,000,000 CNG |
//! | Minimum stake age | 1 day |
//! | Maximum stake age | 30 days |
//! | Annual interest | 10% |
//!
//! ## Lifecycle
//!
//! | Operation | From | To |
//! |-----------|------|----|
//! | `stake_all` | Unstaked / Staked | Staked |
//! | `reward` | any | unchanged |
//! | `unstake_all` | Staked | Unstaked |

pub mod clock;
pub mod coin_age;
pub mod config;
pub mod error;
pub mod events;
pub mod pool;
pub mod rewards;
pub mod stake_ledger;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use coin_age::CoinAgeCalculator;
pub use config::{ConfigError, StakingConfig};
pub use error::{Result, StakingError};
pub use events::StakingEvent;
pub use pool::{AccountSnapshot, PoolSnapshot, StakingPool, UnstakeReceipt};
pub use rewards::{InterestRate, RewardEngine, RewardRecord, Settlement};
pub use stake_ledger::{StakeEntry, StakeLedger};

pub use coinage_token::{AccountId, Balance, LedgerError, TokenLedger};

/// Coinage staking constants
pub mod constants {
    use coinage_token::Balance;

    /// Token symbol
    pub const SYMBOL: &str = "CNG";

    /// Token name
    pub const NAME: &str = "Coinage";

    /// Decimal places
    pub const DECIMALS: u8 = 18;

    /// One CNG in smallest units
    pub const ONE_TOKEN: Balance = 1_000_000_000_000_000_000; // 10^18

    /// Seconds per coin-day
    pub const SECONDS_PER_DAY: u64 = 86_400;

    /// Days per interest year
    pub const DAYS_PER_YEAR: u64 = 365;

    /// Default initial supply minted to the owner: 1 million CNG
    pub const DEFAULT_MIN_TOTAL_SUPPLY: Balance = 1_000_000 * ONE_TOKEN;

    /// Default supply ceiling: 10 million CNG
    pub const DEFAULT_MAX_TOTAL_SUPPLY: Balance = 10_000_000 * ONE_TOKEN;

    /// Default minimum stake age: 1 day
    pub const DEFAULT_STAKE_MIN_AGE: u64 = SECONDS_PER_DAY;

    /// Default maximum stake age: 30 days
    pub const DEFAULT_STAKE_MAX_AGE: u64 = 30 * SECONDS_PER_DAY;

    /// Default fixed-point precision (decimal exponent)
    pub const DEFAULT_STAKE_PRECISION: u32 = 18;

    /// Default annual interest: 10% at precision 18
    pub const DEFAULT_ANNUAL_INTEREST_RATE: u128 = 100_000_000_000_000_000;

    /// Largest precision whose scale factor fits in u128
    pub const MAX_STAKE_PRECISION: u32 = 38;

    /// Domain tag hashed into the default custody account
    pub const CUSTODY_DOMAIN: &[u8] = b"coinage/staking-custody/v1";
}

pub use constants::*;
