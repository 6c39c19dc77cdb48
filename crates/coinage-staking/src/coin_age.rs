//! # Coin-Age Calculator
//!
//! Converts stake entries into coin-days (amount × days held).
//!
//! | Entry age | Contribution |
//! |-----------|--------------|
//! | `< min_age` | 0 (not yet eligible) |
//! | `min_age ..= max_age` | `amount × age / 86_400` |
//! | `> max_age` | `amount × max_age / 86_400` |
//!
//! The clamp applies per entry: an entry older than `max_age` keeps its
//! capped contribution rather than expiring.

use crate::config::StakingConfig;
use crate::constants::SECONDS_PER_DAY;
use crate::error::{Result, StakingError};
use crate::stake_ledger::StakeEntry;

/// Coin-age calculator with eligibility floor and accrual ceiling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoinAgeCalculator {
    /// Seconds before an entry contributes
    pub min_age: u64,

    /// Ceiling on an entry's counted age, seconds
    pub max_age: u64,
}

impl CoinAgeCalculator {
    pub fn new(min_age: u64, max_age: u64) -> Self {
        Self { min_age, max_age }
    }

    pub fn from_config(config: &StakingConfig) -> Self {
        Self::new(config.stake_min_age, config.stake_max_age)
    }

    /// Counted age of an entry at `now`, or `None` while it is below the minimum age.
    ///
    /// An entry stamped after `now` has age 0.
    pub fn effective_age(&self, entry: &StakeEntry, now: u64) -> Option<u64> {
        let age = now.saturating_sub(entry.timestamp);
        if age < self.min_age {
            return None;
        }
        Some(age.min(self.max_age))
    }

    /// Total coin-days of `entries` at `now`
    pub fn coin_age(&self, entries: &[StakeEntry], now: u64) -> Result<u128> {
        entries.iter().try_fold(0u128, |total, entry| {
            let Some(age) = self.effective_age(entry, now) else {
                return Ok(total);
            };
            let coin_seconds = entry
                .amount
                .checked_mul(age as u128)
                .ok_or(StakingError::ArithmeticOverflow)?;
            total
                .checked_add(coin_seconds / SECONDS_PER_DAY as u128)
                .ok_or(StakingError::ArithmeticOverflow)
        })
    }
}
