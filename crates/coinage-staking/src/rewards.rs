//! # Reward Engine
//!
//! Turns coin-age into minted interest and keeps per-account and global
//! reward bookkeeping.
//!
//! ## Settlement
//!
//! Accrued reward is recomputed from scratch on every call, so the engine
//! records how much of it was already paid (`claimed`) and mints only the
//! difference:
//!
//! ```text
//! accrued = coin_age × rate / (365 × 10^precision)
//! delta   = accrued - claimed          (no-op when ≤ 0)
//! minted  = min(delta, supply headroom)
//! claimed = reset ? 0 : accrued
//! ```
//!
//! Settlement is split into [`RewardEngine::plan_settlement`] (pure, all
//! fallible arithmetic) and [`RewardEngine::commit`] (infallible writes), so
//! callers can run ledger calls in between and abort without touching state.

use crate::coin_age::CoinAgeCalculator;
use crate::config::StakingConfig;
use crate::constants::DAYS_PER_YEAR;
use crate::error::{Result, StakingError};
use crate::stake_ledger::StakeEntry;
use coinage_token::{AccountId, Balance, TokenLedger};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reward bookkeeping for one account
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    /// Part of the current accrual already minted; reset on unstake
    pub claimed: Balance,

    /// Everything ever minted to this account as reward
    pub all_time_claimed: Balance,
}

/// Fixed-point annual interest rate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRate {
    /// Rate scaled by `10^precision`
    pub rate: u128,

    /// Decimal exponent of the scale
    pub precision: u32,
}

impl InterestRate {
    pub fn new(rate: u128, precision: u32) -> Self {
        Self { rate, precision }
    }

    pub fn from_config(config: &StakingConfig) -> Self {
        Self::new(config.annual_interest_rate, config.stake_precision)
    }

    /// Interest earned by `coin_age` coin-days.
    ///
    /// Uses a 256-bit intermediate: 18-decimal balances times an 18-decimal
    /// rate exceed u128 long before the quotient does.
    pub fn reward_for(&self, coin_age: u128) -> Result<Balance> {
        if coin_age == 0 || self.rate == 0 {
            return Ok(0);
        }

        let scale = 10u128
            .checked_pow(self.precision)
            .ok_or(StakingError::ArithmeticOverflow)?;
        let denominator = U256::from(scale) * U256::from(DAYS_PER_YEAR);
        let numerator = U256::from(coin_age)
            .checked_mul(U256::from(self.rate))
            .ok_or(StakingError::ArithmeticOverflow)?;

        let reward = numerator / denominator;
        if reward > U256::from(u128::MAX) {
            return Err(StakingError::ArithmeticOverflow);
        }
        Ok(reward.as_u128())
    }
}

/// Outcome of a settlement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Full reward accrued at settlement time
    pub accrued: Balance,

    /// Accrued minus previously claimed (0 when nothing new)
    pub delta: Balance,

    /// Amount to mint (delta clamped to supply headroom)
    pub minted: Balance,

    /// Part of delta dropped by the supply ceiling
    pub forfeited: Balance,

    /// Claimed baseline after commit
    pub claimed_after: Balance,

    /// All-time total after commit
    pub all_time_after: Balance,

    /// Global total after commit
    pub total_after: Balance,
}

/// Tokens that can still be minted under both `max_total_supply` and the
/// ledger's own cap
pub fn supply_headroom(ledger: &dyn TokenLedger, max_total_supply: Balance) -> Balance {
    let ceiling = match ledger.max_supply() {
        Some(cap) => cap.min(max_total_supply),
        None => max_total_supply,
    };
    ceiling.saturating_sub(ledger.total_supply())
}

/// Reward engine
#[derive(Clone, Debug)]
pub struct RewardEngine {
    /// Coin-age rules
    calculator: CoinAgeCalculator,

    /// Interest rate
    rate: InterestRate,

    /// Per-account records
    records: HashMap<AccountId, RewardRecord>,

    /// Sum of all minted rewards
    total_rewards: Balance,
}

impl RewardEngine {
    pub fn new(calculator: CoinAgeCalculator, rate: InterestRate) -> Self {
        Self {
            calculator,
            rate,
            records: HashMap::new(),
            total_rewards: 0,
        }
    }

    pub fn from_config(config: &StakingConfig) -> Self {
        Self::new(
            CoinAgeCalculator::from_config(config),
            InterestRate::from_config(config),
        )
    }

    /// Record for an account (zeroed if unknown)
    pub fn record(&self, account: &AccountId) -> RewardRecord {
        self.records.get(account).copied().unwrap_or_default()
    }

    /// Accounts with a reward record
    pub fn accounts(&self) -> impl Iterator<Item = &AccountId> {
        self.records.keys()
    }

    /// Global minted total
    pub fn total_rewards(&self) -> Balance {
        self.total_rewards
    }

    /// Coin-days of `entries` at `now`
    pub fn coin_age(&self, entries: &[StakeEntry], now: u64) -> Result<u128> {
        self.calculator.coin_age(entries, now)
    }

    /// Full reward accrued by `entries` at `now`
    pub fn accrued_reward(&self, entries: &[StakeEntry], now: u64) -> Result<Balance> {
        let coin_age = self.coin_age(entries, now)?;
        self.rate.reward_for(coin_age)
    }

    /// Reward a settlement at `now` would pay, ignoring the supply ceiling
    pub fn pending_reward(
        &self,
        account: &AccountId,
        entries: &[StakeEntry],
        now: u64,
    ) -> Result<Balance> {
        let accrued = self.accrued_reward(entries, now)?;
        Ok(accrued.saturating_sub(self.record(account).claimed))
    }

    /// Compute a settlement without applying it.
    ///
    /// `reset` zeroes the claimed baseline even when nothing new accrued;
    /// unstaking removes the basis the baseline was measured against.
    pub fn plan_settlement(
        &self,
        account: &AccountId,
        entries: &[StakeEntry],
        now: u64,
        reset: bool,
        headroom: Balance,
    ) -> Result<Settlement> {
        let record = self.record(account);
        let accrued = self.accrued_reward(entries, now)?;

        let delta = accrued.saturating_sub(record.claimed);
        if delta == 0 {
            return Ok(Settlement {
                accrued,
                claimed_after: if reset { 0 } else { record.claimed },
                all_time_after: record.all_time_claimed,
                total_after: self.total_rewards,
                ..Settlement::default()
            });
        }

        let minted = delta.min(headroom);
        let all_time_after = record
            .all_time_claimed
            .checked_add(minted)
            .ok_or(StakingError::ArithmeticOverflow)?;
        let total_after = self
            .total_rewards
            .checked_add(minted)
            .ok_or(StakingError::ArithmeticOverflow)?;

        Ok(Settlement {
            accrued,
            delta,
            minted,
            forfeited: delta - minted,
            claimed_after: if reset { 0 } else { accrued },
            all_time_after,
            total_after,
        })
    }

    /// Apply a settlement produced by [`plan_settlement`](Self::plan_settlement).
    ///
    /// A settlement that changes nothing for an account without a record
    /// leaves no record behind.
    pub fn commit(&mut self, account: &AccountId, settlement: &Settlement) {
        let untouched = settlement.delta == 0 && settlement.claimed_after == 0;
        if untouched && !self.records.contains_key(account) {
            return;
        }

        let record = self.records.entry(*account).or_default();
        record.claimed = settlement.claimed_after;
        record.all_time_claimed = settlement.all_time_after;
        self.total_rewards = settlement.total_after;
    }
}
