//! # Stake Ledger
//!
//! Per-account, append-only history of stake entries. Entries are never
//! merged, so each keeps its own timestamp and ages independently. The only
//! removal is [`StakeLedger::clear`], which drops every entry of an account
//! at once and reports the total that was staked.

use crate::error::{Result, StakingError};
use coinage_token::{AccountId, Balance};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single deposit into staking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeEntry {
    /// Tokens deposited
    pub amount: Balance,

    /// Deposit time (Unix seconds)
    pub timestamp: u64,
}

/// Stake entries for all accounts
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StakeLedger {
    /// Entries per account, in chronological order
    entries: HashMap<AccountId, Vec<StakeEntry>>,
}

impl StakeLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning the account's new staked total.
    ///
    /// Rejects entries whose amount would push the account total past
    /// `Balance::MAX`, so every later sum fits.
    pub fn add_entry(
        &mut self,
        account: AccountId,
        amount: Balance,
        timestamp: u64,
    ) -> Result<Balance> {
        let total = self
            .total_staked(&account)
            .checked_add(amount)
            .ok_or(StakingError::ArithmeticOverflow)?;

        self.entries
            .entry(account)
            .or_default()
            .push(StakeEntry { amount, timestamp });
        Ok(total)
    }

    /// Entries of an account, oldest first
    pub fn entries(&self, account: &AccountId) -> &[StakeEntry] {
        self.entries.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of an account's entries (0 if none)
    pub fn total_staked(&self, account: &AccountId) -> Balance {
        self.entries(account).iter().map(|e| e.amount).sum()
    }

    /// Remove all entries of an account, returning what they summed to
    pub fn clear(&mut self, account: &AccountId) -> Balance {
        self.entries
            .remove(account)
            .map(|entries| entries.iter().map(|e| e.amount).sum())
            .unwrap_or(0)
    }

    /// Number of accounts with at least one entry
    pub fn staker_count(&self) -> usize {
        self.entries.len()
    }

    /// Accounts with at least one entry
    pub fn stakers(&self) -> impl Iterator<Item = &AccountId> {
        self.entries.keys()
    }

    /// Sum across every account
    pub fn total_staked_all(&self) -> Result<Balance> {
        self.entries.keys().try_fold(0 as Balance, |acc, account| {
            acc.checked_add(self.total_staked(account))
                .ok_or(StakingError::ArithmeticOverflow)
        })
    }
}
