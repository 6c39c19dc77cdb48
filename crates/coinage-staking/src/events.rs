//! Pool audit events

use coinage_token::{AccountId, Balance};
use serde::{Deserialize, Serialize};

/// Committed state transition, appended to the pool's audit log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StakingEvent {
    /// Pool initialized and initial supply minted
    Initialized {
        owner: AccountId,
        minted: Balance,
        timestamp: u64,
    },

    /// Full balance moved into staking
    Staked {
        account: AccountId,
        amount: Balance,
        timestamp: u64,
    },

    /// Reward settled with a non-zero delta
    RewardSettled {
        account: AccountId,
        accrued: Balance,
        minted: Balance,
        forfeited: Balance,
        timestamp: u64,
    },

    /// Stake returned to the account
    Unstaked {
        account: AccountId,
        amount: Balance,
        reward: Balance,
        timestamp: u64,
    },
}

impl StakingEvent {
    /// Account the event concerns
    pub fn account(&self) -> &AccountId {
        match self {
            Self::Initialized { owner, .. } => owner,
            Self::Staked { account, .. }
            | Self::RewardSettled { account, .. }
            | Self::Unstaked { account, .. } => account,
        }
    }

    /// Event time
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::Initialized { timestamp, .. }
            | Self::Staked { timestamp, .. }
            | Self::RewardSettled { timestamp, .. }
            | Self::Unstaked { timestamp, .. } => *timestamp,
        }
    }
}
