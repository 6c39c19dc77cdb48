//! # Staking Pool
//!
//! Public face of the staking engine: one pool per token ledger.
//!
//! ## Operations
//!
//! | Operation | Preconditions | Effect |
//! |-----------|---------------|--------|
//! | `initialize` | Owner, first call | Mint initial supply to owner |
//! | `stake_all` | Allowance ≥ balance, balance ≥ minimum | Pull whole balance into custody, append entry |
//! | `reward` | - | Mint reward accrued since last claim |
//! | `unstake_all` | Staked balance > 0 | Settle reward, return stake, reset baseline |
//!
//! Operations run one at a time under a single lock and read the clock once.
//! Every check and every fallible computation happens before the first
//! ledger call; pool state is written only after the ledger calls succeed.

use crate::clock::Clock;
use crate::config::StakingConfig;
use crate::constants::CUSTODY_DOMAIN;
use crate::error::{Result, StakingError};
use crate::events::StakingEvent;
use crate::rewards::{supply_headroom, RewardEngine, RewardRecord, Settlement};
use crate::stake_ledger::{StakeEntry, StakeLedger};
use coinage_token::{AccountId, Balance, TokenLedger};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default custody account: BLAKE3 of the custody domain tag
pub fn default_custody_account() -> AccountId {
    *blake3::hash(CUSTODY_DOMAIN).as_bytes()
}

/// Result of unstaking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstakeReceipt {
    /// Stake returned
    pub amount: Balance,

    /// Final reward minted
    pub reward: Balance,
}

/// Per-account view inside a [`PoolSnapshot`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Account (hex)
    pub account: String,
    pub staked: Balance,
    pub entries: Vec<StakeEntry>,
    pub rewards: RewardRecord,
}

/// Serializable view of pool state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Owner (hex)
    pub owner: String,

    /// Custody account (hex)
    pub custody: String,

    pub config: StakingConfig,
    pub stake_start_time: u64,
    pub last_timestamp: u64,
    pub total_staked: Balance,
    pub total_rewards: Balance,
    pub total_supply: Balance,
    pub custody_balance: Balance,
    pub accounts: Vec<AccountSnapshot>,
}

/// Mutable pool state, present once initialized
struct PoolState {
    config: StakingConfig,
    stake_start_time: u64,
    stakes: StakeLedger,
    rewards: RewardEngine,
    /// Latest timestamp used by a committed operation
    last_timestamp: u64,
    events: Vec<StakingEvent>,
}

impl PoolState {
    fn check_time(&self, now: u64) -> Result<()> {
        if now < self.last_timestamp {
            return Err(StakingError::StaleTimestamp {
                now,
                last: self.last_timestamp,
            });
        }
        Ok(())
    }
}

/// Coin-age staking pool
pub struct StakingPool {
    /// Account allowed to initialize; receives the initial supply
    owner: AccountId,

    /// Ledger account holding staked tokens
    custody: AccountId,

    ledger: Arc<dyn TokenLedger>,
    clock: Arc<dyn Clock>,
    state: Mutex<Option<PoolState>>,
}

impl StakingPool {
    /// Create an uninitialized pool
    pub fn new(owner: AccountId, ledger: Arc<dyn TokenLedger>, clock: Arc<dyn Clock>) -> Self {
        Self {
            owner,
            custody: default_custody_account(),
            ledger,
            clock,
            state: Mutex::new(None),
        }
    }

    /// Use a specific custody account
    pub fn with_custody(mut self, custody: AccountId) -> Self {
        self.custody = custody;
        self
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Account that must be approved as spender before staking
    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().is_some()
    }

    /// One-time setup: fix the config and mint `min_total_supply` to the owner
    pub fn initialize(&self, caller: &AccountId, config: StakingConfig) -> Result<()> {
        let mut guard = self.state.lock();
        if guard.is_some() {
            return Err(StakingError::AlreadyInitialized);
        }
        if caller != &self.owner {
            return Err(StakingError::Unauthorized);
        }
        config.validate()?;

        let now = self.clock.now();
        let headroom = supply_headroom(self.ledger.as_ref(), config.max_total_supply);
        if config.min_total_supply > headroom {
            return Err(StakingError::SupplyCeilingExceeded {
                requested: config.min_total_supply,
                headroom,
            });
        }

        if config.min_total_supply > 0 {
            self.ledger.mint(&self.owner, config.min_total_supply)?;
        }

        info!(
            owner = %hex::encode(self.owner),
            minted = config.min_total_supply,
            stake_start_time = now,
            "Staking pool initialized"
        );

        let events = vec![StakingEvent::Initialized {
            owner: self.owner,
            minted: config.min_total_supply,
            timestamp: now,
        }];
        *guard = Some(PoolState {
            rewards: RewardEngine::from_config(&config),
            config,
            stake_start_time: now,
            stakes: StakeLedger::new(),
            last_timestamp: now,
            events,
        });
        Ok(())
    }

    /// Stake the account's entire balance, returning the amount staked
    pub fn stake_all(&self, account: &AccountId) -> Result<Balance> {
        let mut guard = self.state.lock();
        let state = guard.as_mut().ok_or(StakingError::NotInitialized)?;
        let now = self.clock.now();
        state.check_time(now)?;

        let balance = self.ledger.balance_of(account);
        let minimum = state.config.stake_min_amount;
        if balance == 0 || balance < minimum {
            return Err(StakingError::BelowMinimumStake { balance, minimum });
        }

        let allowance = self.ledger.allowance(account, &self.custody);
        if allowance < balance {
            return Err(StakingError::InsufficientAllowance {
                allowance,
                required: balance,
            });
        }

        state
            .stakes
            .total_staked(account)
            .checked_add(balance)
            .ok_or(StakingError::ArithmeticOverflow)?;

        self.ledger
            .transfer_from(&self.custody, account, &self.custody, balance)?;
        let total = state.stakes.add_entry(*account, balance, now)?;

        state.last_timestamp = now;
        state.events.push(StakingEvent::Staked {
            account: *account,
            amount: balance,
            timestamp: now,
        });
        info!(
            account = %hex::encode(account),
            amount = balance,
            total_staked = total,
            "Staked"
        );
        Ok(balance)
    }

    /// Settle the final reward and return the whole stake
    pub fn unstake_all(&self, account: &AccountId) -> Result<UnstakeReceipt> {
        let mut guard = self.state.lock();
        let state = guard.as_mut().ok_or(StakingError::NotInitialized)?;
        let now = self.clock.now();
        state.check_time(now)?;

        let staked = state.stakes.total_staked(account);
        if staked == 0 {
            return Err(StakingError::NoStakedBalance);
        }

        let settlement = self.plan_settlement(state, account, now, true)?;

        // Custody must cover the return before anything is minted
        self.ledger
            .balance_of(&self.custody)
            .checked_sub(staked)
            .ok_or(StakingError::ArithmeticUnderflow)?;

        self.mint_reward(account, &settlement)?;
        self.ledger.transfer(&self.custody, account, staked)?;

        state.rewards.commit(account, &settlement);
        let cleared = state.stakes.clear(account);
        debug_assert_eq!(cleared, staked);

        state.last_timestamp = now;
        if settlement.delta > 0 {
            state.events.push(StakingEvent::RewardSettled {
                account: *account,
                accrued: settlement.accrued,
                minted: settlement.minted,
                forfeited: settlement.forfeited,
                timestamp: now,
            });
        }
        state.events.push(StakingEvent::Unstaked {
            account: *account,
            amount: staked,
            reward: settlement.minted,
            timestamp: now,
        });
        info!(
            account = %hex::encode(account),
            amount = staked,
            reward = settlement.minted,
            "Unstaked"
        );

        Ok(UnstakeReceipt {
            amount: staked,
            reward: settlement.minted,
        })
    }

    /// Mint reward accrued since the last claim; 0 when nothing new accrued
    pub fn reward(&self, account: &AccountId) -> Result<Balance> {
        let mut guard = self.state.lock();
        let state = guard.as_mut().ok_or(StakingError::NotInitialized)?;
        let now = self.clock.now();
        state.check_time(now)?;

        let settlement = self.plan_settlement(state, account, now, false)?;
        self.mint_reward(account, &settlement)?;
        state.rewards.commit(account, &settlement);

        state.last_timestamp = now;
        if settlement.delta == 0 {
            debug!(account = %hex::encode(account), "No reward to claim");
            return Ok(0);
        }

        state.events.push(StakingEvent::RewardSettled {
            account: *account,
            accrued: settlement.accrued,
            minted: settlement.minted,
            forfeited: settlement.forfeited,
            timestamp: now,
        });
        info!(
            account = %hex::encode(account),
            minted = settlement.minted,
            accrued = settlement.accrued,
            "Reward claimed"
        );
        Ok(settlement.minted)
    }

    /// Settlement for `account` at `now`, clamped to the remaining supply
    fn plan_settlement(
        &self,
        state: &PoolState,
        account: &AccountId,
        now: u64,
        reset: bool,
    ) -> Result<Settlement> {
        let headroom = supply_headroom(self.ledger.as_ref(), state.config.max_total_supply);
        state
            .rewards
            .plan_settlement(account, state.stakes.entries(account), now, reset, headroom)
    }

    fn mint_reward(&self, account: &AccountId, settlement: &Settlement) -> Result<()> {
        if settlement.minted > 0 {
            self.ledger.mint(account, settlement.minted)?;
        }
        if settlement.forfeited > 0 {
            warn!(
                account = %hex::encode(account),
                forfeited = settlement.forfeited,
                "Supply ceiling reached, reward clamped"
            );
        }
        Ok(())
    }

    // === Queries ===

    fn read<R>(&self, f: impl FnOnce(&PoolState) -> R) -> Option<R> {
        self.state.lock().as_ref().map(f)
    }

    /// Tokens currently staked by an account
    pub fn stake_of(&self, account: &AccountId) -> Balance {
        self.read(|s| s.stakes.total_staked(account)).unwrap_or(0)
    }

    /// Current claimed baseline of an account
    pub fn rewards_of(&self, account: &AccountId) -> Balance {
        self.read(|s| s.rewards.record(account).claimed)
            .unwrap_or(0)
    }

    /// Everything ever minted to an account as reward
    pub fn all_time_rewards_of(&self, account: &AccountId) -> Balance {
        self.read(|s| s.rewards.record(account).all_time_claimed)
            .unwrap_or(0)
    }

    /// Everything ever minted as reward
    pub fn total_rewards(&self) -> Balance {
        self.read(|s| s.rewards.total_rewards()).unwrap_or(0)
    }

    /// Tokens staked across all accounts
    pub fn total_staked(&self) -> Result<Balance> {
        self.read(|s| s.stakes.total_staked_all())
            .unwrap_or(Ok(0))
    }

    pub fn stake_entries(&self, account: &AccountId) -> Vec<StakeEntry> {
        self.read(|s| s.stakes.entries(account).to_vec())
            .unwrap_or_default()
    }

    /// Coin-days of an account right now
    pub fn coin_age_of(&self, account: &AccountId) -> Result<u128> {
        let now = self.clock.now();
        self.read(|s| s.rewards.coin_age(s.stakes.entries(account), now))
            .ok_or(StakingError::NotInitialized)?
    }

    /// Reward `reward()` would mint right now, before supply clamping
    pub fn pending_reward_of(&self, account: &AccountId) -> Result<Balance> {
        let now = self.clock.now();
        self.read(|s| {
            s.rewards
                .pending_reward(account, s.stakes.entries(account), now)
        })
        .ok_or(StakingError::NotInitialized)?
    }

    pub fn config(&self) -> Option<StakingConfig> {
        self.read(|s| s.config.clone())
    }

    pub fn stake_start_time(&self) -> Option<u64> {
        self.read(|s| s.stake_start_time)
    }

    /// Audit log, oldest first
    pub fn events(&self) -> Vec<StakingEvent> {
        self.read(|s| s.events.clone()).unwrap_or_default()
    }

    /// Serializable view of the whole pool
    pub fn snapshot(&self) -> Result<PoolSnapshot> {
        let guard = self.state.lock();
        let state = guard.as_ref().ok_or(StakingError::NotInitialized)?;

        let accounts: BTreeSet<&AccountId> =
            state.stakes.stakers().chain(state.rewards.accounts()).collect();

        Ok(PoolSnapshot {
            owner: hex::encode(self.owner),
            custody: hex::encode(self.custody),
            config: state.config.clone(),
            stake_start_time: state.stake_start_time,
            last_timestamp: state.last_timestamp,
            total_staked: state.stakes.total_staked_all()?,
            total_rewards: state.rewards.total_rewards(),
            total_supply: self.ledger.total_supply(),
            custody_balance: self.ledger.balance_of(&self.custody),
            accounts: accounts
                .into_iter()
                .map(|account| AccountSnapshot {
                    account: hex::encode(account),
                    staked: state.stakes.total_staked(account),
                    entries: state.stakes.entries(account).to_vec(),
                    rewards: state.rewards.record(account),
                })
                .collect(),
        })
    }
}
