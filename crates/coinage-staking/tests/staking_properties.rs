//! Integration tests for the Coinage staking pool
//!
//! These tests drive full stake / reward / unstake sequences against the
//! in-memory ledger and check value conservation, reward monotonicity and
//! the accrual scenarios the reward formula is calibrated on.

use coinage_staking::{
    AccountId, Balance, ManualClock, StakingConfig, StakingError, StakingEvent, StakingPool,
    TokenLedger, DEFAULT_MIN_TOTAL_SUPPLY, ONE_TOKEN, SECONDS_PER_DAY,
};
use coinage_token::InMemoryLedger;
use proptest::prelude::*;
use std::sync::Arc;

const OWNER: AccountId = [1u8; 32];
const ALICE: AccountId = [2u8; 32];
const BOB: AccountId = [3u8; 32];
const DAY: u64 = SECONDS_PER_DAY;
const T0: u64 = 1_700_000_000;

const MIN_AGE: u64 = 86_400;
const MAX_AGE: u64 = 2_592_000;

struct Harness {
    ledger: Arc<InMemoryLedger>,
    clock: Arc<ManualClock>,
    pool: StakingPool,
}

impl Harness {
    fn new(config: StakingConfig) -> Self {
        Self::with_ledger(InMemoryLedger::default(), config)
    }

    fn with_ledger(ledger: InMemoryLedger, config: StakingConfig) -> Self {
        let ledger = Arc::new(ledger);
        let clock = Arc::new(ManualClock::new(T0));
        let pool = StakingPool::new(OWNER, ledger.clone(), clock.clone());
        pool.initialize(&OWNER, config).expect("initialize");
        Self {
            ledger,
            clock,
            pool,
        }
    }

    fn approve_max(&self, account: &AccountId) {
        self.ledger
            .approve(account, self.pool.custody(), Balance::MAX)
            .unwrap();
    }

    fn user_balances(&self) -> Balance {
        self.ledger
            .holders()
            .into_iter()
            .filter(|(id, _)| id != self.pool.custody())
            .map(|(_, balance)| balance)
            .sum()
    }
}

fn scenario_config() -> StakingConfig {
    StakingConfig {
        min_total_supply: 1_000_000 * ONE_TOKEN,
        stake_min_age: MIN_AGE,
        stake_max_age: MAX_AGE,
        stake_precision: 18,
        annual_interest_rate: ONE_TOKEN / 10,
        ..StakingConfig::default()
    }
}

mod scenario_tests {
    use super::*;

    fn reward_after(elapsed: u64) -> Balance {
        let h = Harness::new(scenario_config());
        h.approve_max(&OWNER);
        h.pool.stake_all(&OWNER).unwrap();

        h.clock.advance(elapsed);
        h.pool.reward(&OWNER).unwrap();
        h.pool.rewards_of(&OWNER)
    }

    #[test]
    fn test_reward_at_max_age() {
        let staked = 1_000_000 * ONE_TOKEN;
        let reward = reward_after(MAX_AGE);

        // balance × (2,592,000 / 31,536,000) × 0.10
        let expected = staked * 2_592_000 / 31_536_000 / 10;
        let diff = reward.abs_diff(expected);
        assert!(diff <= 1, "Reward diff too large: {}", diff);

        // ≈ 0.8219% of the stake
        let basis_points = reward * 1_000_000 / staked;
        assert_eq!(basis_points, 8_219);
    }

    #[test]
    fn test_reward_capped_past_max_age() {
        assert_eq!(reward_after(2 * MAX_AGE), reward_after(MAX_AGE));
        assert_eq!(reward_after(10 * MAX_AGE), reward_after(MAX_AGE));
    }

    #[test]
    fn test_eligibility_floor() {
        let h = Harness::new(scenario_config());
        h.approve_max(&OWNER);
        h.pool.stake_all(&OWNER).unwrap();

        h.clock.advance(MIN_AGE - 1);
        assert_eq!(h.pool.reward(&OWNER).unwrap(), 0);
        assert_eq!(h.pool.rewards_of(&OWNER), 0);
        assert_eq!(h.pool.total_rewards(), 0);

        h.clock.advance(1);
        assert!(h.pool.reward(&OWNER).unwrap() > 0);
    }

    #[test]
    fn test_no_double_reward() {
        let h = Harness::new(scenario_config());
        h.approve_max(&OWNER);
        h.pool.stake_all(&OWNER).unwrap();
        h.clock.advance(5 * DAY);

        let first = h.pool.reward(&OWNER).unwrap();
        let balance = h.ledger.balance_of(&OWNER);

        assert!(first > 0);
        assert_eq!(h.pool.reward(&OWNER).unwrap(), 0);
        assert_eq!(h.ledger.balance_of(&OWNER), balance);
        assert_eq!(h.pool.all_time_rewards_of(&OWNER), first);
    }

    #[test]
    fn test_round_trip_without_elapsed_time() {
        let h = Harness::new(scenario_config());
        h.approve_max(&OWNER);
        let before = h.ledger.balance_of(&OWNER);

        h.pool.stake_all(&OWNER).unwrap();
        let receipt = h.pool.unstake_all(&OWNER).unwrap();

        assert_eq!(receipt.amount, before);
        assert_eq!(receipt.reward, 0);
        assert_eq!(h.ledger.balance_of(&OWNER), before);
        assert_eq!(h.pool.stake_of(&OWNER), 0);
        assert_eq!(h.ledger.total_supply(), before);
    }

    #[test]
    fn test_staggered_entries_accrue_independently() {
        let h = Harness::new(scenario_config());
        h.ledger.transfer(&OWNER, &ALICE, 1000 * ONE_TOKEN).unwrap();
        h.approve_max(&ALICE);

        h.pool.stake_all(&ALICE).unwrap();
        h.clock.advance(40 * DAY);
        h.ledger.transfer(&OWNER, &ALICE, 1000 * ONE_TOKEN).unwrap();
        h.pool.stake_all(&ALICE).unwrap();
        h.clock.advance(10 * DAY);

        // First entry capped at 30 days, second at 10 days
        assert_eq!(h.pool.stake_entries(&ALICE).len(), 2);
        assert_eq!(h.pool.coin_age_of(&ALICE).unwrap(), 1000 * ONE_TOKEN * 40);
    }
}

mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_restake_after_unstake_starts_fresh_baseline() {
        let h = Harness::new(scenario_config());
        h.ledger.transfer(&OWNER, &ALICE, 365 * ONE_TOKEN).unwrap();
        h.approve_max(&ALICE);

        h.pool.stake_all(&ALICE).unwrap();
        h.clock.advance(20 * DAY);
        h.pool.reward(&ALICE).unwrap();
        let receipt = h.pool.unstake_all(&ALICE).unwrap();
        assert_eq!(receipt.reward, 0);
        assert_eq!(h.pool.rewards_of(&ALICE), 0);

        // A new stake must earn from zero, not from the old baseline
        h.pool.stake_all(&ALICE).unwrap();
        h.clock.advance(2 * DAY);
        assert!(h.pool.reward(&ALICE).unwrap() > 0);
    }

    #[test]
    fn test_unstake_settles_unclaimed_reward() {
        let h = Harness::new(scenario_config());
        h.approve_max(&OWNER);
        h.pool.stake_all(&OWNER).unwrap();
        h.clock.advance(MAX_AGE);

        let pending = h.pool.pending_reward_of(&OWNER).unwrap();
        let receipt = h.pool.unstake_all(&OWNER).unwrap();

        assert_eq!(receipt.reward, pending);
        assert_eq!(h.pool.all_time_rewards_of(&OWNER), pending);
        assert_eq!(
            h.ledger.balance_of(&OWNER),
            DEFAULT_MIN_TOTAL_SUPPLY + pending
        );
    }

    #[test]
    fn test_supply_ceiling_clamps_reward_but_allows_unstake() {
        let config = StakingConfig {
            max_total_supply: 1_000_000 * ONE_TOKEN + 5 * ONE_TOKEN,
            ..scenario_config()
        };
        let h = Harness::new(config.clone());
        h.approve_max(&OWNER);
        h.pool.stake_all(&OWNER).unwrap();
        h.clock.advance(MAX_AGE);

        let minted = h.pool.reward(&OWNER).unwrap();
        assert_eq!(minted, 5 * ONE_TOKEN);
        assert_eq!(h.ledger.total_supply(), config.max_total_supply);

        let forfeited = h.pool.events().iter().any(|event| {
            matches!(event, StakingEvent::RewardSettled { forfeited, .. } if *forfeited > 0)
        });
        assert!(forfeited);

        h.clock.advance(DAY);
        let receipt = h.pool.unstake_all(&OWNER).unwrap();
        assert_eq!(receipt.reward, 0);
        assert_eq!(receipt.amount, 1_000_000 * ONE_TOKEN);
        assert_eq!(h.pool.total_rewards(), 5 * ONE_TOKEN);
    }

    #[test]
    fn test_allowance_consumed_by_stake() {
        let h = Harness::new(scenario_config());
        h.ledger.transfer(&OWNER, &BOB, 100 * ONE_TOKEN).unwrap();
        h.ledger
            .approve(&BOB, h.pool.custody(), 100 * ONE_TOKEN)
            .unwrap();

        h.pool.stake_all(&BOB).unwrap();
        assert_eq!(h.ledger.allowance(&BOB, h.pool.custody()), 0);

        h.ledger.transfer(&OWNER, &BOB, ONE_TOKEN).unwrap();
        let result = h.pool.stake_all(&BOB);
        assert!(matches!(
            result,
            Err(StakingError::InsufficientAllowance { .. })
        ));
        assert_eq!(h.pool.stake_of(&BOB), 100 * ONE_TOKEN);
    }

    #[test]
    fn test_event_log_order() {
        let h = Harness::new(scenario_config());
        h.approve_max(&OWNER);
        h.pool.stake_all(&OWNER).unwrap();
        h.clock.advance(3 * DAY);
        h.pool.unstake_all(&OWNER).unwrap();

        let events = h.pool.events();
        assert!(matches!(events[0], StakingEvent::Initialized { .. }));
        assert!(matches!(events[1], StakingEvent::Staked { .. }));
        assert!(matches!(events[2], StakingEvent::RewardSettled { .. }));
        assert!(matches!(events[3], StakingEvent::Unstaked { .. }));
        assert!(events.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
        assert!(events.iter().all(|event| event.account() == &OWNER));
    }

    #[test]
    fn test_ledger_cap_tighter_than_config_ceiling() {
        let cap = 1_000_000 * ONE_TOKEN + ONE_TOKEN;
        let ledger = InMemoryLedger::new("CNG", "Coinage", 18, Some(cap));
        let h = Harness::with_ledger(ledger, StakingConfig::default());
        h.approve_max(&OWNER);
        h.pool.stake_all(&OWNER).unwrap();
        h.clock.advance(MAX_AGE);

        // Reward is clamped to what the ledger can still mint
        assert_eq!(h.pool.reward(&OWNER).unwrap(), ONE_TOKEN);
        assert_eq!(h.ledger.total_supply(), cap);

        // Principal always comes back, even with no room left to mint
        h.clock.advance(365 * DAY);
        let receipt = h.pool.unstake_all(&OWNER).unwrap();
        assert_eq!(receipt.amount, 1_000_000 * ONE_TOKEN);
        assert_eq!(receipt.reward, 0);
        assert_eq!(h.pool.stake_of(&OWNER), 0);
        assert_eq!(h.ledger.balance_of(&OWNER), cap);
    }

    #[test]
    fn test_unstake_under_ledger_cap_without_prior_claim() {
        let cap = 1_000_000 * ONE_TOKEN + ONE_TOKEN;
        let ledger = InMemoryLedger::new("CNG", "Coinage", 18, Some(cap));
        let h = Harness::with_ledger(ledger, StakingConfig::default());
        h.approve_max(&OWNER);
        h.pool.stake_all(&OWNER).unwrap();
        h.clock.advance(MAX_AGE);

        let receipt = h.pool.unstake_all(&OWNER).unwrap();
        assert_eq!(receipt.amount, 1_000_000 * ONE_TOKEN);
        assert_eq!(receipt.reward, ONE_TOKEN);
        assert_eq!(h.ledger.total_supply(), cap);
    }
}

mod property_tests {
    use super::*;

    const ACCOUNTS: [AccountId; 3] = [OWNER, ALICE, BOB];

    #[derive(Clone, Debug)]
    enum Op {
        Stake(usize),
        Unstake(usize),
        Reward(usize),
        Advance(u64),
        Transfer(usize, usize, u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..3usize).prop_map(Op::Stake),
            (0..3usize).prop_map(Op::Unstake),
            (0..3usize).prop_map(Op::Reward),
            (0..5 * DAY).prop_map(Op::Advance),
            (0..3usize, 0..3usize, 1..=100u8).prop_map(|(a, b, pct)| Op::Transfer(a, b, pct)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_conservation_and_monotonicity(ops in prop::collection::vec(op_strategy(), 1..40)) {
            let h = Harness::new(scenario_config());
            let initial_supply = h.ledger.total_supply();
            for account in &ACCOUNTS {
                h.approve_max(account);
            }
            h.ledger.transfer(&OWNER, &ALICE, 300_000 * ONE_TOKEN).unwrap();
            h.ledger.transfer(&OWNER, &BOB, 300_000 * ONE_TOKEN).unwrap();

            let mut all_time = [0 as Balance; 3];
            let mut total = 0 as Balance;

            for op in ops {
                // Precondition failures are expected; state must stay consistent either way
                match op {
                    Op::Stake(i) => { let _ = h.pool.stake_all(&ACCOUNTS[i]); }
                    Op::Unstake(i) => { let _ = h.pool.unstake_all(&ACCOUNTS[i]); }
                    Op::Reward(i) => { h.pool.reward(&ACCOUNTS[i]).unwrap(); }
                    Op::Advance(secs) => { h.clock.advance(secs); }
                    Op::Transfer(from, to, pct) => {
                        let amount = h.ledger.balance_of(&ACCOUNTS[from]) * pct as Balance / 100;
                        h.ledger.transfer(&ACCOUNTS[from], &ACCOUNTS[to], amount).unwrap();
                    }
                }

                let staked = h.pool.total_staked().unwrap();
                prop_assert_eq!(h.ledger.balance_of(h.pool.custody()), staked);
                prop_assert_eq!(h.user_balances() + staked, h.ledger.total_supply());
                prop_assert_eq!(h.ledger.sum_of_balances(), h.ledger.total_supply());

                // Minted rewards match the supply growth exactly
                prop_assert_eq!(h.pool.total_rewards(), h.ledger.total_supply() - initial_supply);

                for (i, account) in ACCOUNTS.iter().enumerate() {
                    let now = h.pool.all_time_rewards_of(account);
                    prop_assert!(now >= all_time[i]);
                    all_time[i] = now;
                    prop_assert!(h.pool.rewards_of(account) <= now);
                }
                let now_total = h.pool.total_rewards();
                prop_assert!(now_total >= total);
                prop_assert_eq!(now_total, all_time.iter().sum::<Balance>());
                total = now_total;
            }
        }

        #[test]
        fn prop_reward_never_exceeds_capped_accrual(
            amount in 1..1_000_000u128,
            elapsed in 0..(4 * MAX_AGE),
        ) {
            let h = Harness::new(scenario_config());
            h.ledger.transfer(&OWNER, &ALICE, amount * ONE_TOKEN).unwrap();
            h.approve_max(&ALICE);
            h.pool.stake_all(&ALICE).unwrap();

            h.clock.advance(elapsed);
            let minted = h.pool.reward(&ALICE).unwrap();

            let capped = amount * ONE_TOKEN * MAX_AGE as u128 / 31_536_000 / 10;
            prop_assert!(minted <= capped + 1);
            if elapsed < MIN_AGE {
                prop_assert_eq!(minted, 0);
            }
        }
    }
}
