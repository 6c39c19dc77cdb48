//! Coinage CLI
//!
//! Inspect staking parameters, quote rewards and run time-advanced staking
//! simulations against an in-memory ledger.

use anyhow::Context;
use clap::{Parser, Subcommand};
use coinage_staking::{
    AccountId, Balance, CoinAgeCalculator, InterestRate, ManualClock, StakeEntry, StakingConfig,
    StakingPool, TokenLedger, ONE_TOKEN, SECONDS_PER_DAY, SYMBOL,
};
use coinage_token::InMemoryLedger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Simulation start: 2023-11-14T22:13:20Z
const SIMULATION_START: u64 = 1_700_000_000;

#[derive(Parser)]
#[command(name = "coinage")]
#[command(author = "Coinage Contributors")]
#[command(version)]
#[command(about = "Coinage - coin-age proof-of-stake rewards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Staking configuration file (TOML); defaults apply when omitted
    #[arg(short, long, global = true, env = "COINAGE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective staking configuration
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Quote the reward for a single stake held for a number of days
    Quote {
        /// Stake in whole tokens
        amount: u128,

        /// Days held
        days: u64,
    },

    /// Run a staking simulation on an in-memory ledger
    Simulate {
        /// Number of stakers sharing the initial supply
        #[arg(short, long, default_value = "3")]
        stakers: u32,

        /// Simulated days
        #[arg(short, long, default_value = "60")]
        days: u64,

        /// Claim rewards every N days (0 = only at unstake)
        #[arg(short, long, default_value = "7")]
        reward_every: u64,

        /// Print the final pool snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Version information
    Version,
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false),
        )
        .init();
}

fn expand_path(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StakingConfig> {
    match path {
        Some(path) => {
            let path = expand_path(path);
            tracing::debug!("Loading config from {:?}", path);
            StakingConfig::load(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(StakingConfig::default()),
    }
}

/// Render a smallest-unit amount as tokens with six decimals
fn format_tokens(amount: Balance) -> String {
    let whole = amount / ONE_TOKEN;
    let micros = amount % ONE_TOKEN / (ONE_TOKEN / 1_000_000);
    format!("{}.{:06} {}", whole, micros, SYMBOL)
}

fn account_id(label: &str) -> AccountId {
    *blake3::hash(format!("coinage/sim/{}", label).as_bytes()).as_bytes()
}

fn quote(config: &StakingConfig, amount: u128, days: u64) -> anyhow::Result<()> {
    let amount = amount
        .checked_mul(ONE_TOKEN)
        .context("amount too large")?;
    let held = days
        .checked_mul(SECONDS_PER_DAY)
        .context("duration too large")?;

    let entry = StakeEntry {
        amount,
        timestamp: 0,
    };
    let calculator = CoinAgeCalculator::from_config(config);
    let coin_age = calculator.coin_age(&[entry], held)?;
    let reward = InterestRate::from_config(config).reward_for(coin_age)?;

    let counted_days = calculator
        .effective_age(&entry, held)
        .map(|age| age / SECONDS_PER_DAY)
        .unwrap_or(0);

    println!("Stake:        {}", format_tokens(amount));
    println!("Held:         {} days ({} counted)", days, counted_days);
    println!("Annual rate:  {:.4}%", config.annual_interest_percent());
    println!("Coin-days:    {}", format_tokens(coin_age));
    println!("Reward:       {}", format_tokens(reward));
    if amount > 0 {
        println!(
            "Yield:        {:.4}%",
            reward as f64 / amount as f64 * 100.0
        );
    }
    Ok(())
}

fn simulate(
    config: StakingConfig,
    stakers: u32,
    days: u64,
    reward_every: u64,
    json: bool,
) -> anyhow::Result<()> {
    anyhow::ensure!(stakers > 0, "at least one staker is required");

    let ledger = Arc::new(InMemoryLedger::default());
    let clock = Arc::new(ManualClock::new(SIMULATION_START));
    let owner = account_id("owner");
    let pool = StakingPool::new(owner, ledger.clone(), clock.clone());
    pool.initialize(&owner, config)?;

    let accounts: Vec<AccountId> = (0..stakers)
        .map(|i| account_id(&format!("staker/{}", i)))
        .collect();
    let share = ledger.balance_of(&owner) / stakers as Balance;
    for account in &accounts {
        ledger.transfer(&owner, account, share)?;
        ledger.approve(account, pool.custody(), share)?;
        pool.stake_all(account)?;
    }
    tracing::info!(stakers, share = %format_tokens(share), "Stakes opened");

    for day in 1..=days {
        clock.advance(SECONDS_PER_DAY);
        if reward_every > 0 && day % reward_every == 0 {
            for account in &accounts {
                pool.reward(account)?;
            }
        }
    }

    let mut returned = 0;
    let mut final_rewards = 0;
    for account in &accounts {
        let receipt = pool.unstake_all(account)?;
        returned += receipt.amount;
        final_rewards += receipt.reward;
    }

    if json {
        let snapshot = pool.snapshot()?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Simulated {} days with {} stakers", days, stakers);
    println!("");
    for (i, account) in accounts.iter().enumerate() {
        println!(
            "  staker {} ({}…): balance {}, rewards {}",
            i,
            &hex::encode(account)[..8],
            format_tokens(ledger.balance_of(account)),
            format_tokens(pool.all_time_rewards_of(account)),
        );
    }
    println!("");
    println!("Returned stake:   {}", format_tokens(returned));
    println!("Rewards at exit:  {}", format_tokens(final_rewards));
    println!("Total rewards:    {}", format_tokens(pool.total_rewards()));
    println!("Total supply:     {}", format_tokens(ledger.total_supply()));
    println!("Events recorded:  {}", pool.events().len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Config { output } => {
            let rendered = config.to_toml_string()?;
            match output {
                Some(path) => {
                    let path = expand_path(&path);
                    std::fs::write(&path, &rendered)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", rendered),
            }
        }

        Commands::Quote { amount, days } => quote(&config, amount, days)?,

        Commands::Simulate {
            stakers,
            days,
            reward_every,
            json,
        } => simulate(config, stakers, days, reward_every, json)?,

        Commands::Version => {
            println!("Coinage v{}", env!("CARGO_PKG_VERSION"));
            println!("");
            println!("Features:");
            println!("  - Coin-age proof-of-stake rewards");
            println!("  - Per-entry minimum and maximum age");
            println!("  - Supply ceiling with reward clamping");
        }
    }

    Ok(())
}
