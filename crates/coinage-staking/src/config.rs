//! Staking configuration
//!
//! Fixed once the pool is initialized. Loaded from TOML:
//!
//! ```toml
//! min_total_supply = "1000000000000000000000000"
//! max_total_supply = "10000000000000000000000000"
//! stake_min_age = 86400
//! stake_max_age = 2592000
//! stake_precision = 18
//! annual_interest_rate = "100000000000000000"
//! stake_min_amount = "0"
//! ```
//!
//! Token amounts may be written as strings or integers; TOML integers stop at
//! `i64::MAX`, so 18-decimal supplies need the string form.

use crate::constants::*;
use crate::error::StakingError;
use coinage_token::Balance;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Staking parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Supply minted to the owner at initialization
    #[serde(default = "default_min_total_supply", with = "amount")]
    pub min_total_supply: Balance,

    /// Ceiling on total supply; reward mints are clamped to it
    #[serde(default = "default_max_total_supply", with = "amount")]
    pub max_total_supply: Balance,

    /// Seconds an entry must be held before it earns
    #[serde(default = "default_stake_min_age")]
    pub stake_min_age: u64,

    /// Per-entry ceiling on accruing age, seconds
    #[serde(default = "default_stake_max_age")]
    pub stake_max_age: u64,

    /// Fixed-point decimal exponent for `annual_interest_rate`
    #[serde(default = "default_stake_precision")]
    pub stake_precision: u32,

    /// Annual interest scaled by `10^stake_precision` (10% = 0.1 × 10^18)
    #[serde(default = "default_annual_interest_rate", with = "amount")]
    pub annual_interest_rate: u128,

    /// Smallest balance `stake_all` accepts
    #[serde(default, with = "amount")]
    pub stake_min_amount: Balance,
}

fn default_min_total_supply() -> Balance {
    DEFAULT_MIN_TOTAL_SUPPLY
}

fn default_max_total_supply() -> Balance {
    DEFAULT_MAX_TOTAL_SUPPLY
}

fn default_stake_min_age() -> u64 {
    DEFAULT_STAKE_MIN_AGE
}

fn default_stake_max_age() -> u64 {
    DEFAULT_STAKE_MAX_AGE
}

fn default_stake_precision() -> u32 {
    DEFAULT_STAKE_PRECISION
}

fn default_annual_interest_rate() -> u128 {
    DEFAULT_ANNUAL_INTEREST_RATE
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            min_total_supply: DEFAULT_MIN_TOTAL_SUPPLY,
            max_total_supply: DEFAULT_MAX_TOTAL_SUPPLY,
            stake_min_age: DEFAULT_STAKE_MIN_AGE,
            stake_max_age: DEFAULT_STAKE_MAX_AGE,
            stake_precision: DEFAULT_STAKE_PRECISION,
            annual_interest_rate: DEFAULT_ANNUAL_INTEREST_RATE,
            stake_min_amount: 0,
        }
    }
}

impl StakingConfig {
    /// Parse from TOML and validate
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check parameter consistency
    pub fn validate(&self) -> Result<(), StakingError> {
        if self.max_total_supply < self.min_total_supply {
            return Err(StakingError::InvalidConfig(format!(
                "max_total_supply {} is below min_total_supply {}",
                self.max_total_supply, self.min_total_supply
            )));
        }
        if self.stake_max_age == 0 {
            return Err(StakingError::InvalidConfig(
                "stake_max_age must be positive".to_string(),
            ));
        }
        if self.stake_min_age > self.stake_max_age {
            return Err(StakingError::InvalidConfig(format!(
                "stake_min_age {} exceeds stake_max_age {}",
                self.stake_min_age, self.stake_max_age
            )));
        }
        if self.stake_precision > MAX_STAKE_PRECISION {
            return Err(StakingError::InvalidConfig(format!(
                "stake_precision {} exceeds {}",
                self.stake_precision, MAX_STAKE_PRECISION
            )));
        }
        Ok(())
    }

    /// Annual interest as a percentage, for display
    pub fn annual_interest_percent(&self) -> f64 {
        let scale = 10f64.powi(self.stake_precision as i32);
        self.annual_interest_rate as f64 / scale * 100.0
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] StakingError),
}

/// u128 amounts as decimal strings, accepting plain integers on input
mod amount {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative integer or decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(v as u128)
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom(format!("negative amount {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.trim()
                .replace('_', "")
                .parse()
                .map_err(|_| E::custom(format!("invalid amount {:?}", v)))
        }
    }
}
