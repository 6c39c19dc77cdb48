//! # Coinage Token - Ledger Primitives
//!
//! Fungible balance bookkeeping that the staking engine builds on.
//!
//! ## Operations
//!
//! | Operation | Effect | Fails when |
//! |-----------|--------|------------|
//! | `transfer` | Move `amount` from `from` to `to` | Sender balance too low |
//! | `approve` | Set `spender` allowance over `owner` funds | - |
//! | `transfer_from` | Spend allowance to move funds | Allowance or balance too low |
//! | `mint` | Credit `to` and grow total supply | Supply cap exceeded |
//!
//! The staking engine only sees the [`TokenLedger`] trait, so any backing
//! store with these contracts can stand in for [`InMemoryLedger`].
//!
//! Invariant: total supply always equals the sum of all balances.

pub mod memory;

pub use memory::{Account, InMemoryLedger, TokenInfo};

/// Account identifier (32-byte address)
pub type AccountId = [u8; 32];

/// Token quantity in smallest units (u128 for 18-decimal tokens)
pub type Balance = u128;

/// Fungible ledger operations consumed by the staking engine.
///
/// All methods take `&self`; implementations synchronise internally so a
/// ledger can be shared behind an `Arc` between the staking pool and
/// ordinary token users.
pub trait TokenLedger: Send + Sync {
    /// Balance held by `account` (0 for unknown accounts)
    fn balance_of(&self, account: &AccountId) -> Balance;

    /// Remaining amount `spender` may move out of `owner`
    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Balance;

    /// Set the allowance of `spender` over `owner` funds to exactly `amount`
    fn approve(&self, owner: &AccountId, spender: &AccountId, amount: Balance)
        -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to`
    fn transfer(&self, from: &AccountId, to: &AccountId, amount: Balance)
        -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance
    fn transfer_from(
        &self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> Result<(), LedgerError>;

    /// Create `amount` new tokens credited to `to`
    fn mint(&self, to: &AccountId, amount: Balance) -> Result<(), LedgerError>;

    /// Current total supply
    fn total_supply(&self) -> Balance;

    /// Cap enforced by `mint`, if any
    fn max_supply(&self) -> Option<Balance>;
}

/// Ledger errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Balance, required: Balance },

    #[error("Insufficient allowance: approved {approved}, required {required}")]
    InsufficientAllowance { approved: Balance, required: Balance },

    #[error("Mint of {amount} exceeds maximum supply {max_supply}")]
    ExceedsMaxSupply { amount: Balance, max_supply: Balance },

    #[error("Balance arithmetic overflow")]
    Overflow,
}
