//! # In-Memory Ledger
//!
//! Reference [`TokenLedger`] backed by lock-protected hash maps. Used by the
//! CLI simulator and by the staking test suites.

use crate::{AccountId, Balance, LedgerError, TokenLedger};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token definition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token symbol (e.g., "CNG")
    pub symbol: String,

    /// Full name
    pub name: String,

    /// Decimal places (e.g., 18 for ETH-like)
    pub decimals: u8,

    /// Total supply (current)
    pub total_supply: Balance,

    /// Maximum supply (None = unlimited)
    pub max_supply: Option<Balance>,
}

/// Account with balance and granted allowances
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Account {
    /// Spendable balance
    pub balance: Balance,

    /// Allowances granted by this account, keyed by spender
    pub allowances: HashMap<AccountId, Balance>,
}

impl Account {
    /// Allowance granted to `spender`
    pub fn allowance(&self, spender: &AccountId) -> Balance {
        self.allowances.get(spender).copied().unwrap_or(0)
    }
}

/// In-memory token ledger
pub struct InMemoryLedger {
    /// Token metadata and supply counters
    token: RwLock<TokenInfo>,

    /// Account state
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryLedger {
    /// Create an empty ledger for a token
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
        max_supply: Option<Balance>,
    ) -> Self {
        Self {
            token: RwLock::new(TokenInfo {
                symbol: symbol.into(),
                name: name.into(),
                decimals,
                total_supply: 0,
                max_supply,
            }),
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Token info snapshot
    pub fn token(&self) -> TokenInfo {
        self.token.read().clone()
    }

    /// All accounts holding a non-zero balance
    pub fn holders(&self) -> Vec<(AccountId, Balance)> {
        self.accounts
            .read()
            .iter()
            .filter(|(_, acc)| acc.balance > 0)
            .map(|(id, acc)| (*id, acc.balance))
            .collect()
    }

    /// Sum of every balance; equals `total_supply` while the ledger is consistent
    pub fn sum_of_balances(&self) -> Balance {
        self.accounts.read().values().map(|acc| acc.balance).sum()
    }

    // === Internal helpers ===

    fn move_funds(
        accounts: &mut HashMap<AccountId, Account>,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> Result<(), LedgerError> {
        let available = accounts.get(from).map(|acc| acc.balance).unwrap_or(0);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                required: amount,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }

        // Check the credit side first so a failure leaves both accounts untouched
        let credited = accounts
            .get(to)
            .map(|acc| acc.balance)
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        if let Some(acc) = accounts.get_mut(from) {
            acc.balance = available - amount;
        }
        accounts.entry(*to).or_default().balance = credited;
        Ok(())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new("CNG", "Coinage", 18, None)
    }
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, account: &AccountId) -> Balance {
        self.accounts
            .read()
            .get(account)
            .map(|acc| acc.balance)
            .unwrap_or(0)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Balance {
        self.accounts
            .read()
            .get(owner)
            .map(|acc| acc.allowance(spender))
            .unwrap_or(0)
    }

    fn approve(
        &self,
        owner: &AccountId,
        spender: &AccountId,
        amount: Balance,
    ) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.write();
        accounts
            .entry(*owner)
            .or_default()
            .allowances
            .insert(*spender, amount);
        Ok(())
    }

    fn transfer(&self, from: &AccountId, to: &AccountId, amount: Balance) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.write();
        Self::move_funds(&mut accounts, from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.write();

        let approved = accounts
            .get(from)
            .map(|acc| acc.allowance(spender))
            .unwrap_or(0);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance {
                approved,
                required: amount,
            });
        }

        Self::move_funds(&mut accounts, from, to, amount)?;

        if let Some(acc) = accounts.get_mut(from) {
            acc.allowances.insert(*spender, approved - amount);
        }
        Ok(())
    }

    fn mint(&self, to: &AccountId, amount: Balance) -> Result<(), LedgerError> {
        let mut token = self.token.write();

        let new_supply = token
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        if let Some(max_supply) = token.max_supply {
            if new_supply > max_supply {
                return Err(LedgerError::ExceedsMaxSupply { amount, max_supply });
            }
        }

        // Supply lock is still held, so balances and supply move together
        let mut accounts = self.accounts.write();
        let acc = accounts.entry(*to).or_default();
        acc.balance = acc.balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        token.total_supply = new_supply;

        tracing::debug!(amount, total_supply = new_supply, "Minted {}", token.symbol);
        Ok(())
    }

    fn total_supply(&self) -> Balance {
        self.token.read().total_supply
    }

    fn max_supply(&self) -> Option<Balance> {
        self.token.read().max_supply
    }
}
