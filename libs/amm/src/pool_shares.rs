//! Pool-share ledger
//!
//! Liquidity-provider receipts. Only the liquidity engine mints and burns;
//! holders may transfer freely.

use crate::errors::PoolError;
use hifi_types::{Address, U256};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct PoolShares {
    balances: HashMap<Address, U256>,
    total_supply: U256,
}

impl PoolShares {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), PoolError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(PoolError::InsufficientPoolShares {
                provider: from,
                balance,
                amount,
            });
        }
        if from == to {
            return Ok(());
        }
        // Supply bounds every balance, so the credit cannot overflow
        self.balances.insert(from, balance - amount);
        self.balances.insert(to, self.balance_of(to) + amount);
        Ok(())
    }

    pub(crate) fn mint(&mut self, account: Address, amount: U256) -> Result<(), PoolError> {
        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(PoolError::PoolSharesOverflow)?;
        self.total_supply = total_supply;
        self.balances.insert(account, self.balance_of(account) + amount);
        Ok(())
    }

    pub(crate) fn burn(&mut self, account: Address, amount: U256) -> Result<(), PoolError> {
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(PoolError::InsufficientPoolShares {
                provider: account,
                balance,
                amount,
            });
        }
        self.balances.insert(account, balance - amount);
        self.total_supply = self.total_supply - amount;
        Ok(())
    }
}
