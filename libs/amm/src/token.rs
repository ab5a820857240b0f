//! Token collaborators
//!
//! The pool never stores reserves; it reads live balances and moves tokens
//! through these traits. `InMemoryToken` and `InMemoryHToken` are ledger-free
//! implementations for tests and simulations. Handles are cheap to clone and
//! every clone sees the same balances.

use crate::errors::TokenError;
use hifi_types::{Address, U256};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Fungible token interface consumed by the pool
pub trait Erc20 {
    fn address(&self) -> Address;

    fn decimals(&self) -> u8;

    fn balance_of(&self, account: Address) -> U256;

    /// Move `amount` from the caller `from` to `to`
    fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, spending allowance
    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError>;
}

/// Zero-coupon bond token bound to one maturity
pub trait HToken: Erc20 {
    /// Unix timestamp at which the bond redeems 1:1 for underlying
    fn maturity(&self) -> u64;

    /// Address of the token the bond redeems into
    fn underlying(&self) -> Address;
}

#[derive(Debug, Default)]
struct Ledger {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl Ledger {
    fn balance(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Checks both sides before touching either balance
    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> Result<(), TokenError> {
        let from_balance = self.balance(&from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                account: from,
                balance: from_balance,
                amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow { account: to })?;

        self.balances.insert(from, from_balance - amount);
        self.balances.insert(to, to_balance);
        Ok(())
    }
}

/// In-memory fungible token
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    address: Address,
    symbol: String,
    decimals: u8,
    ledger: Arc<RwLock<Ledger>>,
}

impl InMemoryToken {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
            ledger: Arc::new(RwLock::new(Ledger::default())),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Credit `amount` to `account` out of thin air
    pub fn mint(&self, account: Address, amount: U256) -> Result<(), TokenError> {
        let mut ledger = self.ledger.write();
        let balance = ledger
            .balance(&account)
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow { account })?;
        ledger.balances.insert(account, balance);
        Ok(())
    }

    /// Let `spender` move up to `amount` of `owner`'s tokens; `U256::MAX` never decreases
    pub fn approve(&self, owner: Address, spender: Address, amount: U256) {
        self.ledger.write().allowances.insert((owner, spender), amount);
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger
            .read()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of all balances; individual balances may each approach `U256::MAX`
    pub fn total_supply(&self) -> Result<U256, TokenError> {
        self.ledger
            .read()
            .balances
            .values()
            .try_fold(U256::zero(), |acc, b| acc.checked_add(*b))
            .ok_or(TokenError::SupplyOverflow {
                token: self.address,
            })
    }
}

impl Erc20 for InMemoryToken {
    fn address(&self) -> Address {
        self.address
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.ledger.read().balance(&account)
    }

    fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), TokenError> {
        self.ledger.write().move_balance(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        let mut ledger = self.ledger.write();
        let allowance = ledger
            .allowances
            .get(&(from, spender))
            .copied()
            .unwrap_or_default();
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from,
                spender,
                allowance,
                amount,
            });
        }

        ledger.move_balance(from, to, amount)?;

        if allowance != U256::MAX {
            ledger.allowances.insert((from, spender), allowance - amount);
        }
        Ok(())
    }
}

/// In-memory hToken: an 18-decimal token with a maturity and an underlying
#[derive(Debug, Clone)]
pub struct InMemoryHToken {
    token: InMemoryToken,
    maturity: u64,
    underlying: Address,
}

impl InMemoryHToken {
    pub fn new(address: Address, symbol: impl Into<String>, maturity: u64, underlying: Address) -> Self {
        Self::with_decimals(address, symbol, maturity, underlying, hifi_config::HTOKEN_DECIMALS)
    }

    /// Non-standard decimals, only useful to exercise pool construction checks
    pub fn with_decimals(
        address: Address,
        symbol: impl Into<String>,
        maturity: u64,
        underlying: Address,
        decimals: u8,
    ) -> Self {
        Self {
            token: InMemoryToken::new(address, symbol, decimals),
            maturity,
            underlying,
        }
    }

    /// Underlying token handle for minting and approvals
    pub fn token(&self) -> &InMemoryToken {
        &self.token
    }

    pub fn mint(&self, account: Address, amount: U256) -> Result<(), TokenError> {
        self.token.mint(account, amount)
    }

    pub fn approve(&self, owner: Address, spender: Address, amount: U256) {
        self.token.approve(owner, spender, amount)
    }
}

impl Erc20 for InMemoryHToken {
    fn address(&self) -> Address {
        self.token.address()
    }

    fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.token.balance_of(account)
    }

    fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), TokenError> {
        self.token.transfer(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        self.token.transfer_from(spender, from, to, amount)
    }
}

impl HToken for InMemoryHToken {
    fn maturity(&self) -> u64 {
        self.maturity
    }

    fn underlying(&self) -> Address {
        self.underlying
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::repeat_byte(0xA1);
    const BOB: Address = Address::repeat_byte(0xB0);
    const POOL: Address = Address::repeat_byte(0x99);

    fn usdc() -> InMemoryToken {
        InMemoryToken::new(Address::repeat_byte(0x01), "USDC", 6)
    }

    #[test]
    fn test_transfer_moves_balance() {
        let token = usdc();
        token.mint(ALICE, U256::from(100u8)).unwrap();
        token.transfer(ALICE, BOB, U256::from(40u8)).unwrap();
        assert_eq!(token.balance_of(ALICE), U256::from(60u8));
        assert_eq!(token.balance_of(BOB), U256::from(40u8));
        assert_eq!(token.total_supply(), Ok(U256::from(100u8)));
    }

    #[test]
    fn test_transfer_insufficient_balance_changes_nothing() {
        let token = usdc();
        token.mint(ALICE, U256::from(10u8)).unwrap();
        let err = token.transfer(ALICE, BOB, U256::from(11u8)).unwrap_err();
        assert!(matches!(err, TokenError::InsufficientBalance { .. }));
        assert_eq!(token.balance_of(ALICE), U256::from(10u8));
        assert_eq!(token.balance_of(BOB), U256::zero());
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let token = usdc();
        token.mint(ALICE, U256::from(100u8)).unwrap();
        token.approve(ALICE, POOL, U256::from(50u8));

        token
            .transfer_from(POOL, ALICE, POOL, U256::from(30u8))
            .unwrap();
        assert_eq!(token.allowance(ALICE, POOL), U256::from(20u8));
        assert_eq!(token.balance_of(POOL), U256::from(30u8));

        let err = token
            .transfer_from(POOL, ALICE, POOL, U256::from(21u8))
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientAllowance { .. }));
    }

    #[test]
    fn test_infinite_allowance_not_decremented() {
        let token = usdc();
        token.mint(ALICE, U256::from(100u8)).unwrap();
        token.approve(ALICE, POOL, U256::MAX);
        token
            .transfer_from(POOL, ALICE, BOB, U256::from(100u8))
            .unwrap();
        assert_eq!(token.allowance(ALICE, POOL), U256::MAX);
    }

    #[test]
    fn test_mint_overflow() {
        let token = usdc();
        token.mint(ALICE, U256::MAX).unwrap();
        assert_eq!(
            token.mint(ALICE, U256::one()),
            Err(TokenError::BalanceOverflow { account: ALICE })
        );
    }

    #[test]
    fn test_total_supply_overflow_is_error() {
        let token = usdc();
        token.mint(ALICE, U256::MAX).unwrap();
        assert_eq!(token.total_supply(), Ok(U256::MAX));

        token.mint(BOB, U256::one()).unwrap();
        assert_eq!(
            token.total_supply(),
            Err(TokenError::SupplyOverflow {
                token: Address::repeat_byte(0x01)
            })
        );
    }

    #[test]
    fn test_htoken_metadata() {
        let htoken = InMemoryHToken::new(
            Address::repeat_byte(0x02),
            "hUSDCJun22",
            1_656_633_600,
            Address::repeat_byte(0x01),
        );
        assert_eq!(htoken.decimals(), 18);
        assert_eq!(htoken.maturity(), 1_656_633_600);
        assert_eq!(htoken.underlying(), Address::repeat_byte(0x01));
        assert_eq!(htoken.token().symbol(), "hUSDCJun22");
    }
}
