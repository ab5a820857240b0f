//! Common Test Utilities for the pool engine
//!
//! Builds a pool over in-memory tokens with a manual clock one year before
//! maturity, plus funding helpers.

#![allow(dead_code)]

use hifi_amm::{HifiPool, InMemoryHToken, InMemoryToken, ManualClock, YieldSpace};
use hifi_types::{Address, U256};

pub const USDC: Address = Address::repeat_byte(0x01);
pub const HUSDC: Address = Address::repeat_byte(0x02);
pub const POOL: Address = Address::repeat_byte(0x99);

pub const ALICE: Address = Address::repeat_byte(0xA1);
pub const BOB: Address = Address::repeat_byte(0xB0);
pub const CAROL: Address = Address::repeat_byte(0xC0);

pub const MATURITY: u64 = 1_700_000_000;
/// 365.25 days
pub const ONE_YEAR: u64 = 31_557_600;

pub type TestPool = HifiPool<InMemoryToken, InMemoryHToken, ManualClock>;

pub struct PoolFixture {
    pub pool: TestPool,
    pub underlying: InMemoryToken,
    pub htoken: InMemoryHToken,
    pub clock: ManualClock,
    pub decimals: u8,
}

impl PoolFixture {
    /// Pool over an underlying with `decimals`, one year before maturity
    pub fn new(decimals: u8) -> Self {
        let underlying = InMemoryToken::new(USDC, "USDC", decimals);
        let htoken = InMemoryHToken::new(HUSDC, "hUSDCJun22", MATURITY, USDC);
        let clock = ManualClock::new(MATURITY - ONE_YEAR);
        let pool = HifiPool::new(
            "Hifi USDC (2022-06-30) Pool",
            "hUSDCJun22LP",
            POOL,
            underlying.clone(),
            htoken.clone(),
            clock.clone(),
            YieldSpace::default(),
        )
        .unwrap();

        Self {
            pool,
            underlying,
            htoken,
            clock,
            decimals,
        }
    }

    pub fn usdc() -> Self {
        Self::new(6)
    }

    /// Whole underlying units in native decimals
    pub fn underlying_units(&self, units: u64) -> U256 {
        U256::from(units) * U256::exp10(self.decimals as usize)
    }

    /// Mint underlying to `account` and approve the pool for all of it
    pub fn fund_underlying(&self, account: Address, amount: U256) {
        self.underlying.mint(account, amount).unwrap();
        self.underlying.approve(account, POOL, U256::MAX);
    }

    /// Mint hTokens to `account` and approve the pool for all of them
    pub fn fund_htoken(&self, account: Address, amount: U256) {
        self.htoken.mint(account, amount).unwrap();
        self.htoken.approve(account, POOL, U256::MAX);
    }

    /// Alice deposits `units` whole underlying into the empty pool
    pub fn bootstrap(&mut self, units: u64) -> U256 {
        let amount = self.underlying_units(units);
        self.fund_underlying(ALICE, amount);
        self.pool.mint(ALICE, amount).unwrap()
    }

    /// Bob sells `units` hTokens so the pool holds real hToken reserves
    pub fn seed_htoken_reserves(&mut self, units: u64) -> U256 {
        let amount = htoken_units(units);
        self.fund_htoken(BOB, amount);
        self.pool.sell_htoken(BOB, BOB, amount).unwrap()
    }

    pub fn underlying_balance(&self, account: Address) -> U256 {
        use hifi_amm::Erc20;
        self.underlying.balance_of(account)
    }

    pub fn htoken_balance(&self, account: Address) -> U256 {
        use hifi_amm::Erc20;
        self.htoken.balance_of(account)
    }
}

/// Whole hTokens (18 decimals)
pub fn htoken_units(units: u64) -> U256 {
    U256::from(units) * U256::exp10(18)
}
