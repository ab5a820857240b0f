//! # Hifi AMM - YieldSpace Pricing Engine
//!
//! ## Purpose
//!
//! Bonding-curve market for trading fixed-maturity hTokens against their
//! underlying. Prices follow the power-sum invariant `U^a + H^a = k` whose
//! exponent decays toward one as maturity approaches, so the exchange rate
//! converges to the 1:1 redemption value.
//!
//! ## Components
//!
//! - [`yield_space`]: exponent calculator and the single parameterized
//!   invariant solver behind all four trade shapes
//! - [`reserves`]: normalized underlying and virtual hToken reserves, derived
//!   from live balances on every call
//! - [`pool`]: liquidity provision (mint/burn), trade execution, quotes
//! - [`token`]: token collaborator traits plus in-memory implementations
//! - [`registry`]: one pool per hToken
//!
//! ## Example
//!
//! ```rust
//! use hifi_amm::{Erc20, HifiPool, InMemoryHToken, InMemoryToken, ManualClock, YieldSpace};
//! use hifi_types::{Address, U256};
//!
//! let usdc = InMemoryToken::new(Address::repeat_byte(1), "USDC", 6);
//! let husdc = InMemoryHToken::new(Address::repeat_byte(2), "hUSDC", 1_700_000_000, usdc.address());
//! let clock = ManualClock::new(1_690_000_000);
//! let pool_address = Address::repeat_byte(9);
//! let mut pool = HifiPool::new(
//!     "Hifi USDC Pool", "hUSDC-LP", pool_address,
//!     usdc.clone(), husdc, clock, YieldSpace::default(),
//! ).unwrap();
//!
//! let alice = Address::repeat_byte(0xA1);
//! let deposit = U256::from(1_000_000_000u64); // 1000 USDC
//! usdc.mint(alice, deposit).unwrap();
//! usdc.approve(alice, pool_address, deposit);
//!
//! let shares = pool.mint(alice, deposit).unwrap();
//! assert_eq!(shares, pool.get_normalized_underlying_reserves().unwrap());
//! ```

pub mod clock;
pub mod errors;
pub mod events;
pub mod pool;
pub mod pool_shares;
pub mod registry;
pub mod reserves;
pub mod token;
pub mod yield_space;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{PoolError, RegistryError, TokenError, YieldSpaceError};
pub use events::PoolEvent;
pub use pool::HifiPool;
pub use pool_shares::PoolShares;
pub use registry::PoolRegistry;
pub use reserves::Reserves;
pub use token::{Erc20, HToken, InMemoryHToken, InMemoryToken};
pub use yield_space::{TradeDirection, YieldSpace};
