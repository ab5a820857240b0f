//! Reserve accounting
//!
//! Reserves are derived from live balances on every call and never cached:
//!
//! - normalized underlying = underlying balance * precision scalar
//! - virtual hToken = hToken balance + pool-share supply
//!
//! The virtual figure is what the solver prices against. Outstanding shares
//! count as hToken liquidity so the pool cannot be priced into a state where
//! shares could no longer redeem their proportional hTokens.

use crate::errors::PoolError;
use crate::token::Erc20;
use hifi_types::{Address, PrecisionScalar, UD60x18, U256};

/// Curve inputs, both 18-decimal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserves {
    pub normalized_underlying: UD60x18,
    pub virtual_htoken: UD60x18,
}

/// Underlying custody scaled to 18 decimals; overflow is an error
pub fn normalized_underlying_reserves<U: Erc20 + ?Sized>(
    pool: Address,
    underlying: &U,
    scalar: PrecisionScalar,
) -> Result<UD60x18, PoolError> {
    let balance = underlying.balance_of(pool);
    scalar
        .normalize(balance)
        .map(UD60x18::from_raw)
        .map_err(|_| PoolError::UnderlyingReservesOverflow {
            balance,
            scalar: scalar.value(),
        })
}

/// hToken custody plus pool-share supply; overflow is an error
pub fn virtual_htoken_reserves<H: Erc20 + ?Sized>(
    pool: Address,
    htoken: &H,
    total_pool_shares: U256,
) -> Result<UD60x18, PoolError> {
    let balance = htoken.balance_of(pool);
    balance
        .checked_add(total_pool_shares)
        .map(UD60x18::from_raw)
        .ok_or(PoolError::VirtualHTokenReservesOverflow {
            balance,
            supply: total_pool_shares,
        })
}

/// Both curve inputs from the collaborator handles
pub fn reserves<U: Erc20 + ?Sized, H: Erc20 + ?Sized>(
    pool: Address,
    underlying: &U,
    htoken: &H,
    scalar: PrecisionScalar,
    total_pool_shares: U256,
) -> Result<Reserves, PoolError> {
    Ok(Reserves {
        normalized_underlying: normalized_underlying_reserves(pool, underlying, scalar)?,
        virtual_htoken: virtual_htoken_reserves(pool, htoken, total_pool_shares)?,
    })
}
