//! Precision Handling for Token Amounts
//!
//! Pool math runs on 18-decimal amounts. Tokens with fewer decimals are scaled
//! up on the way in and back down on the way out.
//!
//! ## Precision Requirements by Asset Type
//!
//! - **USDC**: 6 decimal places, scalar `10^12` (`100 USDC` raw `100_000_000`
//!   normalizes to `100_000_000_000_000_000_000`)
//! - **WBTC**: 8 decimal places, scalar `10^10`
//! - **DAI / hTokens**: 18 decimal places, scalar `1`
//!
//! ## Critical Rules
//!
//! 1. **NO FLOATING POINT**: amounts are integers end to end
//! 2. **Overflow Is An Error**: normalizing never saturates
//! 3. **Rounding Direction Is Explicit**: `denormalize` floors, `denormalize_ceil`
//!    rounds up; callers pick the one that favours the pool

use crate::common::errors::FixedPointError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimals every normalized amount carries
pub const NORMALIZED_DECIMALS: u8 = 18;

/// Multiplier that lifts a token's native precision up to 18 decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrecisionScalar(U256);

impl PrecisionScalar {
    /// Scalar for tokens that already use 18 decimals
    pub const ONE: Self = Self(U256([1, 0, 0, 0]));

    /// Scalar `10^(18 - decimals)` for tokens with 1 to 18 decimals
    pub fn from_decimals(decimals: u8) -> Result<Self, FixedPointError> {
        if decimals == 0 || decimals > NORMALIZED_DECIMALS {
            return Err(FixedPointError::InvalidDecimals { decimals });
        }
        Ok(Self(U256::exp10((NORMALIZED_DECIMALS - decimals) as usize)))
    }

    pub fn value(self) -> U256 {
        self.0
    }

    /// Native amount to 18-decimal amount
    pub fn normalize(self, amount: U256) -> Result<U256, FixedPointError> {
        amount
            .checked_mul(self.0)
            .ok_or(FixedPointError::MulOverflow {
                lhs: amount,
                rhs: self.0,
            })
    }

    /// 18-decimal amount to native amount, rounded down
    pub fn denormalize(self, normalized: U256) -> U256 {
        normalized / self.0
    }

    /// 18-decimal amount to native amount, rounded up
    pub fn denormalize_ceil(self, normalized: U256) -> U256 {
        let (quotient, remainder) = normalized.div_mod(self.0);
        if remainder.is_zero() {
            quotient
        } else {
            quotient + U256::one()
        }
    }
}

impl fmt::Display for PrecisionScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
