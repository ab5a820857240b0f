//! Unsigned 18-decimal fixed-point numbers backed by 256-bit integers
//!
//! `UD60x18` stores a real number `r` as the integer `r * 10^18`. Every
//! arithmetic operation is checked: overflow and underflow surface as a
//! [`FixedPointError`] carrying the operands instead of wrapping or saturating.
//!
//! ## Design Principles
//!
//! - **No Precision Loss Beyond Truncation**: multiplication and division go
//!   through a 512-bit intermediate and truncate once
//! - **Overflow Protection**: checked arithmetic with operand-carrying errors
//! - **Clear Boundaries**: explicit conversions to and from `rust_decimal::Decimal`
//!   for configuration and display

use crate::common::errors::FixedPointError;
use crate::common::exp_log;
use crate::common::signed::SD59x18;
use primitive_types::{U256, U512};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 10^18, the number of raw units in one whole fixed-point unit
pub const SCALE: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// 5 * 10^17, one half in fixed point
pub const HALF_SCALE: U256 = U256([500_000_000_000_000_000, 0, 0, 0]);

/// Number of fractional decimal digits
pub const DECIMALS: u32 = 18;

/// Unsigned fixed-point number with 18 decimals
///
/// Examples:
/// - 1.0 = UD60x18(1_000_000_000_000_000_000)
/// - 0.95 = UD60x18(950_000_000_000_000_000)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct UD60x18(U256);

impl UD60x18 {
    /// Zero
    pub const ZERO: Self = Self(U256([0, 0, 0, 0]));

    /// One
    pub const ONE: Self = Self(SCALE);

    /// Maximum representable value
    pub const MAX: Self = Self(U256::MAX);

    /// Wrap an already-scaled integer
    #[inline]
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Get the raw scaled integer value
    #[inline]
    pub const fn raw(self) -> U256 {
        self.0
    }

    /// Scale a whole number up to fixed point
    pub fn from_uint(value: U256) -> Result<Self, FixedPointError> {
        value
            .checked_mul(SCALE)
            .map(Self)
            .ok_or(FixedPointError::FromUintOverflow { value })
    }

    /// Scale a small whole number up to fixed point (cannot overflow)
    pub fn from_u64(value: u64) -> Self {
        Self(U256::from(value) * SCALE)
    }

    /// Truncate to the whole-number part
    pub fn to_uint(self) -> U256 {
        self.0 / SCALE
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    // CHECKED ARITHMETIC

    pub fn checked_add(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(FixedPointError::AddOverflow {
                lhs: self.0,
                rhs: rhs.0,
            })
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(FixedPointError::SubUnderflow {
                lhs: self.0,
                rhs: rhs.0,
            })
    }

    /// Fixed-point product, rounded toward zero
    pub fn checked_mul(self, rhs: Self) -> Result<Self, FixedPointError> {
        mul_div(self.0, rhs.0, SCALE)
            .map(Self)
            .ok_or(FixedPointError::MulOverflow {
                lhs: self.0,
                rhs: rhs.0,
            })
    }

    /// Fixed-point quotient, rounded toward zero
    pub fn checked_div(self, rhs: Self) -> Result<Self, FixedPointError> {
        if rhs.0.is_zero() {
            return Err(FixedPointError::DivisionByZero);
        }
        mul_div(self.0, SCALE, rhs.0)
            .map(Self)
            .ok_or(FixedPointError::DivOverflow {
                lhs: self.0,
                rhs: rhs.0,
            })
    }

    /// Binary logarithm; negative for values below one
    pub fn log2(self) -> Result<SD59x18, FixedPointError> {
        exp_log::log2(self)
    }

    /// Binary exponent `2^self`
    pub fn exp2(self) -> Result<Self, FixedPointError> {
        exp_log::exp2(SD59x18::try_from_unsigned(self)?)
    }

    /// `self^exponent` for fractional exponents
    pub fn pow(self, exponent: Self) -> Result<Self, FixedPointError> {
        exp_log::pow(self, exponent)
    }

    // DECIMAL CONVERSIONS - configuration input and display only

    /// Parse from a decimal string such as "0.95"
    ///
    /// Digits beyond the 18th decimal are truncated.
    pub fn from_decimal_str(s: &str) -> Result<Self, FixedPointError> {
        let decimal = Decimal::from_str(s).map_err(|_| FixedPointError::InvalidDecimal {
            input: s.to_string(),
        })?;
        Self::from_decimal(decimal)
    }

    /// Convert from a `Decimal`, truncating beyond 18 decimals
    pub fn from_decimal(decimal: Decimal) -> Result<Self, FixedPointError> {
        if decimal.is_sign_negative() && !decimal.is_zero() {
            return Err(FixedPointError::NegativeDecimal {
                input: decimal.to_string(),
            });
        }

        let mantissa = U256::from(decimal.mantissa().unsigned_abs());
        let scale = decimal.scale();
        let raw = if scale <= DECIMALS {
            mantissa
                .checked_mul(U256::exp10((DECIMALS - scale) as usize))
                .ok_or(FixedPointError::FromUintOverflow { value: mantissa })?
        } else {
            mantissa / U256::exp10((scale - DECIMALS) as usize)
        };
        Ok(Self(raw))
    }

    /// Convert to a `Decimal` for display or interfacing with configuration
    pub fn to_decimal(self) -> Result<Decimal, FixedPointError> {
        if self.0.bits() > 127 {
            return Err(FixedPointError::DecimalOverflow { value: self.0 });
        }
        Decimal::try_from_i128_with_scale(self.0.low_u128() as i128, DECIMALS)
            .map(|d| d.normalize())
            .map_err(|_| FixedPointError::DecimalOverflow { value: self.0 })
    }
}

/// `floor(x * y / denominator)` through a 512-bit intermediate
///
/// Returns `None` when the denominator is zero or the quotient does not fit
/// into 256 bits.
pub fn mul_div(x: U256, y: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let quotient = x.full_mul(y) / U512::from(denominator);
    U256::try_from(quotient).ok()
}

impl fmt::Display for UD60x18 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let integer = self.0 / SCALE;
        let fraction = (self.0 % SCALE).low_u64();
        if fraction == 0 {
            return write!(f, "{}", integer);
        }
        let digits = format!("{:018}", fraction);
        write!(f, "{}.{}", integer, digits.trim_end_matches('0'))
    }
}

impl FromStr for UD60x18 {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

impl From<U256> for UD60x18 {
    fn from(raw: U256) -> Self {
        Self(raw)
    }
}
