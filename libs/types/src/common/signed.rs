//! Signed 256-bit integers and signed 18-decimal fixed point
//!
//! `I256` is a sign-magnitude integer restricted to the two's complement range
//! `[-2^255, 2^255 - 1]`, so every value has an exact `int256` counterpart.
//! `SD59x18` wraps it with an implicit scale of 10^18 and is what logarithms of
//! values below one produce.

use crate::common::errors::FixedPointError;
use crate::common::exp_log;
use crate::common::fixed_point::{mul_div, UD60x18, SCALE};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Largest positive magnitude: 2^255 - 1
pub const I256_MAX_MAGNITUDE: U256 = U256([u64::MAX, u64::MAX, u64::MAX, u64::MAX >> 1]);

/// Largest negative magnitude: 2^255
pub const I256_MIN_MAGNITUDE: U256 = U256([0, 0, 0, 1 << 63]);

/// Signed 256-bit integer in sign-magnitude form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct I256 {
    negative: bool,
    magnitude: U256,
}

impl I256 {
    pub const ZERO: Self = Self {
        negative: false,
        magnitude: U256([0, 0, 0, 0]),
    };

    pub const MAX: Self = Self {
        negative: false,
        magnitude: I256_MAX_MAGNITUDE,
    };

    pub const MIN: Self = Self {
        negative: true,
        magnitude: I256_MIN_MAGNITUDE,
    };

    /// Build from sign and magnitude, rejecting values outside the `int256` range
    pub fn from_parts(negative: bool, magnitude: U256) -> Result<Self, FixedPointError> {
        let limit = if negative {
            I256_MIN_MAGNITUDE
        } else {
            I256_MAX_MAGNITUDE
        };
        if magnitude > limit {
            return Err(FixedPointError::CastOverflow { value: magnitude });
        }
        Ok(Self {
            // -0 is normalized to 0
            negative: negative && !magnitude.is_zero(),
            magnitude,
        })
    }

    /// Checked cast from unsigned; fails above 2^255 - 1
    pub fn try_from_unsigned(value: U256) -> Result<Self, FixedPointError> {
        Self::from_parts(false, value)
    }

    /// Negated unsigned amount; fails above 2^255
    pub fn negative_from_unsigned(value: U256) -> Result<Self, FixedPointError> {
        Self::from_parts(true, value)
    }

    pub fn checked_neg(self) -> Result<Self, FixedPointError> {
        Self::from_parts(!self.negative, self.magnitude)
    }

    pub fn is_negative(self) -> bool {
        self.negative
    }

    pub fn is_zero(self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn unsigned_abs(self) -> U256 {
        self.magnitude
    }

    /// Unsigned value of a non-negative integer
    pub fn to_unsigned(self) -> Result<U256, FixedPointError> {
        if self.negative {
            return Err(FixedPointError::NegativeToUnsigned {
                magnitude: self.magnitude,
            });
        }
        Ok(self.magnitude)
    }
}

impl TryFrom<U256> for I256 {
    type Error = FixedPointError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        Self::try_from_unsigned(value)
    }
}

impl PartialOrd for I256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for I256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
        }
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

/// Signed fixed-point number with 18 decimals
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SD59x18(I256);

impl SD59x18 {
    pub const ZERO: Self = Self(I256::ZERO);

    pub const ONE: Self = Self(I256 {
        negative: false,
        magnitude: SCALE,
    });

    pub const fn from_raw(raw: I256) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> I256 {
        self.0
    }

    pub fn from_parts(negative: bool, magnitude: U256) -> Result<Self, FixedPointError> {
        I256::from_parts(negative, magnitude).map(Self)
    }

    /// Checked cast from unsigned fixed point
    pub fn try_from_unsigned(value: UD60x18) -> Result<Self, FixedPointError> {
        I256::try_from_unsigned(value.raw()).map(Self)
    }

    pub fn is_negative(self) -> bool {
        self.0.is_negative()
    }

    pub fn abs(self) -> UD60x18 {
        UD60x18::from_raw(self.0.unsigned_abs())
    }

    /// Fixed-point product with an unsigned factor, rounded toward zero
    pub fn checked_mul_unsigned(self, rhs: UD60x18) -> Result<Self, FixedPointError> {
        let overflow = FixedPointError::MulOverflow {
            lhs: self.0.unsigned_abs(),
            rhs: rhs.raw(),
        };
        let magnitude = mul_div(self.0.unsigned_abs(), rhs.raw(), SCALE).ok_or(overflow.clone())?;
        Self::from_parts(self.is_negative(), magnitude).map_err(|_| overflow)
    }

    /// Binary exponent `2^self`
    pub fn exp2(self) -> Result<UD60x18, FixedPointError> {
        exp_log::exp2(self)
    }

    pub fn to_unsigned(self) -> Result<UD60x18, FixedPointError> {
        self.0.to_unsigned().map(UD60x18::from_raw)
    }
}

impl fmt::Display for SD59x18 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}", self.abs())
        } else {
            write!(f, "{}", self.abs())
        }
    }
}
