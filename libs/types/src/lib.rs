//! # Hifi Types Library
//!
//! Numeric foundation for the Hifi pool engine: 18-decimal fixed-point
//! numbers over 256-bit integers, fractional powers, precision scaling for
//! tokens with fewer than 18 decimals, and account identifiers.
//!
//! ## Design Philosophy
//!
//! - **No Floating Point**: every value is a scaled integer
//! - **Checked Everything**: overflow and underflow are errors, never wrap-around
//! - **Clear Boundaries**: `rust_decimal::Decimal` only at configuration and
//!   display edges
//!
//! ## Quick Start
//!
//! ```rust
//! use hifi_types::{UD60x18, U256};
//!
//! let reserves = UD60x18::from_decimal_str("1000").unwrap();
//! let exponent = UD60x18::from_decimal_str("0.95").unwrap();
//!
//! // 1000^0.95, exponent may be fractional
//! let factor = reserves.pow(exponent).unwrap();
//! assert!(factor < reserves);
//!
//! // Overflow surfaces as an error
//! assert!(UD60x18::MAX.checked_add(UD60x18::ONE).is_err());
//! # let _ = U256::zero();
//! ```

pub mod common;
pub mod precision;

pub use common::{
    mul_div, Address, FixedPointError, SD59x18, UD60x18, ValidationError, I256, SCALE,
};
pub use precision::PrecisionScalar;

/// 256-bit unsigned integers used for every raw amount
pub use primitive_types::U256;
