//! Error types for fixed-point arithmetic and identifier parsing
//!
//! Every failure carries the operands that caused it so callers can surface
//! the exact condition instead of a generic arithmetic trap.

use primitive_types::U256;
use thiserror::Error;

/// Errors that can occur during fixed-point arithmetic operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    /// Sum exceeds the maximum representable value
    #[error("Overflow: {lhs} + {rhs} exceeds maximum representable value")]
    AddOverflow { lhs: U256, rhs: U256 },

    /// Difference would be negative
    #[error("Underflow: {lhs} - {rhs} is below zero")]
    SubUnderflow { lhs: U256, rhs: U256 },

    /// Product exceeds the maximum representable value
    #[error("Overflow: {lhs} * {rhs} exceeds maximum representable value")]
    MulOverflow { lhs: U256, rhs: U256 },

    /// Quotient exceeds the maximum representable value
    #[error("Overflow: {lhs} / {rhs} exceeds maximum representable value")]
    DivOverflow { lhs: U256, rhs: U256 },

    /// Division by zero in fixed-point arithmetic
    #[error("Division by zero in fixed-point arithmetic")]
    DivisionByZero,

    /// Integer too large to be scaled into fixed point
    #[error("Overflow: integer {value} cannot be scaled to 18 decimals")]
    FromUintOverflow { value: U256 },

    /// Logarithm of zero is undefined
    #[error("Logarithm input must be greater than zero")]
    LogInputZero,

    /// Binary exponent too large for a 256-bit result
    #[error("Overflow: exp2 input {input} must be less than 192e18")]
    Exp2InputTooBig { input: U256 },

    /// Power result exceeds the maximum representable value
    #[error("Overflow: pow({base}, {exponent}) exceeds maximum representable value")]
    PowOverflow { base: U256, exponent: U256 },

    /// Unsigned value does not fit into the signed 256-bit range
    #[error("Cast overflow: {value} does not fit into a signed 256-bit integer")]
    CastOverflow { value: U256 },

    /// Negative value where an unsigned one was required
    #[error("Cast underflow: negative value -{magnitude} cannot be unsigned")]
    NegativeToUnsigned { magnitude: U256 },

    /// Token decimals outside the supported range
    #[error("Invalid decimals {decimals}: expected 1..=18")]
    InvalidDecimals { decimals: u8 },

    /// Invalid decimal string format
    #[error("Invalid decimal string: '{input}' - expected numeric format")]
    InvalidDecimal { input: String },

    /// Negative decimal where an unsigned fixed-point value was required
    #[error("Negative decimal {input} cannot be represented as unsigned fixed point")]
    NegativeDecimal { input: String },

    /// Value does not fit into the 96-bit decimal mantissa
    #[error("Value {value} exceeds the decimal representation range")]
    DecimalOverflow { value: U256 },
}

/// Errors that can occur while parsing account identifiers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input is not valid hex
    #[error("Invalid hex '{input}': {reason}")]
    InvalidHex { input: String, reason: String },

    /// Decoded bytes have the wrong length
    #[error("Invalid identifier length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
