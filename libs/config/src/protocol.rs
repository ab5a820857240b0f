//! Protocol constants for the YieldSpace pricing curve
//!
//! Fee coefficients are stored as raw 18-decimal integers so every crate can
//! lift them into its own fixed-point type without a parsing step.

/// Decimals of every hToken and of normalized underlying amounts
pub const HTOKEN_DECIMALS: u8 = 18;

/// Largest supported underlying decimal count
pub const MAX_UNDERLYING_DECIMALS: u8 = 18;

/// YieldSpace curve parameters
pub mod yield_space {
    use rust_decimal::Decimal;

    /// Fee coefficient applied when underlying flows into the pool (0.95)
    pub const G1_RAW: u128 = 950_000_000_000_000_000;

    /// Fee coefficient applied when hTokens flow into the pool (1 / 0.95)
    pub const G2_RAW: u128 = 1_052_631_578_947_368_421;

    /// Seconds in four years, leap day included: (365 * 4 + 1) * 24 * 60 * 60
    pub const SECONDS_FOUR_YEARS: u64 = 126_230_400;

    /// Longest time to maturity the curve accepts, in seconds
    ///
    /// Keeps `1 - g2 * t` strictly positive.
    pub const CUTOFF_TTM: u64 = 119_836_799;

    /// g1 as a decimal
    pub fn g1() -> Decimal {
        Decimal::from_i128_with_scale(G1_RAW as i128, 18)
    }

    /// g2 as a decimal
    pub fn g2() -> Decimal {
        Decimal::from_i128_with_scale(G2_RAW as i128, 18)
    }
}
