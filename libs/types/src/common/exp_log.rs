//! Binary logarithm, binary exponent and fractional powers for 18-decimal
//! fixed point
//!
//! `pow(x, y)` is computed as `exp2(log2(x) * y)`:
//!
//! - `log2` takes the integer part from the most significant bit and produces
//!   the fractional bits one at a time by repeated squaring.
//! - `exp2` splits its input into integer and fractional parts. The fractional
//!   part is converted to 64 binary digits and each set digit `i` multiplies the
//!   accumulator by `2^(2^-i)`. Those factors are kept with 128 fractional bits
//!   and derived once, by repeated square roots of two.
//!
//! Both sides are exact for integers and powers of two. Every out-of-range
//! input is an error, never a clamped value.

use crate::common::errors::FixedPointError;
use crate::common::fixed_point::{UD60x18, HALF_SCALE, SCALE};
use crate::common::signed::SD59x18;
use once_cell::sync::Lazy;
use primitive_types::{U256, U512};

/// exp2 is defined for inputs strictly below 192 (result stays below 2^256)
pub const EXP2_MAX_INPUT: U256 = U256([7_532_559_262_904_483_840, 10, 0, 0]);

/// Fractional binary digits consumed by exp2
const FRACTION_BITS: usize = 64;

/// Q128 fixed-point one
const Q128_SHIFT: usize = 128;

/// `2^(2^-i)` for `i = 1..=64`, with 128 fractional bits
static EXP2_FACTORS: Lazy<[U256; FRACTION_BITS]> = Lazy::new(|| {
    let mut factors = [U256::zero(); FRACTION_BITS];
    // 2.0 in Q128
    let mut current = U512::from(2u8) << Q128_SHIFT;
    for factor in factors.iter_mut() {
        current = (current << Q128_SHIFT).integer_sqrt();
        *factor = low_u256(current);
    }
    factors
});

/// Binary logarithm of an unsigned fixed-point number
pub fn log2(x: UD60x18) -> Result<SD59x18, FixedPointError> {
    let raw = x.raw();
    if raw.is_zero() {
        return Err(FixedPointError::LogInputZero);
    }

    if raw >= SCALE {
        return SD59x18::from_parts(false, log2_at_least_one(raw));
    }

    // log2(x) = -log2(1/x)
    let inverse = (SCALE * SCALE) / raw;
    SD59x18::from_parts(true, log2_at_least_one(inverse))
}

/// Binary exponent of a signed fixed-point number
///
/// Fails for inputs of 192 or more. Results smaller than 10^-18 truncate to
/// zero.
pub fn exp2(x: SD59x18) -> Result<UD60x18, FixedPointError> {
    let magnitude = x.abs().raw();

    if x.is_negative() {
        if magnitude >= EXP2_MAX_INPUT {
            return Ok(UD60x18::ZERO);
        }
        // 2^-x = 1 / 2^x
        let positive = exp2_unsigned(magnitude);
        return Ok(UD60x18::from_raw((SCALE * SCALE) / positive));
    }

    if magnitude >= EXP2_MAX_INPUT {
        return Err(FixedPointError::Exp2InputTooBig { input: magnitude });
    }
    Ok(UD60x18::from_raw(exp2_unsigned(magnitude)))
}

/// `base^exponent` with a fractional exponent
pub fn pow(base: UD60x18, exponent: UD60x18) -> Result<UD60x18, FixedPointError> {
    if base.is_zero() {
        return Ok(if exponent.is_zero() {
            UD60x18::ONE
        } else {
            UD60x18::ZERO
        });
    }
    if exponent.is_zero() || base == UD60x18::ONE {
        return Ok(UD60x18::ONE);
    }
    if exponent == UD60x18::ONE {
        return Ok(base);
    }

    let overflow = || FixedPointError::PowOverflow {
        base: base.raw(),
        exponent: exponent.raw(),
    };
    let product = log2(base)?
        .checked_mul_unsigned(exponent)
        .map_err(|_| overflow())?;
    exp2(product).map_err(|_| overflow())
}

/// log2 for raw values of at least 10^18 (non-negative logarithms)
fn log2_at_least_one(x: U256) -> U256 {
    // Integer part: floor(log2(x / SCALE))
    let n = most_significant_bit(x / SCALE);
    let mut result = U256::from(n) * SCALE;

    // y is in [1, 2)
    let mut y = x >> n;
    if y == SCALE {
        return result;
    }

    let double_scale = SCALE << 1;
    let mut delta = HALF_SCALE;
    while !delta.is_zero() {
        y = (y * y) / SCALE;
        if y >= double_scale {
            result = result + delta;
            y = y >> 1;
        }
        delta = delta >> 1;
    }
    result
}

/// 2^x for raw inputs below 192 * 10^18
fn exp2_unsigned(x: U256) -> U256 {
    let integer = (x / SCALE).as_usize();
    let fraction = x % SCALE;
    let fraction_bits = (fraction << FRACTION_BITS) / SCALE;

    let mut accumulator = U256::one() << Q128_SHIFT;
    for (i, factor) in EXP2_FACTORS.iter().enumerate() {
        if fraction_bits.bit(FRACTION_BITS - 1 - i) {
            accumulator = mul_q128(accumulator, *factor);
        }
    }

    // accumulator is in [1, 2) with 128 fractional bits
    let scaled = accumulator * SCALE;
    if integer >= Q128_SHIFT {
        scaled << (integer - Q128_SHIFT)
    } else {
        scaled >> (Q128_SHIFT - integer)
    }
}

fn mul_q128(a: U256, b: U256) -> U256 {
    low_u256(a.full_mul(b) >> Q128_SHIFT)
}

/// Lower 256 bits; callers guarantee the value fits
fn low_u256(value: U512) -> U256 {
    let U512(words) = value;
    U256([words[0], words[1], words[2], words[3]])
}

fn most_significant_bit(x: U256) -> usize {
    x.bits() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ud(s: &str) -> UD60x18 {
        UD60x18::from_decimal_str(s).unwrap()
    }

    /// |actual - expected| <= expected * tolerance
    fn assert_close(actual: UD60x18, expected: UD60x18, tolerance: &str) {
        let diff = if actual > expected {
            actual.checked_sub(expected).unwrap()
        } else {
            expected.checked_sub(actual).unwrap()
        };
        let bound = expected.checked_mul(ud(tolerance)).unwrap();
        assert!(
            diff <= bound,
            "expected {} got {} (diff {}, bound {})",
            expected,
            actual,
            diff,
            bound
        );
    }

    #[test]
    fn test_log2_exact_powers_of_two() {
        assert_eq!(log2(UD60x18::ONE).unwrap(), SD59x18::ZERO);
        assert_eq!(log2(ud("8")).unwrap().to_string(), "3");
        assert_eq!(log2(ud("1024")).unwrap().to_string(), "10");
        assert_eq!(log2(ud("0.5")).unwrap().to_string(), "-1");
        assert_eq!(log2(ud("0.125")).unwrap().to_string(), "-3");
    }

    #[test]
    fn test_log2_fractional() {
        // log2(3) = 1.584962500721156181...
        let result = log2(ud("3")).unwrap();
        assert!(!result.is_negative());
        assert_close(result.abs(), ud("1.584962500721156181"), "0.000000000000001");
    }

    #[test]
    fn test_log2_zero_rejected() {
        assert_eq!(log2(UD60x18::ZERO), Err(FixedPointError::LogInputZero));
    }

    #[test]
    fn test_exp2_integers_exact() {
        assert_eq!(exp2(SD59x18::ZERO).unwrap(), UD60x18::ONE);
        assert_eq!(exp2(SD59x18::try_from_unsigned(ud("3")).unwrap()).unwrap(), ud("8"));
        let minus_one = SD59x18::from_parts(true, SCALE).unwrap();
        assert_eq!(exp2(minus_one).unwrap(), ud("0.5"));
    }

    #[test]
    fn test_exp2_half() {
        // sqrt(2) = 1.414213562373095048801...
        let result = ud("0.5").exp2().unwrap();
        assert_close(result, ud("1.414213562373095048"), "0.000000000000000003");
    }

    #[test]
    fn test_exp2_bounds() {
        assert!(matches!(
            ud("192").exp2(),
            Err(FixedPointError::Exp2InputTooBig { .. })
        ));
        assert!(ud("191.999").exp2().is_ok());

        let very_negative = SD59x18::from_parts(true, SCALE * U256::from(200u8)).unwrap();
        assert_eq!(exp2(very_negative).unwrap(), UD60x18::ZERO);
    }

    #[test]
    fn test_pow_special_cases() {
        assert_eq!(pow(UD60x18::ZERO, UD60x18::ZERO).unwrap(), UD60x18::ONE);
        assert_eq!(pow(UD60x18::ZERO, ud("0.5")).unwrap(), UD60x18::ZERO);
        assert_eq!(pow(ud("123.456"), UD60x18::ZERO).unwrap(), UD60x18::ONE);
        assert_eq!(pow(UD60x18::ONE, ud("77.7")).unwrap(), UD60x18::ONE);
        assert_eq!(pow(ud("123.456"), UD60x18::ONE).unwrap(), ud("123.456"));
    }

    #[test]
    fn test_pow_fractional_exponents() {
        assert_eq!(pow(ud("4"), ud("0.5")).unwrap(), ud("2"));
        assert_close(pow(ud("2"), ud("0.5")).unwrap(), ud("1.414213562373095048"), "0.000000000000001");
        assert_close(pow(ud("10"), ud("2")).unwrap(), ud("100"), "0.000000000001");
        assert_close(pow(ud("0.25"), ud("1.5")).unwrap(), ud("0.125"), "0.000000000001");
        // 1000000^0.95 = 501187.233627272...
        assert_close(pow(ud("1000000"), ud("0.95")).unwrap(), ud("501187.233627272"), "0.000000001");
    }

    #[test]
    fn test_pow_overflow_is_error() {
        let huge = UD60x18::from_raw(U256::MAX / U256::from(2u8));
        assert!(matches!(
            pow(huge, ud("2")),
            Err(FixedPointError::PowOverflow { .. })
        ));
        assert!(matches!(
            pow(ud("1000000000000000000000000000000"), ud("4")),
            Err(FixedPointError::PowOverflow { .. })
        ));
    }

    #[test]
    fn test_exp2_factor_table() {
        // 2^(1/2) and 2^(1/4) with 128 fractional bits
        let sqrt2 = UD60x18::from_raw((EXP2_FACTORS[0] * SCALE) >> Q128_SHIFT);
        let fourth_root2 = UD60x18::from_raw((EXP2_FACTORS[1] * SCALE) >> Q128_SHIFT);
        assert_eq!(sqrt2, ud("1.414213562373095048"));
        assert_eq!(fourth_root2, ud("1.189207115002721066"));
    }

    proptest! {
        #[test]
        fn prop_pow_inverse_roundtrip(
            raw in 1_000_000_000_000_000u128..1_000_000_000_000_000_000_000_000_000_000_000u128,
            exponent_millis in 100u64..1000u64,
        ) {
            let x = UD60x18::from_raw(U256::from(raw));
            let a = UD60x18::from_raw(U256::from(exponent_millis) * U256::exp10(15));
            let inverse = UD60x18::ONE.checked_div(a).unwrap();
            let roundtrip = pow(pow(x, a).unwrap(), inverse).unwrap();
            assert_close(roundtrip, x, "0.000000001");
        }
    }
}
