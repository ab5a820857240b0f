//! YieldSpace invariant solver
//!
//! Prices trades on the power-sum curve
//!
//! ```text
//! U^a + H^a = k,    a = 1 - g * t,    t = time_to_maturity / four_years
//! ```
//!
//! where `U` is the normalized underlying reserve and `H` the virtual hToken
//! reserve. `g` is `g1` (below one) when hTokens leave the pool and `g2`
//! (above one) when they enter it; the fee lives in the exponent rather than
//! in a deducted amount. As maturity approaches `a` tends to one and the curve
//! flattens into a 1:1 exchange, matching redemption at par.
//!
//! All four trade shapes go through [`YieldSpace::solve`]: one side of the
//! trade is given, the solver moves that reserve, keeps `k` computed from the
//! pre-trade reserves and solves for the other side.

use crate::errors::YieldSpaceError;
use crate::reserves::Reserves;
use hifi_config::protocol::yield_space::{CUTOFF_TTM, G1_RAW, G2_RAW, SECONDS_FOUR_YEARS};
use hifi_config::YieldSpaceConfig;
use hifi_types::{mul_div, FixedPointError, UD60x18, SCALE, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Trade shape, named as `<solved amount>For<given amount>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeDirection {
    /// Given underlying in, solve hTokens out (sell underlying)
    HTokenOutForUnderlyingIn,
    /// Given hTokens in, solve underlying out (sell hToken)
    UnderlyingOutForHTokenIn,
    /// Given hTokens out, solve underlying in (buy hToken)
    UnderlyingInForHTokenOut,
    /// Given underlying out, solve hTokens in (buy underlying)
    HTokenInForUnderlyingOut,
}

impl TradeDirection {
    pub const ALL: [TradeDirection; 4] = [
        TradeDirection::HTokenOutForUnderlyingIn,
        TradeDirection::UnderlyingOutForHTokenIn,
        TradeDirection::UnderlyingInForHTokenOut,
        TradeDirection::HTokenInForUnderlyingOut,
    ];

    /// hTokens enter the pool; selects `g2`
    pub fn htoken_flows_in(self) -> bool {
        matches!(
            self,
            TradeDirection::UnderlyingOutForHTokenIn | TradeDirection::HTokenInForUnderlyingOut
        )
    }

    /// The given amount is denominated in underlying
    pub fn given_is_underlying(self) -> bool {
        matches!(
            self,
            TradeDirection::HTokenOutForUnderlyingIn | TradeDirection::HTokenInForUnderlyingOut
        )
    }

    /// The given amount enters the pool
    pub fn given_flows_in(self) -> bool {
        matches!(
            self,
            TradeDirection::HTokenOutForUnderlyingIn | TradeDirection::UnderlyingOutForHTokenIn
        )
    }
}

/// Curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YieldSpace {
    g1: UD60x18,
    g2: UD60x18,
    cutoff_ttm: u64,
}

impl Default for YieldSpace {
    fn default() -> Self {
        Self {
            g1: UD60x18::from_raw(U256::from(G1_RAW)),
            g2: UD60x18::from_raw(U256::from(G2_RAW)),
            cutoff_ttm: CUTOFF_TTM,
        }
    }
}

impl YieldSpace {
    pub fn new(g1: UD60x18, g2: UD60x18, cutoff_ttm: u64) -> Self {
        Self { g1, g2, cutoff_ttm }
    }

    /// Lift validated decimal config into fixed point
    pub fn from_config(config: &YieldSpaceConfig) -> Result<Self, FixedPointError> {
        Ok(Self {
            g1: UD60x18::from_decimal(config.g1)?,
            g2: UD60x18::from_decimal(config.g2)?,
            cutoff_ttm: config.cutoff_ttm,
        })
    }

    pub fn g1(&self) -> UD60x18 {
        self.g1
    }

    pub fn g2(&self) -> UD60x18 {
        self.g2
    }

    pub fn cutoff_ttm(&self) -> u64 {
        self.cutoff_ttm
    }

    /// Fee coefficient for a trade shape
    pub fn fee(&self, direction: TradeDirection) -> UD60x18 {
        if direction.htoken_flows_in() {
            self.g2
        } else {
            self.g1
        }
    }

    /// Curve exponent `1 - g * time_to_maturity / four_years`
    ///
    /// Fails beyond the cutoff, where the exponent would leave the range the
    /// power routine handles precisely.
    pub fn exponent(&self, time_to_maturity: u64, g: UD60x18) -> Result<UD60x18, YieldSpaceError> {
        let too_far = YieldSpaceError::TooFarFromMaturity {
            time_to_maturity,
            cutoff: self.cutoff_ttm,
        };
        if time_to_maturity > self.cutoff_ttm {
            return Err(too_far);
        }

        let t = mul_div(
            U256::from(time_to_maturity),
            SCALE,
            U256::from(SECONDS_FOUR_YEARS),
        )
        .map(UD60x18::from_raw)
        .ok_or(FixedPointError::DivisionByZero)?;

        let a = UD60x18::ONE
            .checked_sub(g.checked_mul(t)?)
            .map_err(|_| too_far.clone())?;
        if a.is_zero() {
            return Err(too_far);
        }
        Ok(a)
    }

    /// `U^a + H^a`, the curve constant before the trade
    pub fn starting_reserves_factor(
        &self,
        reserves: Reserves,
        a: UD60x18,
    ) -> Result<UD60x18, YieldSpaceError> {
        let underlying_factor = power(reserves.normalized_underlying, a)?;
        let htoken_factor = power(reserves.virtual_htoken, a)?;
        underlying_factor
            .checked_add(htoken_factor)
            .map_err(|_| YieldSpaceError::ReservesFactorsOverflow {
                underlying_factor: underlying_factor.raw(),
                htoken_factor: htoken_factor.raw(),
            })
    }

    /// Counterparty amount that keeps `U^a + H^a` constant
    ///
    /// `amount` is the given leg, 18-decimal. Rejects results that would price
    /// hTokens above par.
    pub fn solve(
        &self,
        direction: TradeDirection,
        reserves: Reserves,
        amount: UD60x18,
        time_to_maturity: u64,
    ) -> Result<UD60x18, YieldSpaceError> {
        let (given_reserves, other_reserves) = if direction.given_is_underlying() {
            (reserves.normalized_underlying, reserves.virtual_htoken)
        } else {
            (reserves.virtual_htoken, reserves.normalized_underlying)
        };

        let new_given_reserves = if direction.given_flows_in() {
            given_reserves
                .checked_add(amount)
                .map_err(|_| YieldSpaceError::ReservesOverflow {
                    reserves: given_reserves.raw(),
                    amount: amount.raw(),
                })?
        } else {
            given_reserves
                .checked_sub(amount)
                .map_err(|_| YieldSpaceError::ReservesUnderflow {
                    reserves: given_reserves.raw(),
                    amount: amount.raw(),
                })?
        };

        let a = self.exponent(time_to_maturity, self.fee(direction))?;
        let starting_factor = self.starting_reserves_factor(reserves, a)?;
        let new_given_factor = power(new_given_reserves, a)?;
        let new_other_factor = starting_factor.checked_sub(new_given_factor).map_err(|_| {
            YieldSpaceError::ReservesFactorsUnderflow {
                starting_factor: starting_factor.raw(),
                new_factor: new_given_factor.raw(),
            }
        })?;
        let new_other_reserves = power(new_other_factor, UD60x18::ONE.checked_div(a)?)?;

        let lossy = || YieldSpaceError::LossyPrecisionUnderflow {
            reserves: other_reserves.raw(),
            new_reserves: new_other_reserves.raw(),
        };
        // The other side moves opposite to the given side
        let solved = if direction.given_flows_in() {
            other_reserves
                .checked_sub(new_other_reserves)
                .map_err(|_| lossy())?
        } else {
            new_other_reserves
                .checked_sub(other_reserves)
                .map_err(|_| lossy())?
        };

        debug!(
            ?direction,
            exponent = %a,
            given = %amount,
            solved = %solved,
            "YieldSpace solve"
        );

        check_interest_rate(direction, new_given_reserves, new_other_reserves, amount, solved)?;
        Ok(solved)
    }
}

/// Rejects trades that would price hTokens above par
///
/// hTokens leaving the pool: post-trade hToken reserves must stay at or above
/// post-trade underlying reserves. hTokens entering the pool: the underlying
/// leg may not exceed the hToken leg.
fn check_interest_rate(
    direction: TradeDirection,
    new_given_reserves: UD60x18,
    new_other_reserves: UD60x18,
    given: UD60x18,
    solved: UD60x18,
) -> Result<(), YieldSpaceError> {
    let (underlying, htoken) = if direction.htoken_flows_in() {
        if direction.given_is_underlying() {
            (given, solved)
        } else {
            (solved, given)
        }
    } else if direction.given_is_underlying() {
        (new_given_reserves, new_other_reserves)
    } else {
        (new_other_reserves, new_given_reserves)
    };

    if underlying > htoken {
        return Err(YieldSpaceError::NegativeInterestRate {
            underlying: underlying.raw(),
            htoken: htoken.raw(),
        });
    }
    Ok(())
}

fn power(base: UD60x18, exponent: UD60x18) -> Result<UD60x18, YieldSpaceError> {
    base.pow(exponent)
        .map_err(|_| YieldSpaceError::ReservesPowerOverflow {
            base: base.raw(),
            exponent: exponent.raw(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// 365.25 days
    const ONE_YEAR: u64 = 31_557_600;

    fn ud(s: &str) -> UD60x18 {
        UD60x18::from_decimal_str(s).unwrap()
    }

    fn reserves(underlying: &str, htoken: &str) -> Reserves {
        Reserves {
            normalized_underlying: ud(underlying),
            virtual_htoken: ud(htoken),
        }
    }

    #[test]
    fn test_fee_selection() {
        let ys = YieldSpace::default();
        assert_eq!(ys.fee(TradeDirection::HTokenOutForUnderlyingIn), ys.g1());
        assert_eq!(ys.fee(TradeDirection::UnderlyingInForHTokenOut), ys.g1());
        assert_eq!(ys.fee(TradeDirection::UnderlyingOutForHTokenIn), ys.g2());
        assert_eq!(ys.fee(TradeDirection::HTokenInForUnderlyingOut), ys.g2());
        assert_eq!(ys.g1(), ud("0.95"));
        assert_eq!(ys.g2(), ud("1.052631578947368421"));
    }

    #[test]
    fn test_exponent_values() {
        let ys = YieldSpace::default();
        assert_eq!(ys.exponent(0, ys.g1()).unwrap(), UD60x18::ONE);
        assert_eq!(ys.exponent(ONE_YEAR, ys.g1()).unwrap(), ud("0.7625"));
        assert_eq!(
            ys.exponent(ONE_YEAR, ys.g2()).unwrap(),
            ud("0.736842105263157895")
        );
    }

    #[test]
    fn test_exponent_cutoff() {
        let ys = YieldSpace::default();
        assert!(ys.exponent(CUTOFF_TTM, ys.g2()).unwrap() > UD60x18::ZERO);
        assert_eq!(
            ys.exponent(CUTOFF_TTM + 1, ys.g1()),
            Err(YieldSpaceError::TooFarFromMaturity {
                time_to_maturity: CUTOFF_TTM + 1,
                cutoff: CUTOFF_TTM,
            })
        );
    }

    #[test]
    fn test_exponent_outside_curve_domain() {
        // Custom parameters where g * t reaches one before the cutoff
        let ys = YieldSpace::new(ud("0.95"), ud("2"), SECONDS_FOUR_YEARS);
        assert!(matches!(
            ys.exponent(SECONDS_FOUR_YEARS / 2, ys.g2()),
            Err(YieldSpaceError::TooFarFromMaturity { .. })
        ));
    }

    #[test]
    fn test_from_config_matches_default() {
        let ys = YieldSpace::from_config(&YieldSpaceConfig::default()).unwrap();
        assert_eq!(ys, YieldSpace::default());
    }

    #[test]
    fn test_from_custom_config() {
        let config = YieldSpaceConfig {
            g1: dec!(0.9),
            g2: dec!(1.1),
            cutoff_ttm: ONE_YEAR,
        };
        let ys = YieldSpace::from_config(&config).unwrap();
        assert_eq!(ys.g1(), ud("0.9"));
        assert_eq!(ys.g2(), ud("1.1"));
        assert_eq!(ys.cutoff_ttm(), ONE_YEAR);
        assert_eq!(ys.exponent(ONE_YEAR, ys.g2()).unwrap(), ud("0.725"));
    }

    #[test]
    fn test_sell_htoken_pays_less_than_par() {
        let ys = YieldSpace::default();
        let out = ys
            .solve(
                TradeDirection::UnderlyingOutForHTokenIn,
                reserves("100", "100"),
                ud("10"),
                ONE_YEAR,
            )
            .unwrap();
        assert!(out < ud("10"));
        assert!(out > ud("9"));
    }

    #[test]
    fn test_buy_htoken_from_balanced_pool_is_negative_interest() {
        let ys = YieldSpace::default();
        assert!(matches!(
            ys.solve(
                TradeDirection::UnderlyingInForHTokenOut,
                reserves("100", "100"),
                ud("10"),
                ONE_YEAR,
            ),
            Err(YieldSpaceError::NegativeInterestRate { .. })
        ));
    }

    #[test]
    fn test_sell_underlying_gets_more_htokens() {
        let ys = YieldSpace::default();
        let out = ys
            .solve(
                TradeDirection::HTokenOutForUnderlyingIn,
                reserves("100", "120"),
                ud("5"),
                ONE_YEAR,
            )
            .unwrap();
        assert!(out > ud("5"));
    }

    #[test]
    fn test_buy_underlying_costs_more_htokens() {
        let ys = YieldSpace::default();
        let hin = ys
            .solve(
                TradeDirection::HTokenInForUnderlyingOut,
                reserves("100", "120"),
                ud("5"),
                ONE_YEAR,
            )
            .unwrap();
        assert!(hin > ud("5"));
    }

    #[test]
    fn test_near_maturity_trades_close_to_par() {
        let ys = YieldSpace::default();
        let out = ys
            .solve(
                TradeDirection::UnderlyingOutForHTokenIn,
                reserves("1000", "1200"),
                ud("1"),
                60,
            )
            .unwrap();
        assert!(out < ud("1"));
        assert!(out > ud("0.99999"));
    }

    #[test]
    fn test_reserves_underflow() {
        let ys = YieldSpace::default();
        assert_eq!(
            ys.solve(
                TradeDirection::UnderlyingInForHTokenOut,
                reserves("100", "120"),
                ud("121"),
                ONE_YEAR,
            ),
            Err(YieldSpaceError::ReservesUnderflow {
                reserves: ud("120").raw(),
                amount: ud("121").raw(),
            })
        );
    }

    #[test]
    fn test_reserves_overflow() {
        let ys = YieldSpace::default();
        let r = Reserves {
            normalized_underlying: UD60x18::MAX,
            virtual_htoken: ud("100"),
        };
        assert!(matches!(
            ys.solve(TradeDirection::HTokenOutForUnderlyingIn, r, ud("1"), ONE_YEAR),
            Err(YieldSpaceError::ReservesOverflow { .. })
        ));
    }

    #[test]
    fn test_reserves_factors_underflow() {
        let ys = YieldSpace::default();
        assert!(matches!(
            ys.solve(
                TradeDirection::HTokenOutForUnderlyingIn,
                reserves("100", "100"),
                ud("1000"),
                ONE_YEAR,
            ),
            Err(YieldSpaceError::ReservesFactorsUnderflow { .. })
        ));
    }

    #[test]
    fn test_too_far_from_maturity() {
        let ys = YieldSpace::default();
        for direction in TradeDirection::ALL {
            assert!(matches!(
                ys.solve(direction, reserves("100", "120"), ud("1"), CUTOFF_TTM + 1),
                Err(YieldSpaceError::TooFarFromMaturity { .. })
            ));
        }
    }

    #[test]
    fn test_starting_reserves_factor_at_exponent_one() {
        let ys = YieldSpace::default();
        let k = ys
            .starting_reserves_factor(reserves("100", "120"), UD60x18::ONE)
            .unwrap();
        assert_eq!(k, ud("220"));
    }
}
