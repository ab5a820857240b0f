//! Hifi Pool
//!
//! One pool per hToken maturity. It holds no reserve fields: every call
//! re-derives reserves from live token balances and the pool-share supply, so
//! consecutive calls always observe the previous call's post-state.
//!
//! Every mutating call runs validate, solve, transfer, emit. Validation and
//! solving touch nothing. If a transfer leg fails, the legs already executed
//! are reversed before the error is returned, so a failed call leaves all
//! balances where they were.

use crate::clock::Clock;
use crate::errors::{PoolError, TokenError};
use crate::events::PoolEvent;
use crate::pool_shares::PoolShares;
use crate::reserves::{self, Reserves};
use crate::token::{Erc20, HToken};
use crate::yield_space::{TradeDirection, YieldSpace};
use hifi_config::{HTOKEN_DECIMALS, MAX_UNDERLYING_DECIMALS};
use hifi_types::{Address, FixedPointError, PrecisionScalar, UD60x18, I256, U256};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Asset {
    Underlying,
    HToken,
}

/// One token movement; `pull` spends the pool's allowance from `from`
#[derive(Debug, Clone, Copy)]
struct Transfer {
    asset: Asset,
    from: Address,
    to: Address,
    amount: U256,
    pull: bool,
}

pub struct HifiPool<U: Erc20, H: HToken, C: Clock> {
    name: String,
    symbol: String,
    address: Address,
    maturity: u64,
    underlying: U,
    htoken: H,
    clock: C,
    yield_space: YieldSpace,
    underlying_precision_scalar: PrecisionScalar,
    shares: PoolShares,
    events: Vec<PoolEvent>,
}

impl<U: Erc20, H: HToken, C: Clock> HifiPool<U, H, C> {
    /// Bind a pool to an hToken and the underlying it redeems into
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        address: Address,
        underlying: U,
        htoken: H,
        clock: C,
        yield_space: YieldSpace,
    ) -> Result<Self, PoolError> {
        if htoken.underlying() != underlying.address() {
            return Err(PoolError::UnderlyingMismatch {
                htoken_underlying: htoken.underlying(),
                underlying: underlying.address(),
            });
        }

        let decimals = underlying.decimals();
        if decimals == 0 || decimals > MAX_UNDERLYING_DECIMALS {
            return Err(PoolError::InvalidUnderlyingDecimals { decimals });
        }
        let underlying_precision_scalar = PrecisionScalar::from_decimals(decimals)
            .map_err(|_| PoolError::InvalidUnderlyingDecimals { decimals })?;

        if htoken.decimals() != HTOKEN_DECIMALS {
            return Err(PoolError::InvalidHTokenDecimals {
                decimals: htoken.decimals(),
            });
        }

        let pool = Self {
            name: name.into(),
            symbol: symbol.into(),
            address,
            maturity: htoken.maturity(),
            underlying,
            htoken,
            clock,
            yield_space,
            underlying_precision_scalar,
            shares: PoolShares::new(),
            events: Vec::new(),
        };

        info!(
            pool = %pool.address,
            htoken = %pool.htoken.address(),
            underlying = %pool.underlying.address(),
            maturity = pool.maturity,
            scalar = %pool.underlying_precision_scalar,
            "Pool created"
        );
        Ok(pool)
    }

    // ACCESSORS

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn maturity(&self) -> u64 {
        self.maturity
    }

    pub fn underlying(&self) -> &U {
        &self.underlying
    }

    pub fn htoken(&self) -> &H {
        &self.htoken
    }

    pub fn yield_space(&self) -> &YieldSpace {
        &self.yield_space
    }

    pub fn underlying_precision_scalar(&self) -> PrecisionScalar {
        self.underlying_precision_scalar
    }

    pub fn total_supply(&self) -> U256 {
        self.shares.total_supply()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.shares.balance_of(account)
    }

    /// Move pool shares between holders
    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), PoolError> {
        self.shares.transfer(from, to, amount)
    }

    pub fn is_matured(&self) -> bool {
        self.clock.now() >= self.maturity
    }

    /// Seconds left until maturity, zero once matured
    pub fn time_to_maturity(&self) -> u64 {
        self.maturity.saturating_sub(self.clock.now())
    }

    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    // RESERVES

    /// Underlying custody scaled to 18 decimals
    pub fn get_normalized_underlying_reserves(&self) -> Result<U256, PoolError> {
        reserves::normalized_underlying_reserves(
            self.address,
            &self.underlying,
            self.underlying_precision_scalar,
        )
        .map(UD60x18::raw)
    }

    /// hToken custody plus pool-share supply
    pub fn get_virtual_htoken_reserves(&self) -> Result<U256, PoolError> {
        reserves::virtual_htoken_reserves(self.address, &self.htoken, self.shares.total_supply())
            .map(UD60x18::raw)
    }

    fn reserves(&self) -> Result<Reserves, PoolError> {
        reserves::reserves(
            self.address,
            &self.underlying,
            &self.htoken,
            self.underlying_precision_scalar,
            self.shares.total_supply(),
        )
    }

    // LIQUIDITY

    /// Deposit underlying (plus proportional hTokens once bootstrapped) for pool shares
    ///
    /// The first deposit mints shares equal to the normalized underlying and
    /// asks for no hTokens. Later deposits mint `supply * offered / U` shares
    /// and pull `H * minted / supply` hTokens, both against pre-mint reserves
    /// and floored. Returns the shares minted.
    pub fn mint(&mut self, provider: Address, underlying_offered: U256) -> Result<U256, PoolError> {
        self.ensure_not_matured()?;
        if underlying_offered.is_zero() {
            return Err(PoolError::MintZero);
        }

        let supply = self.shares.total_supply();
        let normalized_offered = self.underlying_precision_scalar.normalize(underlying_offered)?;

        let (pool_tokens_minted, htoken_required) = if supply.is_zero() {
            (normalized_offered, U256::zero())
        } else {
            let underlying_reserves = self.get_normalized_underlying_reserves()?;
            let minted = proportional(supply, normalized_offered, underlying_reserves)?;
            let htoken_reserves = self.get_virtual_htoken_reserves()?;
            let required = proportional(htoken_reserves, minted, supply)?;
            (minted, required)
        };

        if supply.checked_add(pool_tokens_minted).is_none() {
            return Err(PoolError::PoolSharesOverflow);
        }

        self.execute_transfers(&[
            Transfer {
                asset: Asset::Underlying,
                from: provider,
                to: self.address,
                amount: underlying_offered,
                pull: true,
            },
            Transfer {
                asset: Asset::HToken,
                from: provider,
                to: self.address,
                amount: htoken_required,
                pull: true,
            },
        ])?;

        self.shares.mint(provider, pool_tokens_minted)?;
        self.emit(PoolEvent::AddLiquidity {
            maturity: self.maturity,
            provider,
            underlying_amount: underlying_offered,
            htoken_amount: htoken_required,
            pool_tokens_minted,
        });
        Ok(pool_tokens_minted)
    }

    /// Return pool shares for a proportional slice of the underlying and hToken custody
    ///
    /// Allowed after maturity. Returns `(underlying, hTokens)` paid out.
    pub fn burn(
        &mut self,
        provider: Address,
        pool_tokens_burned: U256,
    ) -> Result<(U256, U256), PoolError> {
        if pool_tokens_burned.is_zero() {
            return Err(PoolError::BurnZero);
        }
        let balance = self.shares.balance_of(provider);
        if balance < pool_tokens_burned {
            return Err(PoolError::InsufficientPoolShares {
                provider,
                balance,
                amount: pool_tokens_burned,
            });
        }

        let supply = self.shares.total_supply();
        let underlying_reserves = self.get_normalized_underlying_reserves()?;
        let normalized_underlying_returned =
            proportional(underlying_reserves, pool_tokens_burned, supply)?;
        let underlying_returned = self
            .underlying_precision_scalar
            .denormalize(normalized_underlying_returned);

        let htoken_balance = self.htoken.balance_of(self.address);
        let htoken_returned = proportional(htoken_balance, pool_tokens_burned, supply)?;

        self.execute_transfers(&[
            Transfer {
                asset: Asset::Underlying,
                from: self.address,
                to: provider,
                amount: underlying_returned,
                pull: false,
            },
            Transfer {
                asset: Asset::HToken,
                from: self.address,
                to: provider,
                amount: htoken_returned,
                pull: false,
            },
        ])?;

        self.shares.burn(provider, pool_tokens_burned)?;
        self.emit(PoolEvent::RemoveLiquidity {
            maturity: self.maturity,
            provider,
            underlying_amount: underlying_returned,
            htoken_amount: htoken_returned,
            pool_tokens_burned,
        });
        Ok((underlying_returned, htoken_returned))
    }

    // TRADING

    /// Buy exactly `htoken_out` hTokens; returns the underlying paid
    pub fn buy_htoken(&mut self, from: Address, to: Address, htoken_out: U256) -> Result<U256, PoolError> {
        self.execute_trade(TradeDirection::UnderlyingInForHTokenOut, from, to, htoken_out)
    }

    /// Sell exactly `htoken_in` hTokens; returns the underlying received
    pub fn sell_htoken(&mut self, from: Address, to: Address, htoken_in: U256) -> Result<U256, PoolError> {
        self.execute_trade(TradeDirection::UnderlyingOutForHTokenIn, from, to, htoken_in)
    }

    /// Buy exactly `underlying_out` underlying; returns the hTokens paid
    pub fn buy_underlying(
        &mut self,
        from: Address,
        to: Address,
        underlying_out: U256,
    ) -> Result<U256, PoolError> {
        self.execute_trade(TradeDirection::HTokenInForUnderlyingOut, from, to, underlying_out)
    }

    /// Sell exactly `underlying_in` underlying; returns the hTokens received
    pub fn sell_underlying(
        &mut self,
        from: Address,
        to: Address,
        underlying_in: U256,
    ) -> Result<U256, PoolError> {
        self.execute_trade(TradeDirection::HTokenOutForUnderlyingIn, from, to, underlying_in)
    }

    // QUOTES

    /// Underlying needed to buy `htoken_out`, rounded up
    pub fn get_quote_for_buying_htoken(&self, htoken_out: U256) -> Result<U256, PoolError> {
        self.quote(TradeDirection::UnderlyingInForHTokenOut, htoken_out)
    }

    /// Underlying received for selling `htoken_in`, rounded down
    pub fn get_quote_for_selling_htoken(&self, htoken_in: U256) -> Result<U256, PoolError> {
        self.quote(TradeDirection::UnderlyingOutForHTokenIn, htoken_in)
    }

    /// hTokens needed to buy `underlying_out`
    pub fn get_quote_for_buying_underlying(&self, underlying_out: U256) -> Result<U256, PoolError> {
        self.quote(TradeDirection::HTokenInForUnderlyingOut, underlying_out)
    }

    /// hTokens received for selling `underlying_in`
    pub fn get_quote_for_selling_underlying(&self, underlying_in: U256) -> Result<U256, PoolError> {
        self.quote(TradeDirection::HTokenOutForUnderlyingIn, underlying_in)
    }

    /// Counterparty amount in the counterparty token's own decimals
    fn quote(&self, direction: TradeDirection, amount: U256) -> Result<U256, PoolError> {
        self.ensure_not_matured()?;
        if amount.is_zero() {
            return Err(zero_amount_error(direction));
        }

        let scalar = self.underlying_precision_scalar;
        let given = if direction.given_is_underlying() {
            scalar.normalize(amount)?
        } else {
            amount
        };

        let solved = self
            .yield_space
            .solve(
                direction,
                self.reserves()?,
                UD60x18::from_raw(given),
                self.time_to_maturity(),
            )?
            .raw();

        let quote = match direction {
            // Pool receives underlying: round against the trader
            TradeDirection::UnderlyingInForHTokenOut => scalar.denormalize_ceil(solved),
            TradeDirection::UnderlyingOutForHTokenIn => scalar.denormalize(solved),
            TradeDirection::HTokenOutForUnderlyingIn | TradeDirection::HTokenInForUnderlyingOut => {
                solved
            }
        };

        debug!(?direction, %amount, %quote, "Quote");
        Ok(quote)
    }

    fn execute_trade(
        &mut self,
        direction: TradeDirection,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<U256, PoolError> {
        let solved = self.quote(direction, amount)?;

        let (underlying_amount, htoken_amount) = if direction.given_is_underlying() {
            (amount, solved)
        } else {
            (solved, amount)
        };
        let (incoming_asset, incoming, outgoing_asset, outgoing) = if direction.htoken_flows_in() {
            (Asset::HToken, htoken_amount, Asset::Underlying, underlying_amount)
        } else {
            (Asset::Underlying, underlying_amount, Asset::HToken, htoken_amount)
        };

        self.ensure_custody(outgoing_asset, outgoing)?;

        // Built before any transfer so a cast failure moves nothing
        let event = PoolEvent::Trade {
            maturity: self.maturity,
            from,
            to,
            underlying_amount: trader_leg(underlying_amount, incoming_asset == Asset::Underlying)?,
            htoken_amount: trader_leg(htoken_amount, incoming_asset == Asset::HToken)?,
        };

        self.execute_transfers(&[
            Transfer {
                asset: incoming_asset,
                from,
                to: self.address,
                amount: incoming,
                pull: true,
            },
            Transfer {
                asset: outgoing_asset,
                from: self.address,
                to,
                amount: outgoing,
                pull: false,
            },
        ])?;

        self.emit(event);
        Ok(solved)
    }

    // INTERNALS

    fn ensure_not_matured(&self) -> Result<(), PoolError> {
        if self.is_matured() {
            return Err(PoolError::BondMatured {
                maturity: self.maturity,
            });
        }
        Ok(())
    }

    fn ensure_custody(&self, asset: Asset, amount: U256) -> Result<(), PoolError> {
        let balance = self.token(asset).balance_of(self.address);
        if balance >= amount {
            return Ok(());
        }
        Err(match asset {
            Asset::Underlying => PoolError::InsufficientUnderlyingReserves { balance, amount },
            Asset::HToken => PoolError::InsufficientHTokenReserves { balance, amount },
        })
    }

    fn token(&self, asset: Asset) -> &dyn Erc20 {
        match asset {
            Asset::Underlying => &self.underlying,
            Asset::HToken => &self.htoken,
        }
    }

    /// Run transfers in order; on failure reverse the completed ones
    fn execute_transfers(&self, transfers: &[Transfer]) -> Result<(), PoolError> {
        let mut completed: Vec<&Transfer> = Vec::with_capacity(transfers.len());

        for transfer in transfers.iter().filter(|t| !t.amount.is_zero()) {
            let token = self.token(transfer.asset);
            let result: Result<(), TokenError> = if transfer.pull {
                token.transfer_from(self.address, transfer.from, transfer.to, transfer.amount)
            } else {
                token.transfer(transfer.from, transfer.to, transfer.amount)
            };

            if let Err(e) = result {
                for done in completed.iter().rev() {
                    warn!(
                        pool = %self.address,
                        asset = ?done.asset,
                        amount = %done.amount,
                        "Reversing transfer after failed settlement leg: {}",
                        e
                    );
                    if let Err(refund_error) =
                        self.token(done.asset).transfer(done.to, done.from, done.amount)
                    {
                        error!(
                            pool = %self.address,
                            asset = ?done.asset,
                            "Transfer reversal failed: {}",
                            refund_error
                        );
                    }
                }
                return Err(e.into());
            }
            completed.push(transfer);
        }
        Ok(())
    }

    fn emit(&mut self, event: PoolEvent) {
        event.log();
        self.events.push(event);
    }
}

/// `amount * numerator / denominator`, floored; the product must fit 256 bits
fn proportional(amount: U256, numerator: U256, denominator: U256) -> Result<U256, PoolError> {
    if denominator.is_zero() {
        return Err(FixedPointError::DivisionByZero.into());
    }
    amount
        .checked_mul(numerator)
        .map(|product| product / denominator)
        .ok_or(PoolError::ProportionalOverflow {
            amount,
            numerator,
            denominator,
        })
}

/// Leg as seen by the trader: paid negative, received positive
fn trader_leg(amount: U256, paid: bool) -> Result<I256, PoolError> {
    let leg = I256::try_from(amount)?;
    if paid {
        Ok(leg.checked_neg()?)
    } else {
        Ok(leg)
    }
}

fn zero_amount_error(direction: TradeDirection) -> PoolError {
    match direction {
        TradeDirection::HTokenOutForUnderlyingIn => PoolError::SellUnderlyingZero,
        TradeDirection::UnderlyingOutForHTokenIn => PoolError::SellHTokenZero,
        TradeDirection::UnderlyingInForHTokenOut => PoolError::BuyHTokenZero,
        TradeDirection::HTokenInForUnderlyingOut => PoolError::BuyUnderlyingZero,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::token::{InMemoryHToken, InMemoryToken};

    const USDC: Address = Address::repeat_byte(0x01);
    const HUSDC: Address = Address::repeat_byte(0x02);
    const POOL: Address = Address::repeat_byte(0x99);
    const MATURITY: u64 = 1_700_000_000;

    fn build(
        underlying: InMemoryToken,
        htoken: InMemoryHToken,
    ) -> Result<HifiPool<InMemoryToken, InMemoryHToken, ManualClock>, PoolError> {
        HifiPool::new(
            "Hifi USDC Pool",
            "hUSDC-LP",
            POOL,
            underlying,
            htoken,
            ManualClock::new(MATURITY - 1_000),
            YieldSpace::default(),
        )
    }

    #[test]
    fn test_construction_reads_htoken() {
        let pool = build(
            InMemoryToken::new(USDC, "USDC", 6),
            InMemoryHToken::new(HUSDC, "hUSDC", MATURITY, USDC),
        )
        .unwrap();
        assert_eq!(pool.maturity(), MATURITY);
        assert_eq!(pool.underlying_precision_scalar().value(), U256::exp10(12));
        assert_eq!(pool.time_to_maturity(), 1_000);
        assert!(!pool.is_matured());
        assert_eq!(pool.name(), "Hifi USDC Pool");
        assert_eq!(pool.symbol(), "hUSDC-LP");
    }

    #[test]
    fn test_underlying_mismatch() {
        let err = build(
            InMemoryToken::new(USDC, "USDC", 6),
            InMemoryHToken::new(HUSDC, "hDAI", MATURITY, Address::repeat_byte(0x03)),
        )
        .err()
        .unwrap();
        assert_eq!(
            err,
            PoolError::UnderlyingMismatch {
                htoken_underlying: Address::repeat_byte(0x03),
                underlying: USDC,
            }
        );
    }

    #[test]
    fn test_invalid_decimals() {
        let err = build(
            InMemoryToken::new(USDC, "WEIRD", 24),
            InMemoryHToken::new(HUSDC, "hWEIRD", MATURITY, USDC),
        )
        .err()
        .unwrap();
        assert_eq!(err, PoolError::InvalidUnderlyingDecimals { decimals: 24 });

        for decimals in [0, MAX_UNDERLYING_DECIMALS + 1] {
            let err = build(
                InMemoryToken::new(USDC, "WEIRD", decimals),
                InMemoryHToken::new(HUSDC, "hWEIRD", MATURITY, USDC),
            )
            .err()
            .unwrap();
            assert_eq!(err, PoolError::InvalidUnderlyingDecimals { decimals });
        }

        let pool = build(
            InMemoryToken::new(USDC, "DAI", MAX_UNDERLYING_DECIMALS),
            InMemoryHToken::new(HUSDC, "hDAI", MATURITY, USDC),
        )
        .unwrap();
        assert_eq!(pool.underlying_precision_scalar(), PrecisionScalar::ONE);

        let err = build(
            InMemoryToken::new(USDC, "USDC", 6),
            InMemoryHToken::with_decimals(HUSDC, "hUSDC", MATURITY, USDC, 6),
        )
        .err()
        .unwrap();
        assert_eq!(err, PoolError::InvalidHTokenDecimals { decimals: 6 });
    }

    #[test]
    fn test_proportional_floor_and_overflow() {
        assert_eq!(
            proportional(U256::from(10u8), U256::from(10u8), U256::from(3u8)).unwrap(),
            U256::from(33u8)
        );
        assert!(matches!(
            proportional(U256::MAX, U256::from(2u8), U256::from(4u8)),
            Err(PoolError::ProportionalOverflow { .. })
        ));
        assert!(matches!(
            proportional(U256::one(), U256::one(), U256::zero()),
            Err(PoolError::FixedPoint(FixedPointError::DivisionByZero))
        ));
    }

    #[test]
    fn test_trader_leg_sign_and_cast_overflow() {
        let paid = trader_leg(U256::from(5u8), true).unwrap();
        assert!(paid.is_negative());
        assert_eq!(paid.unsigned_abs(), U256::from(5u8));
        assert!(!trader_leg(U256::from(5u8), false).unwrap().is_negative());

        // 2^255 fits as a negative magnitude but still fails the signed cast
        let too_big = U256::one() << 255;
        assert!(matches!(
            trader_leg(too_big, true),
            Err(PoolError::FixedPoint(FixedPointError::CastOverflow { .. }))
        ));
    }
}
