//! Error types for the pricing engine
//!
//! Solver, token and registry failures each have their own enum. `PoolError`
//! is what the pool surface returns and wraps the others.

use hifi_types::{Address, FixedPointError, U256};
use thiserror::Error;

/// Invariant solver failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum YieldSpaceError {
    #[error("Time to maturity {time_to_maturity}s exceeds cutoff {cutoff}s")]
    TooFarFromMaturity { time_to_maturity: u64, cutoff: u64 },

    #[error("Reserves overflow: {reserves} + {amount}")]
    ReservesOverflow { reserves: U256, amount: U256 },

    #[error("Reserves underflow: {reserves} - {amount}")]
    ReservesUnderflow { reserves: U256, amount: U256 },

    #[error("Reserves factors overflow: {underlying_factor} + {htoken_factor}")]
    ReservesFactorsOverflow {
        underlying_factor: U256,
        htoken_factor: U256,
    },

    #[error("Reserves factors underflow: {starting_factor} - {new_factor}")]
    ReservesFactorsUnderflow {
        starting_factor: U256,
        new_factor: U256,
    },

    #[error("Reserves power overflow: {base}^{exponent}")]
    ReservesPowerOverflow { base: U256, exponent: U256 },

    #[error("Lossy precision underflow: reserves {reserves}, solved reserves {new_reserves}")]
    LossyPrecisionUnderflow { reserves: U256, new_reserves: U256 },

    #[error("Negative interest rate: underlying {underlying}, hToken {htoken}")]
    NegativeInterestRate { underlying: U256, htoken: U256 },

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] FixedPointError),
}

/// Token collaborator failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: {account} holds {balance}, needs {amount}")]
    InsufficientBalance {
        account: Address,
        balance: U256,
        amount: U256,
    },

    #[error("Insufficient allowance: {spender} may move {allowance} from {owner}, needs {amount}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: U256,
        amount: U256,
    },

    #[error("Balance overflow for {account}")]
    BalanceOverflow { account: Address },

    #[error("Total supply of {token} exceeds the 256-bit range")]
    SupplyOverflow { token: Address },
}

/// Pool surface failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Bond matured at {maturity}")]
    BondMatured { maturity: u64 },

    #[error("Cannot mint zero pool shares")]
    MintZero,

    #[error("Cannot burn zero pool shares")]
    BurnZero,

    #[error("Cannot buy zero hTokens")]
    BuyHTokenZero,

    #[error("Cannot sell zero hTokens")]
    SellHTokenZero,

    #[error("Cannot buy zero underlying")]
    BuyUnderlyingZero,

    #[error("Cannot sell zero underlying")]
    SellUnderlyingZero,

    #[error("Underlying mismatch: hToken backed by {htoken_underlying}, pool given {underlying}")]
    UnderlyingMismatch {
        htoken_underlying: Address,
        underlying: Address,
    },

    #[error("Underlying decimals {decimals} outside 1..=18")]
    InvalidUnderlyingDecimals { decimals: u8 },

    #[error("hToken decimals {decimals}, expected 18")]
    InvalidHTokenDecimals { decimals: u8 },

    #[error("Insufficient pool shares: {provider} holds {balance}, offered {amount}")]
    InsufficientPoolShares {
        provider: Address,
        balance: U256,
        amount: U256,
    },

    #[error("Pool share supply overflow")]
    PoolSharesOverflow,

    #[error("Underlying reserves overflow: balance {balance} * scalar {scalar}")]
    UnderlyingReservesOverflow { balance: U256, scalar: U256 },

    #[error("Virtual hToken reserves overflow: balance {balance} + supply {supply}")]
    VirtualHTokenReservesOverflow { balance: U256, supply: U256 },

    #[error("Proportional amount overflow: {amount} * {numerator} / {denominator}")]
    ProportionalOverflow {
        amount: U256,
        numerator: U256,
        denominator: U256,
    },

    #[error("Insufficient hToken reserves: pool holds {balance}, owes {amount}")]
    InsufficientHTokenReserves { balance: U256, amount: U256 },

    #[error("Insufficient underlying reserves: pool holds {balance}, owes {amount}")]
    InsufficientUnderlyingReserves { balance: U256, amount: U256 },

    #[error("YieldSpace error: {0}")]
    YieldSpace(#[from] YieldSpaceError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] FixedPointError),
}

/// Pool registry failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Pool for hToken {htoken} already tracked")]
    PoolAlreadyTracked { htoken: Address },

    #[error("Pool for hToken {htoken} not tracked")]
    PoolNotTracked { htoken: Address },
}
