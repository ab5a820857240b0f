//! Pool events
//!
//! Every executed mint, burn and trade appends one event to the pool's log and
//! writes one `info!` line.

use hifi_types::{Address, I256, U256};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PoolEvent {
    AddLiquidity {
        maturity: u64,
        provider: Address,
        underlying_amount: U256,
        htoken_amount: U256,
        pool_tokens_minted: U256,
    },
    RemoveLiquidity {
        maturity: u64,
        provider: Address,
        underlying_amount: U256,
        htoken_amount: U256,
        pool_tokens_burned: U256,
    },
    /// Legs are signed from the trader's side: paid negative, received positive
    Trade {
        maturity: u64,
        from: Address,
        to: Address,
        underlying_amount: I256,
        htoken_amount: I256,
    },
}

impl PoolEvent {
    pub(crate) fn log(&self) {
        match self {
            PoolEvent::AddLiquidity {
                maturity,
                provider,
                underlying_amount,
                htoken_amount,
                pool_tokens_minted,
            } => info!(
                maturity,
                %provider,
                %underlying_amount,
                %htoken_amount,
                %pool_tokens_minted,
                "AddLiquidity"
            ),
            PoolEvent::RemoveLiquidity {
                maturity,
                provider,
                underlying_amount,
                htoken_amount,
                pool_tokens_burned,
            } => info!(
                maturity,
                %provider,
                %underlying_amount,
                %htoken_amount,
                %pool_tokens_burned,
                "RemoveLiquidity"
            ),
            PoolEvent::Trade {
                maturity,
                from,
                to,
                underlying_amount,
                htoken_amount,
            } => info!(
                maturity,
                %from,
                %to,
                %underlying_amount,
                %htoken_amount,
                "Trade"
            ),
        }
    }
}
