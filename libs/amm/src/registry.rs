//! Pool registry
//!
//! Tracks one pool per hToken. Lookups for untracked hTokens fail instead of
//! returning an empty pool.

use crate::errors::RegistryError;
use hifi_types::Address;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug)]
pub struct PoolRegistry<P> {
    pools: HashMap<Address, P>,
}

impl<P> Default for PoolRegistry<P> {
    fn default() -> Self {
        Self {
            pools: HashMap::new(),
        }
    }
}

impl<P> PoolRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_pool(&mut self, htoken: Address, pool: P) -> Result<(), RegistryError> {
        if self.pools.contains_key(&htoken) {
            return Err(RegistryError::PoolAlreadyTracked { htoken });
        }
        self.pools.insert(htoken, pool);
        info!(%htoken, "Tracking pool");
        Ok(())
    }

    pub fn untrack_pool(&mut self, htoken: Address) -> Result<P, RegistryError> {
        let pool = self
            .pools
            .remove(&htoken)
            .ok_or(RegistryError::PoolNotTracked { htoken })?;
        info!(%htoken, "Untracked pool");
        Ok(pool)
    }

    pub fn contains(&self, htoken: Address) -> bool {
        self.pools.contains_key(&htoken)
    }

    pub fn pool(&self, htoken: Address) -> Result<&P, RegistryError> {
        self.pools
            .get(&htoken)
            .ok_or(RegistryError::PoolNotTracked { htoken })
    }

    pub fn pool_mut(&mut self, htoken: Address) -> Result<&mut P, RegistryError> {
        self.pools
            .get_mut(&htoken)
            .ok_or(RegistryError::PoolNotTracked { htoken })
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn htokens(&self) -> impl Iterator<Item = &Address> {
        self.pools.keys()
    }
}
