//! Underlying asset to collateral market handles, used by bridge routes.

use crate::errors::{Error, Result};
use ink::{primitives::AccountId, storage::Mapping};

/// Append-only asset registry.
#[ink::storage_item]
#[derive(Debug, Default)]
pub struct TokenRegistry {
    markets: Mapping<AccountId, AccountId>,
}

impl TokenRegistry {
    /// Records `market` as the market of `asset`.
    ///
    /// `underlying` is what the market itself reports it lends; it must be
    /// `asset`. Entries are never replaced.
    pub fn register(
        &mut self,
        asset: AccountId,
        market: AccountId,
        underlying: AccountId,
    ) -> Result<()> {
        if self.markets.contains(asset) {
            return Err(Error::AlreadyRegistered);
        }
        if underlying != asset {
            return Err(Error::InvalidMarket);
        }
        self.markets.insert(asset, &market);
        Ok(())
    }

    pub fn market(&self, asset: AccountId) -> Option<AccountId> {
        self.markets.get(asset)
    }

    pub fn market_of(&self, asset: AccountId) -> Result<AccountId> {
        self.market(asset).ok_or(Error::MarketNotRegistered)
    }
}
