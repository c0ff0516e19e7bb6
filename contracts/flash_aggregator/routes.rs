//! The route table and the borrow-initiation side of every route.

use crate::{
    errors::{Error, Result},
    fingerprint::{self, FlashPayload},
    host::{FlashState, Host},
    ordering,
};
use ink::{prelude::vec::Vec, primitives::AccountId};

/// Where the liquidity is sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Multi-asset money market; repaid by allowance.
    LendingPool,
    /// ERC-3156 mint module of the stable asset; repaid by allowance.
    StableMint,
    /// DEX vault; repaid by transfer.
    Vault,
}

/// Collateral market a bridge route borrows the requested assets from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bridge {
    /// Per-asset markets from the token registry.
    Markets,
    /// The lending pool, used as a collateral market.
    LendingPool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    Multi,
}

/// Immutable route descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub id: u32,
    pub provider: Provider,
    pub bridge: Option<Bridge>,
    pub arity: Arity,
}

pub const ROUTES: [Route; 7] = [
    Route::new(1, Provider::LendingPool, None, Arity::Multi),
    Route::new(2, Provider::StableMint, None, Arity::Single),
    Route::new(3, Provider::StableMint, Some(Bridge::Markets), Arity::Multi),
    Route::new(4, Provider::StableMint, Some(Bridge::LendingPool), Arity::Multi),
    Route::new(5, Provider::Vault, None, Arity::Multi),
    Route::new(6, Provider::Vault, Some(Bridge::Markets), Arity::Multi),
    Route::new(7, Provider::Vault, Some(Bridge::LendingPool), Arity::Multi),
];

/// Ids of every supported route.
pub fn route_ids() -> Vec<u32> {
    ROUTES.iter().map(|route| route.id).collect()
}

pub fn find(id: u32) -> Result<&'static Route> {
    ROUTES
        .iter()
        .find(|route| route.id == id)
        .ok_or(Error::UnknownRoute)
}

impl Route {
    const fn new(id: u32, provider: Provider, bridge: Option<Bridge>, arity: Arity) -> Self {
        Self {
            id,
            provider,
            bridge,
            arity,
        }
    }

    /// Checks a canonical token set against what this route can serve.
    pub fn validate<S: FlashState>(&self, state: &S, tokens: &[AccountId]) -> Result<()> {
        if tokens.is_empty() || !ordering::is_canonical(tokens) {
            return Err(Error::UnvalidatedTokens);
        }
        if self.arity == Arity::Single && tokens.len() != 1 {
            return Err(Error::UnvalidatedTokens);
        }
        let config = state.config();
        let direct_mint = self.provider == Provider::StableMint && self.bridge.is_none();
        if direct_mint && tokens[0] != config.stable_token {
            return Err(Error::UnvalidatedTokens);
        }
        if self.bridge == Some(Bridge::Markets) {
            let registry = state.admin().registry();
            let collateral = self.bridge_asset(state).0;
            let unregistered = core::iter::once(&collateral)
                .chain(tokens)
                .any(|token| registry.market(*token).is_none());
            if unregistered {
                return Err(Error::UnvalidatedTokens);
            }
        }
        Ok(())
    }

    /// Asset and amount a bridge route borrows from its provider.
    pub fn bridge_asset<S: FlashState>(&self, state: &S) -> (AccountId, u128) {
        let config = state.config();
        match self.provider {
            Provider::Vault => (config.vault_bridge_token, config.vault_bridge_amount),
            _ => (config.stable_token, config.stable_bridge_amount),
        }
    }

    /// Collateral market for `asset` on this route's bridge.
    pub fn market_for<S: FlashState>(&self, state: &S, asset: AccountId) -> Result<AccountId> {
        match self.bridge {
            Some(Bridge::LendingPool) => Ok(state.config().lending_pool),
            Some(Bridge::Markets) => state.admin().registry().market_of(asset),
            None => Err(Error::UnknownRoute),
        }
    }

    /// Registers the payload fingerprint and calls the provider.
    ///
    /// The provider calls back into the aggregator before this returns.
    pub fn initiate<H: Host>(&self, host: &mut H, payload: &FlashPayload) -> Result<()> {
        // Legs are derived before the fingerprint is registered so a
        // failed quote leaves nothing outstanding.
        let (tokens, amounts) = match self.bridge {
            Some(_) => {
                let (asset, amount) = self.bridge_asset(&*host);
                (ink::prelude::vec![asset], ink::prelude::vec![amount])
            }
            None if self.provider == Provider::Vault => vault_legs(&*host, payload)?,
            None => (payload.tokens.clone(), payload.amounts.clone()),
        };
        let encoded = fingerprint::register(host, payload);
        match self.provider {
            Provider::LendingPool => host.lending_pool_flash_loan(&tokens, &amounts, encoded),
            Provider::StableMint => host.stable_mint_flash_loan(tokens[0], amounts[0], encoded),
            Provider::Vault => host.vault_flash_loan(&tokens, &amounts, encoded),
        }
    }
}

/// Tokens and amounts the vault is asked for on the direct vault route.
///
/// The vault lends the wrapped staking derivative in place of the staked
/// token, so a staked request is quoted into wrapped units and the legs
/// are put back into canonical order.
pub fn vault_legs<H: Host>(
    host: &H,
    payload: &FlashPayload,
) -> Result<(Vec<AccountId>, Vec<u128>)> {
    let Some(pair) = host.config().staking else {
        return Ok((payload.tokens.clone(), payload.amounts.clone()));
    };
    let mut tokens = Vec::with_capacity(payload.tokens.len());
    let mut amounts = Vec::with_capacity(payload.amounts.len());
    for (token, amount) in payload.tokens.iter().zip(&payload.amounts) {
        if *token == pair.staked {
            tokens.push(pair.wrapped);
            amounts.push(host.wrapped_for_staked(pair.wrapped, *amount)?);
        } else {
            tokens.push(*token);
            amounts.push(*amount);
        }
    }
    ordering::canonicalize(tokens, amounts)
}
