//! Two-hop bridge: the first provider's loan becomes collateral in a second
//! market, which lends the requested assets.
//!
//! Both hops run inside the first provider's callback. Any failed hop
//! propagates and the first provider's repayment never happens, which
//! reverts the whole chain.

use crate::{
    errors::Result,
    host::{BridgeOp, Host},
    routes::Route,
};
use ink::{prelude::vec::Vec, primitives::AccountId};

/// Collateral posted and debts taken by an open bridge.
#[derive(Debug)]
pub struct OpenBridge {
    collateral_market: AccountId,
    collateral: AccountId,
    collateral_amount: u128,
    /// (market, asset, amount) per borrowed asset.
    debts: Vec<(AccountId, AccountId, u128)>,
}

/// Supplies `collateral_amount` of `collateral` and borrows every requested asset.
pub fn open<H: Host>(
    host: &mut H,
    route: &Route,
    collateral: AccountId,
    collateral_amount: u128,
    tokens: &[AccountId],
    amounts: &[u128],
) -> Result<OpenBridge> {
    let collateral_market = route.market_for(&*host, collateral)?;
    host.approve(collateral, collateral_market, collateral_amount)?;
    host.bridge(collateral_market, BridgeOp::Supply, collateral, collateral_amount)?;

    let mut debts = Vec::with_capacity(tokens.len());
    for (token, amount) in tokens.iter().zip(amounts) {
        let market = route.market_for(&*host, *token)?;
        host.bridge(market, BridgeOp::Borrow, *token, *amount)?;
        debts.push((market, *token, *amount));
    }
    Ok(OpenBridge {
        collateral_market,
        collateral,
        collateral_amount,
        debts,
    })
}

/// Repays every debt, then withdraws the collateral.
pub fn close<H: Host>(host: &mut H, bridge: OpenBridge) -> Result<()> {
    for (market, asset, amount) in bridge.debts {
        host.approve(asset, market, amount)?;
        host.bridge(market, BridgeOp::Repay, asset, amount)?;
    }
    host.bridge(
        bridge.collateral_market,
        BridgeOp::Withdraw,
        bridge.collateral,
        bridge.collateral_amount,
    )
}
