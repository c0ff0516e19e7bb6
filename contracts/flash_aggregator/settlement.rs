//! Provider callbacks and the settlement they drive.
//!
//! Every callback proves it belongs to the outstanding request, hands the
//! liquidity to the original caller, checks that each balance came back
//! with its fee, and only then lets the provider collect.

use crate::{
    bridge,
    errors::{Error, Result},
    fees::compute_fee,
    fingerprint::{self, FlashPayload},
    host::{self, Fingerprint, Host, ReceiverKind, StakingPair},
    routes::{self, Provider, Route},
};
use ink::{
    prelude::{vec, vec::Vec},
    primitives::AccountId,
};

/// Rounding slack tolerated on the wrapped staking leg only: unwrapping
/// and wrapping back can lose a few units.
pub const STAKED_EPSILON: u128 = 10;

/// Per-invocation bookkeeping; lives for one callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashContext {
    pub tokens: Vec<AccountId>,
    pub amounts: Vec<u128>,
    pub initial_balances: Vec<u128>,
    pub fees: Vec<u128>,
    pub final_balances: Vec<u128>,
}

impl FlashContext {
    /// Checks `final + slack >= initial + fee` for every asset.
    pub fn check(&self, slack: &[u128]) -> Result<()> {
        let legs = self
            .initial_balances
            .iter()
            .zip(&self.fees)
            .zip(&self.final_balances)
            .enumerate();
        for (i, ((initial, fee), final_balance)) in legs {
            let required = initial.checked_add(*fee).ok_or(Error::Overflow)?;
            let held = final_balance.saturating_add(slack.get(i).copied().unwrap_or(0));
            if held < required {
                return Err(Error::InsufficientRepayment);
            }
        }
        Ok(())
    }
}

/// Runs the caller's logic over the lent `tokens` and validates repayment.
///
/// `provider_fees` are what the provider will collect on top of principal;
/// the caller is charged at least that much.
pub fn settle<H: Host>(
    host: &mut H,
    route: &Route,
    payload: &FlashPayload,
    tokens: &[AccountId],
    amounts: &[u128],
    provider_fees: &[u128],
) -> Result<FlashContext> {
    let this = host.this();
    let bps = host.admin().fees().resolve_bps(route.id, payload.sender);
    let mut ctx = FlashContext {
        tokens: tokens.to_vec(),
        amounts: amounts.to_vec(),
        initial_balances: host::balances(&*host, tokens, this)?,
        fees: amounts
            .iter()
            .zip(provider_fees)
            .map(|(amount, provider_fee)| compute_fee(*amount, bps).max(*provider_fee))
            .collect(),
        final_balances: Vec::new(),
    };

    let mut handed_tokens = ctx.tokens.clone();
    let mut handed_amounts = ctx.amounts.clone();
    let mut handed_fees = ctx.fees.clone();
    let staked = staked_leg(&*host, route, payload, tokens);
    let mut staked_before = 0;
    if let Some((i, pair)) = staked {
        staked_before = host.balance_of(pair.staked, this)?;
        handed_amounts[i] = host.unwrap(pair.wrapped, ctx.amounts[i])?;
        handed_fees[i] = host.staked_for_wrapped(pair.wrapped, ctx.fees[i])?;
        handed_tokens[i] = pair.staked;
    }

    for (token, amount) in handed_tokens.iter().zip(&handed_amounts) {
        host.transfer(*token, payload.sender, *amount)?;
    }
    match host::receiver_kind(&*host, payload.sender) {
        ReceiverKind::DirectReceiver => host.call_receiver(
            payload.sender,
            &handed_tokens,
            &handed_amounts,
            &handed_fees,
            payload.sender,
            &payload.data,
        )?,
        ReceiverKind::DelegatedAccount => host.call_delegated(payload.sender, &payload.data)?,
    }

    let mut slack = vec![0; tokens.len()];
    if let Some((i, pair)) = staked {
        let returned = host.balance_of(pair.staked, this)?.saturating_sub(staked_before);
        if returned > 0 {
            host.wrap(pair.wrapped, returned)?;
        }
        slack[i] = STAKED_EPSILON;
    }

    ctx.final_balances = host::balances(&*host, tokens, this)?;
    ctx.check(&slack)?;
    Ok(ctx)
}

/// Index of the wrapped leg when the caller asked for the staked token on
/// the direct vault route.
fn staked_leg<H: Host>(
    host: &H,
    route: &Route,
    payload: &FlashPayload,
    tokens: &[AccountId],
) -> Option<(usize, StakingPair)> {
    if route.provider != Provider::Vault || route.bridge.is_some() {
        return None;
    }
    let pair = host.config().staking?;
    if !payload.tokens.contains(&pair.staked) {
        return None;
    }
    tokens
        .iter()
        .position(|token| *token == pair.wrapped)
        .map(|i| (i, pair))
}

/// Opens the bridge, settles the requested assets and closes the bridge.
fn settle_bridged<H: Host>(
    host: &mut H,
    route: &Route,
    payload: &FlashPayload,
    collateral: AccountId,
    collateral_amount: u128,
) -> Result<FlashContext> {
    let open = bridge::open(
        host,
        route,
        collateral,
        collateral_amount,
        &payload.tokens,
        &payload.amounts,
    )?;
    let no_fees = vec![0; payload.tokens.len()];
    let ctx = settle(host, route, payload, &payload.tokens, &payload.amounts, &no_fees)?;
    bridge::close(host, open)?;
    Ok(ctx)
}

fn ensure_sender<H: Host>(
    host: &H,
    provider: AccountId,
    initiator: Option<AccountId>,
) -> Result<()> {
    if host.caller() != provider {
        return Err(Error::InvalidCallbackSender);
    }
    match initiator {
        Some(initiator) if initiator != host.this() => Err(Error::InvalidCallbackSender),
        _ => Ok(()),
    }
}

/// The provider must have lent exactly what the registered request asked for.
fn ensure_legs(
    tokens: &[AccountId],
    amounts: &[u128],
    expected: &[AccountId],
    expected_amounts: &[u128],
) -> Result<()> {
    if tokens != expected || amounts != expected_amounts {
        return Err(Error::FingerprintMismatch);
    }
    Ok(())
}

fn route_of(payload: &FlashPayload, provider: Provider) -> Result<&'static Route> {
    let route = routes::find(payload.route)?;
    if route.provider != provider {
        return Err(Error::UnknownRoute);
    }
    Ok(route)
}

fn amount_due(amount: u128, fee: u128) -> Result<u128> {
    amount.checked_add(fee).ok_or(Error::Overflow)
}

/// Lending pool callback. Repayment is pulled by the pool.
pub fn on_lending_pool_loan<H: Host>(
    host: &mut H,
    assets: &[AccountId],
    amounts: &[u128],
    premiums: &[u128],
    initiator: AccountId,
    params: &[u8],
) -> Result<bool> {
    let pool = host.config().lending_pool;
    ensure_sender(&*host, pool, Some(initiator))?;
    let payload = fingerprint::verify(host, params)?;
    let route = route_of(&payload, Provider::LendingPool)?;
    if premiums.len() != assets.len() {
        return Err(Error::ArityMismatch);
    }
    ensure_legs(assets, amounts, &payload.tokens, &payload.amounts)?;

    settle(host, route, &payload, assets, amounts, premiums)?;
    for ((asset, amount), premium) in assets.iter().zip(amounts).zip(premiums) {
        host.approve(*asset, pool, amount_due(*amount, *premium)?)?;
    }
    Ok(true)
}

/// Stable mint callback (ERC-3156). Repayment is pulled by the mint module.
pub fn on_stable_mint_loan<H: Host>(
    host: &mut H,
    initiator: AccountId,
    token: AccountId,
    amount: u128,
    fee: u128,
    data: &[u8],
) -> Result<Fingerprint> {
    let minter = host.config().stable_mint;
    ensure_sender(&*host, minter, Some(initiator))?;
    let payload = fingerprint::verify(host, data)?;
    let route = route_of(&payload, Provider::StableMint)?;

    let due = match route.bridge {
        None => {
            if token != host.config().stable_token {
                return Err(Error::UnsupportedAsset);
            }
            ensure_legs(&[token], &[amount], &payload.tokens, &payload.amounts)?;
            settle(host, route, &payload, &[token], &[amount], &[fee])?;
            amount_due(amount, fee)?
        }
        Some(_) => {
            if fee != 0 {
                return Err(Error::FeeNotZero);
            }
            let (collateral, collateral_amount) = route.bridge_asset(&*host);
            ensure_legs(&[token], &[amount], &[collateral], &[collateral_amount])?;
            settle_bridged(host, route, &payload, token, amount)?;
            amount
        }
    };
    host.approve(token, minter, due)?;
    Ok(fingerprint::fingerprint(iflash::ierc3156::CALLBACK_SUCCESS_PREIMAGE))
}

/// Vault callback. Repayment is pushed back to the vault.
pub fn on_vault_loan<H: Host>(
    host: &mut H,
    tokens: &[AccountId],
    amounts: &[u128],
    fee_amounts: &[u128],
    user_data: &[u8],
) -> Result<()> {
    let vault = host.config().vault;
    ensure_sender(&*host, vault, None)?;
    let payload = fingerprint::verify(host, user_data)?;
    let route = route_of(&payload, Provider::Vault)?;
    if fee_amounts.len() != tokens.len() {
        return Err(Error::ArityMismatch);
    }

    match route.bridge {
        None => {
            let (expected, expected_amounts) = routes::vault_legs(&*host, &payload)?;
            ensure_legs(tokens, amounts, &expected, &expected_amounts)?;
            settle(host, route, &payload, tokens, amounts, fee_amounts)?;
        }
        Some(_) => {
            if fee_amounts.iter().any(|fee| *fee != 0) {
                return Err(Error::FeeNotZero);
            }
            let (collateral, collateral_amount) = route.bridge_asset(&*host);
            ensure_legs(tokens, amounts, &[collateral], &[collateral_amount])?;
            settle_bridged(host, route, &payload, collateral, collateral_amount)?;
        }
    }
    for ((token, amount), fee) in tokens.iter().zip(amounts).zip(fee_amounts) {
        host.transfer(*token, vault, amount_due(*amount, *fee)?)?;
    }
    Ok(())
}
