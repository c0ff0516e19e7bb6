//! Public entry into the aggregator: normalize, validate, lock, initiate.

use crate::{
    errors::{Error, Result},
    events::LogFlashloan,
    fingerprint::FlashPayload,
    host::Host,
    ordering, routes,
};
use ink::{prelude::vec::Vec, primitives::AccountId};

/// Borrows `amounts` of `tokens` through `route` on behalf of the caller.
///
/// The caller gets the liquidity and control during the provider's
/// callback and must leave every balance at `initial + fee` by the time it
/// returns. `reserved` is accepted for interface compatibility and ignored.
pub fn flash_loan<H: Host>(
    host: &mut H,
    tokens: Vec<AccountId>,
    amounts: Vec<u128>,
    route: u32,
    data: Vec<u8>,
    _reserved: Vec<u8>,
) -> Result<()> {
    let (tokens, amounts) = ordering::canonicalize(tokens, amounts)?;

    // A nested request must fail without touching the outer request's lock.
    if host.in_flight() {
        return Err(Error::AlreadyInProgress);
    }
    host.set_in_flight(true);

    let sender = host.caller();
    let payload = FlashPayload {
        route,
        tokens,
        amounts,
        sender,
        data,
    };
    let result = dispatch(host, &payload);

    host.set_outstanding(None);
    host.set_in_flight(false);
    result?;

    host.emit_flashloan(LogFlashloan {
        caller: sender,
        route,
        tokens: payload.tokens,
        amounts: payload.amounts,
    });
    Ok(())
}

fn dispatch<H: Host>(host: &mut H, payload: &FlashPayload) -> Result<()> {
    let route = routes::find(payload.route)?;
    route.validate(&*host, &payload.tokens)?;
    route.initiate(host, payload)
}

/// Balance kept back on a sweep so the aggregator never holds exactly zero
/// of a token it routes.
pub fn dust_reserve(decimals: u8) -> u128 {
    match decimals {
        18 => 10_000_000_000,
        13.. => 10_000,
        8..=12 => 100,
        _ => 10,
    }
}

/// Moves accumulated fees in `tokens` to the treasury, keeping the dust
/// reserve of each. Returns the swept amounts, in order.
pub fn transfer_fee_to_treasury<H: Host>(host: &mut H, tokens: &[AccountId]) -> Result<Vec<u128>> {
    if host.in_flight() {
        return Err(Error::AlreadyInProgress);
    }
    let this = host.this();
    let treasury = host.config().treasury;
    let mut swept = Vec::with_capacity(tokens.len());
    for token in tokens {
        let reserve = dust_reserve(host.decimals(*token)?);
        let amount = host.balance_of(*token, this)?.saturating_sub(reserve);
        if amount > 0 {
            host.transfer(*token, treasury, amount)?;
        }
        swept.push(amount);
    }
    Ok(swept)
}
