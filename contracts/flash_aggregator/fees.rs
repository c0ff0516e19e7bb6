//! Basis-point fee model.

use crate::errors::{Error, Result};
use ink::{primitives::AccountId, storage::Mapping};

/// Fee denominator: 1 bps == 0.01%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Default aggregator fee, in bps.
pub const DEFAULT_FEE_BPS: u32 = 9;

/// Returns `floor(amount * bps / 10000)`.
///
/// `amount` is split into `q * 10000 + r` so the product never leaves
/// `u128`: `floor(amount * bps / 10000) == q * bps + floor(r * bps / 10000)`.
pub fn compute_fee(amount: u128, bps: u32) -> u128 {
    let denominator = u128::from(BPS_DENOMINATOR);
    let bps = u128::from(bps);
    let q = amount / denominator;
    let r = amount % denominator;
    q.saturating_mul(bps)
        .saturating_add(r * bps / denominator)
}

/// Fails with [`Error::InvalidFee`] if `bps` exceeds 100%.
pub fn ensure_bps(bps: u32) -> Result<u32> {
    if bps > BPS_DENOMINATOR {
        return Err(Error::InvalidFee);
    }
    Ok(bps)
}

/// Fee configuration: a default, per-route and per-caller overrides, and a
/// whitelist of callers that borrow for free.
#[ink::storage_item]
#[derive(Debug, Default)]
pub struct FeeSchedule {
    default_bps: u32,
    route_bps: Mapping<u32, u32>,
    caller_bps: Mapping<AccountId, u32>,
    whitelist: Mapping<AccountId, ()>,
}

impl FeeSchedule {
    pub fn new(default_bps: u32) -> Result<Self> {
        Ok(Self {
            default_bps: ensure_bps(default_bps)?,
            route_bps: Mapping::new(),
            caller_bps: Mapping::new(),
            whitelist: Mapping::new(),
        })
    }

    /// Fee in bps charged to `caller` on `route`.
    pub fn resolve_bps(&self, route: u32, caller: AccountId) -> u32 {
        if self.whitelist.contains(caller) {
            return 0;
        }
        self.caller_bps
            .get(caller)
            .or_else(|| self.route_bps.get(route))
            .unwrap_or(self.default_bps)
    }

    pub fn default_bps(&self) -> u32 {
        self.default_bps
    }

    pub fn is_whitelisted(&self, account: AccountId) -> bool {
        self.whitelist.contains(account)
    }

    pub fn set_default_bps(&mut self, bps: u32) -> Result<()> {
        self.default_bps = ensure_bps(bps)?;
        Ok(())
    }

    /// Sets or, with `None`, clears the fee of `route`.
    pub fn set_route_bps(&mut self, route: u32, bps: Option<u32>) -> Result<()> {
        match bps {
            Some(bps) => {
                self.route_bps.insert(route, &ensure_bps(bps)?);
            }
            None => self.route_bps.remove(route),
        }
        Ok(())
    }

    /// Sets or, with `None`, clears the fee of `caller`.
    pub fn set_caller_bps(&mut self, caller: AccountId, bps: Option<u32>) -> Result<()> {
        match bps {
            Some(bps) => {
                self.caller_bps.insert(caller, &ensure_bps(bps)?);
            }
            None => self.caller_bps.remove(caller),
        }
        Ok(())
    }

    pub fn set_whitelisted(&mut self, account: AccountId, whitelisted: bool) {
        if whitelisted {
            self.whitelist.insert(account, &());
        } else {
            self.whitelist.remove(account);
        }
    }
}
