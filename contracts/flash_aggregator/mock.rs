//! In-memory chain for engine tests.
//!
//! Tokens are balance and allowance maps. Providers lend out of their own
//! balances, invoke the aggregator's callback synchronously with themselves
//! as caller, then collect the way the real contract does.

use crate::{
    admin::AdminState,
    dispatcher,
    errors::{Error, Result},
    events::LogFlashloan,
    fees::compute_fee,
    fingerprint,
    host::{BridgeOp, Chain, Fingerprint, FlashState, ProviderConfig, StakingPair},
    settlement,
};
use ink::{primitives::AccountId, scale::Decode};
use std::collections::{BTreeMap, BTreeSet};

pub fn account(n: u8) -> AccountId {
    AccountId::from([n; 32])
}

pub const THIS: u8 = 1;
pub const LENDING_POOL: u8 = 10;
pub const STABLE_MINT: u8 = 11;
pub const STABLE: u8 = 12;
pub const VAULT: u8 = 13;
pub const WETH: u8 = 14;
pub const STAKED: u8 = 15;
pub const WRAPPED: u8 = 16;
pub const TREASURY: u8 = 17;
pub const INDEX: u8 = 18;
pub const X: u8 = 20;
pub const Y: u8 = 21;
pub const ALICE: u8 = 40;
pub const BOB: u8 = 41;
pub const SMART_ACCOUNT: u8 = 42;
pub const MALLORY: u8 = 66;

/// Market handle lending `asset`.
pub fn market(asset: u8) -> AccountId {
    account(asset + 100)
}

pub const LIQUIDITY: u128 = 1_000_000_000_000;
pub const BRIDGE_AMOUNT: u128 = 5_000_000;

/// What a receiver does with the liquidity it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Returns `amount + fee` of every asset.
    Repay,
    /// Returns `units` less than owed of the asset at `index`.
    Shortfall { index: usize, units: u128 },
    /// Tries to start another flash loan, then repays.
    Reenter,
    /// Reports failure.
    Decline,
}

/// Provider-side manipulation of the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tamper {
    /// Calls back with an inflated first amount.
    Amount,
    /// Calls back with a payload naming another sender.
    Payload,
}

/// What a direct receiver saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub receiver: AccountId,
    pub tokens: Vec<AccountId>,
    pub amounts: Vec<u128>,
    pub fees: Vec<u128>,
}

pub struct MockHost {
    pub config: ProviderConfig,
    /// Backed by the off-chain contract storage: hosts built under the same
    /// environment share it.
    pub admin: AdminState,
    in_flight: bool,
    outstanding: Option<Fingerprint>,
    pub caller: AccountId,
    balances: BTreeMap<(AccountId, AccountId), u128>,
    allowances: BTreeMap<(AccountId, AccountId, AccountId), u128>,
    pub decimals: BTreeMap<AccountId, u8>,
    pub receivers: BTreeMap<AccountId, Behaviour>,
    pub delegated: BTreeSet<AccountId>,
    pub underlying: BTreeMap<AccountId, AccountId>,
    collateral: BTreeMap<(AccountId, AccountId), u128>,
    debt: BTreeMap<(AccountId, AccountId), u128>,
    pub pool_premium_bps: u32,
    pub mint_fee: u128,
    pub vault_fee_bps: u32,
    pub tamper: Option<Tamper>,
    pub events: Vec<LogFlashloan>,
    pub received: Vec<Received>,
    pub nested: Option<Result<()>>,
    pub last_payload: Vec<u8>,
    /// State-changing external calls made so far.
    pub calls: usize,
}

impl MockHost {
    pub fn new() -> Self {
        let config = ProviderConfig {
            lending_pool: account(LENDING_POOL),
            stable_mint: account(STABLE_MINT),
            stable_token: account(STABLE),
            stable_bridge_amount: BRIDGE_AMOUNT,
            vault: account(VAULT),
            vault_bridge_token: account(WETH),
            vault_bridge_amount: BRIDGE_AMOUNT,
            staking: Some(StakingPair {
                staked: account(STAKED),
                wrapped: account(WRAPPED),
            }),
            account_index: Some(account(INDEX)),
            treasury: account(TREASURY),
        };
        let admin = AdminState::new(account(ALICE), crate::fees::DEFAULT_FEE_BPS)
            .expect("default fee is valid");
        let mut host = Self {
            config,
            admin,
            in_flight: false,
            outstanding: None,
            caller: account(ALICE),
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            decimals: BTreeMap::new(),
            receivers: BTreeMap::new(),
            delegated: BTreeSet::new(),
            underlying: BTreeMap::new(),
            collateral: BTreeMap::new(),
            debt: BTreeMap::new(),
            pool_premium_bps: 0,
            mint_fee: 0,
            vault_fee_bps: 0,
            tamper: None,
            events: Vec::new(),
            received: Vec::new(),
            nested: None,
            last_payload: Vec::new(),
            calls: 0,
        };
        for token in [X, Y, STABLE, WETH, WRAPPED] {
            host.mint(account(token), account(LENDING_POOL), LIQUIDITY);
            host.mint(account(token), account(VAULT), LIQUIDITY);
            host.mint(account(token), market(token), LIQUIDITY);
            host.underlying.insert(market(token), account(token));
        }
        host.receivers.insert(account(ALICE), Behaviour::Repay);
        host.receivers.insert(account(BOB), Behaviour::Repay);
        host
    }

    pub fn mint(&mut self, token: AccountId, owner: AccountId, amount: u128) {
        *self.balances.entry((token, owner)).or_default() += amount;
    }

    pub fn balance(&self, token: AccountId, owner: AccountId) -> u128 {
        self.balances.get(&(token, owner)).copied().unwrap_or(0)
    }

    /// Registers the markets of `assets` through the owner.
    pub fn register_markets(&mut self, assets: &[u8]) {
        for asset in assets {
            self.admin
                .registry_mut(account(ALICE))
                .expect("alice owns")
                .register(account(*asset), market(*asset), account(*asset))
                .expect("fresh market");
        }
    }

    pub fn debt_of(&self, market: AccountId, asset: AccountId) -> u128 {
        self.debt.get(&(market, asset)).copied().unwrap_or(0)
    }

    pub fn collateral_of(&self, market: AccountId, asset: AccountId) -> u128 {
        self.collateral.get(&(market, asset)).copied().unwrap_or(0)
    }

    fn this_account(&self) -> AccountId {
        account(THIS)
    }

    fn move_balance(
        &mut self,
        token: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<()> {
        let balance = self.balance(token, from);
        if balance < amount {
            return Err(ierc20::Error::InsufficientBalance {
                sender: from,
                balance,
                needed: amount,
            }
            .into());
        }
        self.balances.insert((token, from), balance - amount);
        self.mint(token, to, amount);
        Ok(())
    }

    /// `spender` pulls `amount` of `token` from `owner` through its allowance.
    fn pull(
        &mut self,
        token: AccountId,
        owner: AccountId,
        spender: AccountId,
        amount: u128,
    ) -> Result<()> {
        let key = (token, owner, spender);
        let allowance = self.allowances.get(&key).copied().unwrap_or(0);
        if allowance < amount {
            return Err(ierc20::Error::InsufficientAllowance {
                spender,
                allowance,
                needed: amount,
            }
            .into());
        }
        self.allowances.insert(key, allowance - amount);
        self.move_balance(token, owner, spender, amount)
    }

    fn burn(&mut self, token: AccountId, owner: AccountId, amount: u128) -> Result<()> {
        let balance = self.balance(token, owner);
        if balance < amount {
            return Err(ierc20::Error::InsufficientBalance {
                sender: owner,
                balance,
                needed: amount,
            }
            .into());
        }
        self.balances.insert((token, owner), balance - amount);
        Ok(())
    }

    /// Runs `callback` as `provider`, restoring the caller afterwards.
    fn as_caller<T>(&mut self, provider: AccountId, callback: impl FnOnce(&mut Self) -> T) -> T {
        let previous = core::mem::replace(&mut self.caller, provider);
        let result = callback(self);
        self.caller = previous;
        result
    }

    fn tampered(&self, amounts: &[u128], payload: Vec<u8>) -> (Vec<u128>, Vec<u8>) {
        match self.tamper {
            Some(Tamper::Amount) => {
                let mut amounts = amounts.to_vec();
                amounts[0] += 1;
                (amounts, payload)
            }
            Some(Tamper::Payload) => {
                let mut forged =
                    fingerprint::FlashPayload::decode_from(&payload).expect("own payload");
                forged.sender = account(MALLORY);
                (amounts.to_vec(), ink::scale::Encode::encode(&forged))
            }
            None => (amounts.to_vec(), payload),
        }
    }

    /// Hands control to `receiver` the way its behaviour prescribes.
    fn run_receiver(
        &mut self,
        receiver: AccountId,
        tokens: &[AccountId],
        amounts: &[u128],
        fees: &[u128],
    ) -> Result<()> {
        let this = self.this_account();
        let behaviour = self.receivers.get(&receiver).copied().unwrap_or(Behaviour::Repay);
        if behaviour == Behaviour::Decline {
            return Err(Error::ReceiverFailed);
        }
        if behaviour == Behaviour::Reenter {
            let (tokens, amounts) = (tokens.to_vec(), amounts.to_vec());
            let nested = self.as_caller(receiver, |host| {
                dispatcher::flash_loan(host, tokens, amounts, 1, Vec::new(), Vec::new())
            });
            self.nested = Some(nested);
        }
        let legs = tokens.iter().zip(amounts).zip(fees).enumerate();
        for (i, ((token, amount), fee)) in legs {
            let mut owed = amount + fee;
            if let Behaviour::Shortfall { index, units } = behaviour {
                if index == i {
                    owed -= units;
                }
            }
            self.move_balance(*token, receiver, this, owed)?;
        }
        Ok(())
    }
}

impl FlashState for MockHost {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn admin(&self) -> &AdminState {
        &self.admin
    }

    fn in_flight(&self) -> bool {
        self.in_flight
    }

    fn set_in_flight(&mut self, in_flight: bool) {
        self.in_flight = in_flight;
    }

    fn outstanding(&self) -> Option<Fingerprint> {
        self.outstanding
    }

    fn set_outstanding(&mut self, fingerprint: Option<Fingerprint>) {
        self.outstanding = fingerprint;
    }
}

impl Chain for MockHost {
    fn this(&self) -> AccountId {
        self.this_account()
    }

    fn caller(&self) -> AccountId {
        self.caller
    }

    fn balance_of(&self, token: AccountId, owner: AccountId) -> Result<u128> {
        Ok(self.balance(token, owner))
    }

    fn decimals(&self, token: AccountId) -> Result<u8> {
        Ok(self.decimals.get(&token).copied().unwrap_or(18))
    }

    fn transfer(&mut self, token: AccountId, to: AccountId, amount: u128) -> Result<()> {
        self.calls += 1;
        let this = self.this_account();
        self.move_balance(token, this, to, amount)
    }

    fn approve(&mut self, token: AccountId, spender: AccountId, amount: u128) -> Result<()> {
        self.calls += 1;
        let this = self.this_account();
        self.allowances.insert((token, this, spender), amount);
        Ok(())
    }

    fn is_delegated_account(&self, account: AccountId) -> bool {
        self.delegated.contains(&account)
    }

    fn call_receiver(
        &mut self,
        receiver: AccountId,
        tokens: &[AccountId],
        amounts: &[u128],
        fees: &[u128],
        _initiator: AccountId,
        _data: &[u8],
    ) -> Result<()> {
        self.calls += 1;
        self.received.push(Received {
            receiver,
            tokens: tokens.to_vec(),
            amounts: amounts.to_vec(),
            fees: fees.to_vec(),
        });
        self.run_receiver(receiver, tokens, amounts, fees)
    }

    /// A delegated account's payload is the list of `(token, amount)` it
    /// sends back.
    fn call_delegated(&mut self, account: AccountId, data: &[u8]) -> Result<()> {
        self.calls += 1;
        let this = self.this_account();
        let spells = Vec::<(AccountId, u128)>::decode(&mut &data[..])
            .map_err(|_| Error::ReceiverFailed)?;
        for (token, amount) in spells {
            self.move_balance(token, account, this, amount)?;
        }
        Ok(())
    }

    fn lending_pool_flash_loan(
        &mut self,
        assets: &[AccountId],
        amounts: &[u128],
        payload: Vec<u8>,
    ) -> Result<()> {
        self.calls += 1;
        self.last_payload = payload.clone();
        let (pool, this) = (self.config.lending_pool, self.this_account());
        let premiums: Vec<u128> = amounts
            .iter()
            .map(|amount| compute_fee(*amount, self.pool_premium_bps))
            .collect();
        for (asset, amount) in assets.iter().zip(amounts) {
            self.move_balance(*asset, pool, this, *amount)?;
        }
        let (lent, params) = self.tampered(amounts, payload);
        let accepted = self.as_caller(pool, |host| {
            settlement::on_lending_pool_loan(host, assets, &lent, &premiums, this, &params)
        })?;
        if !accepted {
            return Err(iflash::Error::CallbackFailed.into());
        }
        for ((asset, amount), premium) in assets.iter().zip(amounts).zip(&premiums) {
            self.pull(*asset, this, pool, amount + premium)?;
        }
        Ok(())
    }

    fn stable_mint_flash_loan(
        &mut self,
        token: AccountId,
        amount: u128,
        payload: Vec<u8>,
    ) -> Result<()> {
        self.calls += 1;
        self.last_payload = payload.clone();
        let (minter, this) = (self.config.stable_mint, self.this_account());
        let fee = self.mint_fee;
        self.mint(token, this, amount);
        let (lent, data) = self.tampered(&[amount], payload);
        let magic = self.as_caller(minter, |host| {
            settlement::on_stable_mint_loan(host, this, token, lent[0], fee, &data)
        })?;
        if magic != fingerprint::fingerprint(iflash::ierc3156::CALLBACK_SUCCESS_PREIMAGE) {
            return Err(iflash::Error::CallbackFailed.into());
        }
        self.pull(token, this, minter, amount + fee)?;
        self.burn(token, minter, amount)
    }

    fn vault_flash_loan(
        &mut self,
        tokens: &[AccountId],
        amounts: &[u128],
        payload: Vec<u8>,
    ) -> Result<()> {
        self.calls += 1;
        self.last_payload = payload.clone();
        let (vault, this) = (self.config.vault, self.this_account());
        let fees: Vec<u128> = amounts
            .iter()
            .map(|amount| compute_fee(*amount, self.vault_fee_bps))
            .collect();
        let before: Vec<u128> = tokens.iter().map(|t| self.balance(*t, vault)).collect();
        for (token, amount) in tokens.iter().zip(amounts) {
            self.move_balance(*token, vault, this, *amount)?;
        }
        let (lent, user_data) = self.tampered(amounts, payload);
        self.as_caller(vault, |host| {
            settlement::on_vault_loan(host, tokens, &lent, &fees, &user_data)
        })?;
        for ((token, before), fee) in tokens.iter().zip(before).zip(fees) {
            if self.balance(*token, vault) < before + fee {
                return Err(iflash::Error::RepayFailed.into());
            }
        }
        Ok(())
    }

    fn bridge(
        &mut self,
        market: AccountId,
        op: BridgeOp,
        asset: AccountId,
        amount: u128,
    ) -> Result<()> {
        self.calls += 1;
        let this = self.this_account();
        match op {
            BridgeOp::Supply => {
                self.pull(asset, this, market, amount)?;
                *self.collateral.entry((market, asset)).or_default() += amount;
            }
            BridgeOp::Borrow => {
                if self.collateral.values().all(|posted| *posted == 0) {
                    return Err(iflash::Error::InsufficientCollateral.into());
                }
                self.move_balance(asset, market, this, amount)?;
                *self.debt.entry((market, asset)).or_default() += amount;
            }
            BridgeOp::Repay => {
                self.pull(asset, this, market, amount)?;
                let owed = self.debt_of(market, asset);
                self.debt.insert((market, asset), owed.saturating_sub(amount));
            }
            BridgeOp::Withdraw => {
                let posted = self.collateral_of(market, asset);
                if posted < amount || self.debt.values().any(|owed| *owed > 0) {
                    return Err(iflash::Error::InsufficientCollateral.into());
                }
                self.collateral.insert((market, asset), posted - amount);
                self.move_balance(asset, market, this, amount)?;
            }
        }
        Ok(())
    }

    fn market_underlying(&self, market: AccountId) -> Result<AccountId> {
        self.underlying.get(&market).copied().ok_or(Error::InvalidMarket)
    }

    // One wrapped unit is worth 1.1 staked units.
    fn wrapped_for_staked(&self, _wrapper: AccountId, staked: u128) -> Result<u128> {
        Ok(staked * 10 / 11)
    }

    fn staked_for_wrapped(&self, _wrapper: AccountId, wrapped: u128) -> Result<u128> {
        Ok(wrapped * 11 / 10)
    }

    fn wrap(&mut self, wrapper: AccountId, staked: u128) -> Result<u128> {
        self.calls += 1;
        let this = self.this_account();
        let wrapped = self.wrapped_for_staked(wrapper, staked)?;
        self.move_balance(account(STAKED), this, wrapper, staked)?;
        self.mint(wrapper, this, wrapped);
        Ok(wrapped)
    }

    fn unwrap(&mut self, wrapper: AccountId, wrapped: u128) -> Result<u128> {
        self.calls += 1;
        let this = self.this_account();
        let staked = self.staked_for_wrapped(wrapper, wrapped)?;
        self.burn(wrapper, this, wrapped)?;
        self.mint(account(STAKED), this, staked);
        Ok(staked)
    }

    fn emit_flashloan(&mut self, event: LogFlashloan) {
        self.events.push(event);
    }
}
