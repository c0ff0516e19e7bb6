#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod admin;
pub mod bridge;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod fees;
pub mod fingerprint;
pub mod host;
pub mod ordering;
pub mod registry;
pub mod routes;
pub mod settlement;

#[cfg(test)]
mod mock;

#[ink::contract]
mod flash_aggregator {
    use crate::{
        admin::AdminState,
        dispatcher,
        errors::{Error, Result},
        fees::DEFAULT_FEE_BPS,
        events::{
            LogCollectRevenue, LogFeeOverride, LogFlashloan, LogMarketRegistered,
            LogOwnershipTransferred, LogWhitelist,
        },
        host::{BridgeOp, Chain, Fingerprint, FlashState, ProviderConfig},
        routes, settlement,
    };
    use iflash::{
        ierc3156::IERC3156FlashBorrower, lending_pool::ILendingPoolReceiver,
        vault::IFlashLoanRecipient,
    };
    use ink::codegen::Env as _;
    use ink::{
        env::{
            call::{build_call, ExecutionInput, Selector},
            debug_println, CallFlags, DefaultEnvironment,
        },
        prelude::vec::Vec,
        storage::Lazy,
    };

    #[ink(storage)]
    pub struct FlashAggregator {
        admin: AdminState,
        config: ProviderConfig,
        /// Single-flight lock. Lazy so reentrant frames see it immediately.
        in_flight: Lazy<bool>,
        /// Fingerprint of the request waiting for its provider callback.
        outstanding: Lazy<Option<Fingerprint>>,
    }

    impl FlashAggregator {
        /// Creates a new [`FlashAggregator`] owned by the deployer.
        ///
        /// ## Params:
        /// - `config`: Providers, bridge sizing, staking pair and treasury.
        /// - `default_bps`: Fee charged when no override applies (1 == 0.01%),
        ///   [`DEFAULT_FEE_BPS`] if `None`.
        #[ink(constructor)]
        pub fn new(config: ProviderConfig, default_bps: Option<u32>) -> Result<Self> {
            let default_bps = default_bps.unwrap_or(DEFAULT_FEE_BPS);
            Ok(Self {
                admin: AdminState::new(Self::env().caller(), default_bps)?,
                config,
                in_flight: Lazy::new(),
                outstanding: Lazy::new(),
            })
        }

        /// Borrows `amounts` of `tokens` through `route`.
        ///
        /// ## Params:
        /// - `tokens`: Assets to borrow, in any order, without repeats.
        /// - `amounts`: Amount of each asset.
        /// - `route`: Route id, see [`Self::get_routes`].
        /// - `data`: Passed untouched to the caller's receiver logic.
        /// - `reserved`: Ignored.
        ///
        /// The caller receives the assets and control inside the provider
        /// callback and must return `amount + fee` of each.
        #[ink(message)]
        pub fn flash_loan(
            &mut self,
            tokens: Vec<AccountId>,
            amounts: Vec<u128>,
            route: u32,
            data: Vec<u8>,
            reserved: Vec<u8>,
        ) -> Result<()> {
            dispatcher::flash_loan(self, tokens, amounts, route, data, reserved)
                .inspect_err(|error| debug_println!("flash_loan on route {route}: {error:?}"))
        }

        /// Ids of every supported route.
        #[ink(message)]
        pub fn get_routes(&self) -> Vec<u32> {
            routes::route_ids()
        }

        /// Sweeps the balance above each token's dust reserve to the treasury.
        ///
        /// ## Returns:
        /// - The amount swept per token, in order.
        #[ink(message)]
        pub fn transfer_fee_to_treasury(&mut self, tokens: Vec<AccountId>) -> Result<Vec<u128>> {
            let amounts = dispatcher::transfer_fee_to_treasury(self, &tokens)?;
            self.env().emit_event(LogCollectRevenue {
                treasury: self.config.treasury,
                tokens,
                amounts: amounts.clone(),
            });
            Ok(amounts)
        }

        /// Fee in bps `account` pays on `route`.
        #[ink(message)]
        pub fn calculate_fee_bps(&self, route: u32, account: AccountId) -> Result<u32> {
            routes::find(route)?;
            Ok(self.admin.fees().resolve_bps(route, account))
        }

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.admin.owner()
        }

        #[ink(message)]
        pub fn is_whitelisted(&self, account: AccountId) -> bool {
            self.admin.fees().is_whitelisted(account)
        }

        #[ink(message)]
        pub fn market_of(&self, asset: AccountId) -> Option<AccountId> {
            self.admin.registry().market(asset)
        }

        #[ink(message)]
        pub fn config(&self) -> ProviderConfig {
            self.config.clone()
        }

        #[ink(message)]
        pub fn set_whitelisted(&mut self, account: AccountId, whitelisted: bool) -> Result<()> {
            self.ensure_idle()?;
            let caller = self.env().caller();
            self.admin.fees_mut(caller)?.set_whitelisted(account, whitelisted);
            self.env().emit_event(LogWhitelist { account, whitelisted });
            Ok(())
        }

        /// Sets, or clears with `None`, the fee `account` pays on every route.
        #[ink(message)]
        pub fn set_caller_fee(&mut self, account: AccountId, bps: Option<u32>) -> Result<()> {
            self.ensure_idle()?;
            let caller = self.env().caller();
            self.admin.fees_mut(caller)?.set_caller_bps(account, bps)?;
            self.env().emit_event(LogFeeOverride {
                route: None,
                caller: Some(account),
                bps,
            });
            Ok(())
        }

        /// Sets, or clears with `None`, the fee of `route`.
        #[ink(message)]
        pub fn set_route_fee(&mut self, route: u32, bps: Option<u32>) -> Result<()> {
            self.ensure_idle()?;
            routes::find(route)?;
            let caller = self.env().caller();
            self.admin.fees_mut(caller)?.set_route_bps(route, bps)?;
            self.env().emit_event(LogFeeOverride {
                route: Some(route),
                caller: None,
                bps,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn set_default_fee(&mut self, bps: u32) -> Result<()> {
            self.ensure_idle()?;
            let caller = self.env().caller();
            self.admin.fees_mut(caller)?.set_default_bps(bps)?;
            self.env().emit_event(LogFeeOverride {
                route: None,
                caller: None,
                bps: Some(bps),
            });
            Ok(())
        }

        /// Registers the collateral market lending `asset`.
        ///
        /// The market is asked for its underlying asset, which must be `asset`.
        #[ink(message)]
        pub fn register_market(&mut self, asset: AccountId, market: AccountId) -> Result<()> {
            self.ensure_idle()?;
            let caller = self.env().caller();
            self.admin.ensure_owner(caller)?;
            let underlying = self.market_underlying(market)?;
            self.admin.registry_mut(caller)?.register(asset, market, underlying)?;
            self.env().emit_event(LogMarketRegistered { asset, market });
            Ok(())
        }

        #[ink(message)]
        pub fn transfer_ownership(&mut self, new_owner: AccountId) -> Result<()> {
            self.ensure_idle()?;
            let previous = self.admin.owner();
            self.admin.transfer_ownership(self.env().caller(), new_owner)?;
            self.env().emit_event(LogOwnershipTransferred {
                previous,
                owner: new_owner,
            });
            Ok(())
        }

        /// Admin state is written back when a message ends, so it must not
        /// change underneath an outer frame that is still running.
        fn ensure_idle(&self) -> Result<()> {
            if FlashState::in_flight(self) {
                return Err(Error::AlreadyInProgress);
            }
            Ok(())
        }
    }

    /// Flattens a cross-contract call outcome, logging and mapping any
    /// environment or dispatch failure to `failure`.
    fn settle_call<T>(
        what: &str,
        outcome: core::result::Result<ink::MessageResult<T>, ink::env::Error>,
        failure: Error,
    ) -> Result<T> {
        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                debug_println!("{what}: dispatch error {error:?}");
                Err(failure)
            }
            Err(error) => {
                debug_println!("{what}: call failed {error:?}");
                Err(failure)
            }
        }
    }

    /// Logs a failed provider callback and narrows it to the provider error.
    fn callback_failure(what: &str, error: Error) -> iflash::Error {
        debug_println!("{what} callback failed: {error:?}");
        error.into()
    }

    impl ILendingPoolReceiver for FlashAggregator {
        #[ink(message)]
        fn execute_operation(
            &mut self,
            assets: Vec<AccountId>,
            amounts: Vec<u128>,
            premiums: Vec<u128>,
            initiator: AccountId,
            params: Vec<u8>,
        ) -> iflash::Result<bool> {
            settlement::on_lending_pool_loan(self, &assets, &amounts, &premiums, initiator, &params)
                .map_err(|error| callback_failure("lending pool", error))
        }
    }

    impl IERC3156FlashBorrower for FlashAggregator {
        /// Returns `keccak256("ERC3156FlashBorrower.onFlashLoan")` on success.
        #[ink(message)]
        fn on_flash_loan(
            &mut self,
            initiator: AccountId,
            token: AccountId,
            amount: u128,
            fee: u128,
            data: Vec<u8>,
        ) -> iflash::Result<[u8; 32]> {
            settlement::on_stable_mint_loan(self, initiator, token, amount, fee, &data)
                .map_err(|error| callback_failure("stable mint", error))
        }
    }

    impl IFlashLoanRecipient for FlashAggregator {
        #[ink(message)]
        fn receive_flash_loan(
            &mut self,
            tokens: Vec<AccountId>,
            amounts: Vec<u128>,
            fee_amounts: Vec<u128>,
            user_data: Vec<u8>,
        ) -> iflash::Result<()> {
            settlement::on_vault_loan(self, &tokens, &amounts, &fee_amounts, &user_data)
                .map_err(|error| callback_failure("vault", error))
        }
    }

    impl FlashState for FlashAggregator {
        fn config(&self) -> &ProviderConfig {
            &self.config
        }

        fn admin(&self) -> &AdminState {
            &self.admin
        }

        fn in_flight(&self) -> bool {
            self.in_flight.get().unwrap_or(false)
        }

        fn set_in_flight(&mut self, in_flight: bool) {
            self.in_flight.set(&in_flight);
        }

        fn outstanding(&self) -> Option<Fingerprint> {
            self.outstanding.get().flatten()
        }

        fn set_outstanding(&mut self, fingerprint: Option<Fingerprint>) {
            self.outstanding.set(&fingerprint);
        }
    }

    impl Chain for FlashAggregator {
        fn this(&self) -> AccountId {
            self.env().account_id()
        }

        fn caller(&self) -> AccountId {
            self.env().caller()
        }

        fn balance_of(&self, token: AccountId, owner: AccountId) -> Result<u128> {
            let outcome = build_call::<DefaultEnvironment>()
                .call(token)
                .call_v1()
                .gas_limit(0)
                .exec_input(
                    ExecutionInput::new(Selector::new(ierc20::BALANCE_OF)).push_arg(owner),
                )
                .returns::<u128>()
                .try_invoke();
            settle_call("balance_of", outcome, Error::TransferFailed)
        }

        fn decimals(&self, token: AccountId) -> Result<u8> {
            let outcome = build_call::<DefaultEnvironment>()
                .call(token)
                .call_v1()
                .gas_limit(0)
                .exec_input(ExecutionInput::new(Selector::new(ierc20::DECIMALS)))
                .returns::<u8>()
                .try_invoke();
            settle_call("decimals", outcome, Error::TransferFailed)
        }

        fn transfer(&mut self, token: AccountId, to: AccountId, amount: u128) -> Result<()> {
            let outcome = build_call::<DefaultEnvironment>()
                .call(token)
                .call_v1()
                .gas_limit(0)
                .exec_input(
                    ExecutionInput::new(Selector::new(ierc20::TRANSFER))
                        .push_arg(to)
                        .push_arg(amount),
                )
                .returns::<ierc20::Result<bool>>()
                .try_invoke();
            match settle_call("transfer", outcome, Error::TransferFailed)?? {
                true => Ok(()),
                false => Err(Error::TransferFailed),
            }
        }

        fn approve(&mut self, token: AccountId, spender: AccountId, amount: u128) -> Result<()> {
            let outcome = build_call::<DefaultEnvironment>()
                .call(token)
                .call_v1()
                .gas_limit(0)
                .exec_input(
                    ExecutionInput::new(Selector::new(ierc20::APPROVE))
                        .push_arg(spender)
                        .push_arg(amount),
                )
                .returns::<ierc20::Result<bool>>()
                .try_invoke();
            match settle_call("approve", outcome, Error::TransferFailed)?? {
                true => Ok(()),
                false => Err(Error::TransferFailed),
            }
        }

        fn is_delegated_account(&self, account: AccountId) -> bool {
            let Some(index) = self.config.account_index else {
                return false;
            };
            let outcome = build_call::<DefaultEnvironment>()
                .call(index)
                .call_v1()
                .gas_limit(0)
                .exec_input(
                    ExecutionInput::new(Selector::new(iflash::receiver::ACCOUNT_ID))
                        .push_arg(account),
                )
                .returns::<u64>()
                .try_invoke();
            let id = settle_call("account_id", outcome, Error::ProviderCallFailed);
            matches!(id, Ok(id) if id != 0)
        }

        fn call_receiver(
            &mut self,
            receiver: AccountId,
            tokens: &[AccountId],
            amounts: &[u128],
            fees: &[u128],
            initiator: AccountId,
            data: &[u8],
        ) -> Result<()> {
            let outcome = build_call::<DefaultEnvironment>()
                .call(receiver)
                .call_v1()
                .gas_limit(0)
                .call_flags(CallFlags::ALLOW_REENTRY)
                .exec_input(
                    ExecutionInput::new(Selector::new(iflash::receiver::EXECUTE_OPERATION))
                        .push_arg(tokens)
                        .push_arg(amounts)
                        .push_arg(fees)
                        .push_arg(initiator)
                        .push_arg(data),
                )
                .returns::<bool>()
                .try_invoke();
            match settle_call("execute_operation", outcome, Error::ReceiverFailed)? {
                true => Ok(()),
                false => Err(Error::ReceiverFailed),
            }
        }

        fn call_delegated(&mut self, account: AccountId, data: &[u8]) -> Result<()> {
            let outcome = build_call::<DefaultEnvironment>()
                .call(account)
                .call_v1()
                .gas_limit(0)
                .call_flags(CallFlags::ALLOW_REENTRY)
                .exec_input(
                    ExecutionInput::new(Selector::new(iflash::receiver::CAST)).push_arg(data),
                )
                .returns::<bool>()
                .try_invoke();
            match settle_call("cast", outcome, Error::ReceiverFailed)? {
                true => Ok(()),
                false => Err(Error::ReceiverFailed),
            }
        }

        fn lending_pool_flash_loan(
            &mut self,
            assets: &[AccountId],
            amounts: &[u128],
            payload: Vec<u8>,
        ) -> Result<()> {
            let this = self.env().account_id();
            let outcome = build_call::<DefaultEnvironment>()
                .call(self.config.lending_pool)
                .call_v1()
                .gas_limit(0)
                .call_flags(CallFlags::ALLOW_REENTRY)
                .exec_input(
                    ExecutionInput::new(Selector::new(iflash::lending_pool::FLASH_LOAN))
                        .push_arg(this)
                        .push_arg(assets)
                        .push_arg(amounts)
                        .push_arg(this)
                        .push_arg(payload),
                )
                .returns::<iflash::Result<()>>()
                .try_invoke();
            Ok(settle_call("lending pool flash_loan", outcome, Error::ProviderCallFailed)??)
        }

        fn stable_mint_flash_loan(
            &mut self,
            token: AccountId,
            amount: u128,
            payload: Vec<u8>,
        ) -> Result<()> {
            let this = self.env().account_id();
            let outcome = build_call::<DefaultEnvironment>()
                .call(self.config.stable_mint)
                .call_v1()
                .gas_limit(0)
                .call_flags(CallFlags::ALLOW_REENTRY)
                .exec_input(
                    ExecutionInput::new(Selector::new(iflash::ierc3156::FLASH_LOAN))
                        .push_arg(this)
                        .push_arg(token)
                        .push_arg(amount)
                        .push_arg(payload),
                )
                .returns::<iflash::Result<bool>>()
                .try_invoke();
            match settle_call("stable mint flash_loan", outcome, Error::ProviderCallFailed)?? {
                true => Ok(()),
                false => Err(Error::ProviderCallFailed),
            }
        }

        fn vault_flash_loan(
            &mut self,
            tokens: &[AccountId],
            amounts: &[u128],
            payload: Vec<u8>,
        ) -> Result<()> {
            let this = self.env().account_id();
            let outcome = build_call::<DefaultEnvironment>()
                .call(self.config.vault)
                .call_v1()
                .gas_limit(0)
                .call_flags(CallFlags::ALLOW_REENTRY)
                .exec_input(
                    ExecutionInput::new(Selector::new(iflash::vault::FLASH_LOAN))
                        .push_arg(this)
                        .push_arg(tokens)
                        .push_arg(amounts)
                        .push_arg(payload),
                )
                .returns::<iflash::Result<()>>()
                .try_invoke();
            Ok(settle_call("vault flash_loan", outcome, Error::ProviderCallFailed)??)
        }

        fn bridge(
            &mut self,
            market: AccountId,
            op: BridgeOp,
            asset: AccountId,
            amount: u128,
        ) -> Result<()> {
            let selector = match op {
                BridgeOp::Supply => iflash::market::SUPPLY,
                BridgeOp::Borrow => iflash::market::BORROW,
                BridgeOp::Repay => iflash::market::REPAY,
                BridgeOp::Withdraw => iflash::market::WITHDRAW,
            };
            let outcome = build_call::<DefaultEnvironment>()
                .call(market)
                .call_v1()
                .gas_limit(0)
                .exec_input(
                    ExecutionInput::new(Selector::new(selector))
                        .push_arg(asset)
                        .push_arg(amount),
                )
                .returns::<iflash::Result<()>>()
                .try_invoke();
            Ok(settle_call("bridge", outcome, Error::ProviderCallFailed)??)
        }

        fn market_underlying(&self, market: AccountId) -> Result<AccountId> {
            let outcome = build_call::<DefaultEnvironment>()
                .call(market)
                .call_v1()
                .gas_limit(0)
                .exec_input(ExecutionInput::new(Selector::new(iflash::market::UNDERLYING)))
                .returns::<AccountId>()
                .try_invoke();
            settle_call("underlying", outcome, Error::InvalidMarket)
        }

        fn wrapped_for_staked(&self, wrapper: AccountId, staked: u128) -> Result<u128> {
            self.call_wrapper(wrapper, iflash::staking::WRAPPED_FOR_STAKED, staked)
        }

        fn staked_for_wrapped(&self, wrapper: AccountId, wrapped: u128) -> Result<u128> {
            self.call_wrapper(wrapper, iflash::staking::STAKED_FOR_WRAPPED, wrapped)
        }

        fn wrap(&mut self, wrapper: AccountId, staked: u128) -> Result<u128> {
            self.call_wrapper(wrapper, iflash::staking::WRAP, staked)
        }

        fn unwrap(&mut self, wrapper: AccountId, wrapped: u128) -> Result<u128> {
            self.call_wrapper(wrapper, iflash::staking::UNWRAP, wrapped)
        }

        fn emit_flashloan(&mut self, event: LogFlashloan) {
            self.env().emit_event(event);
        }
    }

    impl FlashAggregator {
        /// Every wrapper entrypoint takes one amount and returns the other side.
        fn call_wrapper(
            &self,
            wrapper: AccountId,
            selector: [u8; 4],
            amount: u128,
        ) -> Result<u128> {
            let outcome = build_call::<DefaultEnvironment>()
                .call(wrapper)
                .call_v1()
                .gas_limit(0)
                .exec_input(ExecutionInput::new(Selector::new(selector)).push_arg(amount))
                .returns::<u128>()
                .try_invoke();
            settle_call("staking wrapper", outcome, Error::ProviderCallFailed)
        }
    }


}
