//! The seam between the settlement engine and the chain.
//!
//! The engine only talks to contract storage through [`FlashState`] and to
//! other contracts through [`Chain`]. The contract implements both on top of
//! its storage and `build_call`; unit tests implement them in memory.

use crate::{
    admin::AdminState,
    errors::Result,
    events::LogFlashloan,
};
use ink::{prelude::vec::Vec, primitives::AccountId};

/// keccak256 of an encoded flash payload.
pub type Fingerprint = [u8; 32];

/// A staked token and the non-rebasing wrapper a vault lends instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[ink::scale_derive(Encode, Decode, TypeInfo)]
#[cfg_attr(feature = "std", derive(ink::storage::traits::StorageLayout))]
pub struct StakingPair {
    pub staked: AccountId,
    /// Both the wrapped token and the wrapper contract.
    pub wrapped: AccountId,
}

/// Addresses and amounts the aggregator is deployed against.
#[derive(Debug, Clone, PartialEq, Eq)]
#[ink::scale_derive(Encode, Decode, TypeInfo)]
#[cfg_attr(feature = "std", derive(ink::storage::traits::StorageLayout))]
pub struct ProviderConfig {
    /// Multi-asset money market; also a collateral market for bridges.
    pub lending_pool: AccountId,
    /// ERC-3156 mint module of the stable asset.
    pub stable_mint: AccountId,
    pub stable_token: AccountId,
    /// Stable amount minted to collateralise a bridge.
    pub stable_bridge_amount: u128,
    pub vault: AccountId,
    /// Token borrowed from the vault to collateralise a bridge.
    pub vault_bridge_token: AccountId,
    pub vault_bridge_amount: u128,
    pub staking: Option<StakingPair>,
    /// Index of delegated accounts; without one every caller is a direct receiver.
    pub account_index: Option<AccountId>,
    pub treasury: AccountId,
}

/// Collateral market operation of a bridge hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOp {
    Supply,
    Borrow,
    Repay,
    Withdraw,
}

/// How a caller receives control while it holds the liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    /// Implements `IFlashReceiver::execute_operation`.
    DirectReceiver,
    /// A composable account invoked through `IDelegatedAccount::cast`
    /// with the caller's payload.
    DelegatedAccount,
}

/// Contract storage as the engine sees it.
///
/// `in_flight` and `outstanding` are read by reentrant frames of the same
/// contract, so implementations must persist writes immediately.
pub trait FlashState {
    fn config(&self) -> &ProviderConfig;
    fn admin(&self) -> &AdminState;
    fn in_flight(&self) -> bool;
    fn set_in_flight(&mut self, in_flight: bool);
    fn outstanding(&self) -> Option<Fingerprint>;
    fn set_outstanding(&mut self, fingerprint: Option<Fingerprint>);
}

/// Environment queries and cross-contract calls.
pub trait Chain {
    /// Address of the aggregator itself.
    fn this(&self) -> AccountId;
    /// Immediate caller of the current entrypoint.
    fn caller(&self) -> AccountId;

    fn balance_of(&self, token: AccountId, owner: AccountId) -> Result<u128>;
    fn decimals(&self, token: AccountId) -> Result<u8>;
    fn transfer(&mut self, token: AccountId, to: AccountId, amount: u128) -> Result<()>;
    fn approve(&mut self, token: AccountId, spender: AccountId, amount: u128) -> Result<()>;

    /// Capability check against the account index.
    fn is_delegated_account(&self, account: AccountId) -> bool;
    /// Hands control to a direct receiver.
    fn call_receiver(
        &mut self,
        receiver: AccountId,
        tokens: &[AccountId],
        amounts: &[u128],
        fees: &[u128],
        initiator: AccountId,
        data: &[u8],
    ) -> Result<()>;
    /// Hands control to a delegated account.
    fn call_delegated(&mut self, account: AccountId, data: &[u8]) -> Result<()>;

    /// Borrow initiation. These calls re-enter the aggregator through the
    /// provider's callback before they return.
    fn lending_pool_flash_loan(
        &mut self,
        assets: &[AccountId],
        amounts: &[u128],
        payload: Vec<u8>,
    ) -> Result<()>;
    fn stable_mint_flash_loan(
        &mut self,
        token: AccountId,
        amount: u128,
        payload: Vec<u8>,
    ) -> Result<()>;
    fn vault_flash_loan(
        &mut self,
        tokens: &[AccountId],
        amounts: &[u128],
        payload: Vec<u8>,
    ) -> Result<()>;

    fn bridge(
        &mut self,
        market: AccountId,
        op: BridgeOp,
        asset: AccountId,
        amount: u128,
    ) -> Result<()>;
    fn market_underlying(&self, market: AccountId) -> Result<AccountId>;

    fn wrapped_for_staked(&self, wrapper: AccountId, staked: u128) -> Result<u128>;
    fn staked_for_wrapped(&self, wrapper: AccountId, wrapped: u128) -> Result<u128>;
    fn wrap(&mut self, wrapper: AccountId, staked: u128) -> Result<u128>;
    fn unwrap(&mut self, wrapper: AccountId, wrapped: u128) -> Result<u128>;

    fn emit_flashloan(&mut self, event: LogFlashloan);
}

/// Everything the engine needs.
pub trait Host: FlashState + Chain {}

impl<T: FlashState + Chain> Host for T {}

/// Balances of `owner` for every token, in order.
pub fn balances<H: Chain>(
    host: &H,
    tokens: &[AccountId],
    owner: AccountId,
) -> Result<Vec<u128>> {
    tokens.iter().map(|token| host.balance_of(*token, owner)).collect()
}

/// Resolves how `account` is handed the liquidity.
pub fn receiver_kind<H: Chain>(host: &H, account: AccountId) -> ReceiverKind {
    if host.is_delegated_account(account) {
        ReceiverKind::DelegatedAccount
    } else {
        ReceiverKind::DirectReceiver
    }
}
