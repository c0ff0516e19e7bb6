//! Caller-side interfaces: how the aggregator hands borrowed liquidity over.

use ink::{prelude::vec::Vec, primitives::AccountId};

/// Selector of [`IFlashReceiver::execute_operation`].
pub const EXECUTE_OPERATION: [u8; 4] = ink::selector_bytes!("IFlashReceiver::execute_operation");
/// Selector of [`IDelegatedAccount::cast`].
pub const CAST: [u8; 4] = ink::selector_bytes!("IDelegatedAccount::cast");
/// Selector of [`IAccountIndex::account_id`].
pub const ACCOUNT_ID: [u8; 4] = ink::selector_bytes!("IAccountIndex::account_id");

/// A contract receiving aggregated flash liquidity.
#[ink::trait_definition]
pub trait IFlashReceiver {
    /// Flash loan callback.
    ///
    /// Called by the aggregator once `amounts` of `tokens` have been
    /// transferred. Before returning, the receiver must have sent back
    /// `amounts[i] + fees[i]` of every token.
    ///
    /// ## Parameters:
    /// - `initiator`: The account that requested the loan.
    /// - `data`: The opaque payload supplied with the request.
    ///
    /// ## Returns:
    /// - `true` if the receiver logic succeeded.
    #[ink(message)]
    fn execute_operation(
        &mut self,
        tokens: Vec<AccountId>,
        amounts: Vec<u128>,
        fees: Vec<u128>,
        initiator: AccountId,
        data: Vec<u8>,
    ) -> bool;
}

/// A composable smart account. Instead of a receiver callback it gets the
/// request payload handed to its generic entrypoint.
#[ink::trait_definition]
pub trait IDelegatedAccount {
    #[ink(message)]
    fn cast(&mut self, data: Vec<u8>) -> bool;
}

/// Registry of delegated accounts.
#[ink::trait_definition]
pub trait IAccountIndex {
    /// Returns the index of `account`, or 0 if it is not a delegated account.
    #[ink(message)]
    fn account_id(&self, account: AccountId) -> u64;
}
