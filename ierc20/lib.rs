#![cfg_attr(not(feature = "std"), no_std, no_main)]

use ink::primitives::AccountId;

/// The IERC20 result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Selector of [`IERC20::balance_of`].
pub const BALANCE_OF: [u8; 4] = ink::selector_bytes!("IERC20::balance_of");
/// Selector of [`IERC20::transfer`].
pub const TRANSFER: [u8; 4] = ink::selector_bytes!("IERC20::transfer");
/// Selector of [`IERC20::approve`].
pub const APPROVE: [u8; 4] = ink::selector_bytes!("IERC20::approve");
/// Selector of [`IERC20::decimals`].
pub const DECIMALS: [u8; 4] = ink::selector_bytes!("IERC20::decimals");

/// The slice of the ERC-20 surface an aggregator touches while it holds
/// borrowed liquidity: balance snapshots, pushes, allowances for pulling
/// providers and the precision used to size treasury reserves.
#[ink::trait_definition]
pub trait IERC20 {
    /// Returns the balance of the given `account`.
    #[ink(message)]
    fn balance_of(&self, account: AccountId) -> u128;

    /// Returns the number of decimals the token amounts are expressed in.
    #[ink(message)]
    fn decimals(&self) -> u8;

    /// Transfers `value` tokens from the caller's account to `to`.
    ///
    /// Returns `true` if the operation succeeded.
    #[ink(message)]
    fn transfer(&mut self, to: AccountId, value: u128) -> Result<bool>;

    /// Returns the remaining number of tokens that `spender` can spend
    /// on behalf of `owner` through `transfer_from`.
    #[ink(message)]
    fn allowance(&self, owner: AccountId, spender: AccountId) -> u128;

    /// Sets `value` as the allowance of `spender` over the caller’s tokens.
    ///
    /// Pulling providers collect their repayment through this allowance.
    #[ink(message)]
    fn approve(&mut self, spender: AccountId, value: u128) -> Result<bool>;

    /// Transfers `value` tokens from `from` to `to` using the allowance mechanism.
    #[ink(message)]
    fn transfer_from(&mut self, from: AccountId, to: AccountId, value: u128) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[ink::scale_derive(Encode, Decode, TypeInfo)]
pub enum Error {
    /// Indicates an error related to the current balance of a sender.
    /// Used in transfers.
    InsufficientBalance {
        sender: AccountId,
        balance: u128,
        needed: u128,
    },

    /// Indicates a failure with the token receiver. Used in transfers.
    InvalidReceiver { receiver: AccountId },

    /// Indicates a failure with the spender’s allowance. Used in transfers.
    InsufficientAllowance {
        spender: AccountId,
        allowance: u128,
        needed: u128,
    },

    /// Indicates a failure with the spender to be approved.
    /// Used in approvals.
    InvalidSpender { spender: AccountId },
}
