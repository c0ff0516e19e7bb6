//! Wrapper turning a rebasing staked token into a non-rebasing derivative.

use ink::primitives::AccountId;

pub const WRAP: [u8; 4] = ink::selector_bytes!("IWrappedStaking::wrap");
pub const UNWRAP: [u8; 4] = ink::selector_bytes!("IWrappedStaking::unwrap");
pub const WRAPPED_FOR_STAKED: [u8; 4] = ink::selector_bytes!("IWrappedStaking::wrapped_for_staked");
pub const STAKED_FOR_WRAPPED: [u8; 4] = ink::selector_bytes!("IWrappedStaking::staked_for_wrapped");

#[ink::trait_definition]
pub trait IWrappedStaking {
    /// Pulls `staked` tokens from the caller and mints the wrapped amount.
    #[ink(message)]
    fn wrap(&mut self, staked: u128) -> u128;

    /// Burns `wrapped` tokens of the caller and returns the staked amount.
    #[ink(message)]
    fn unwrap(&mut self, wrapped: u128) -> u128;

    /// Quote: wrapped amount corresponding to `staked`.
    #[ink(message)]
    fn wrapped_for_staked(&self, staked: u128) -> u128;

    /// Quote: staked amount corresponding to `wrapped`.
    #[ink(message)]
    fn staked_for_wrapped(&self, wrapped: u128) -> u128;

    /// The staked token being wrapped.
    #[ink(message)]
    fn staked_token(&self) -> AccountId;
}
