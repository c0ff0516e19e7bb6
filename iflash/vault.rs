//! DEX vault lending its pooled reserves; repayment is pushed back.

use crate::Result;
use ink::{prelude::vec::Vec, primitives::AccountId};

/// Selector of [`IVault::flash_loan`].
pub const FLASH_LOAN: [u8; 4] = ink::selector_bytes!("IVault::flash_loan");

/// Selector of [`IFlashLoanRecipient::receive_flash_loan`].
pub const RECEIVE_FLASH_LOAN: [u8; 4] =
    ink::selector_bytes!("IFlashLoanRecipient::receive_flash_loan");

#[ink::trait_definition]
pub trait IVault {
    /// Sends `amounts` of `tokens` to `recipient` and calls
    /// [`IFlashLoanRecipient::receive_flash_loan`] on it.
    ///
    /// The vault checks its own balances afterwards: each token must have
    /// grown by at least its fee amount, otherwise the whole call reverts.
    #[ink(message)]
    fn flash_loan(
        &mut self,
        recipient: AccountId,
        tokens: Vec<AccountId>,
        amounts: Vec<u128>,
        user_data: Vec<u8>,
    ) -> Result<()>;
}

/// Callback side of [`IVault::flash_loan`].
#[ink::trait_definition]
pub trait IFlashLoanRecipient {
    /// Must transfer `amount + fee_amount` of each token back to the vault
    /// before returning `Ok(())`.
    #[ink(message)]
    fn receive_flash_loan(
        &mut self,
        tokens: Vec<AccountId>,
        amounts: Vec<u128>,
        fee_amounts: Vec<u128>,
        user_data: Vec<u8>,
    ) -> Result<()>;
}
