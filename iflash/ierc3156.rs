//! Trait definition for a single-asset flash lender compatible with
//! `IERC3156FlashLender`, used as the stable-asset mint module.

use crate::Result;
use ink::{prelude::vec::Vec, primitives::AccountId};

/// Selector of [`IERC3156FlashLender::flash_loan`].
pub const FLASH_LOAN: [u8; 4] = ink::selector_bytes!("IERC3156FlashLender::flash_loan");

/// Selector of [`IERC3156FlashBorrower::on_flash_loan`].
pub const ON_FLASH_LOAN: [u8; 4] = ink::selector_bytes!("IERC3156FlashBorrower::on_flash_loan");

/// Preimage of the value a borrower returns from `on_flash_loan` to signal success.
pub const CALLBACK_SUCCESS_PREIMAGE: &[u8] = b"ERC3156FlashBorrower.onFlashLoan";

/// A trait for flash lending of ERC20 tokens, following the IERC3156 standard.
#[ink::trait_definition]
pub trait IERC3156FlashLender {
    /// Loan `amount` tokens to `receiver`, and take them back plus a
    /// `flash_fee` after the callback.
    ///
    /// ## Params:
    /// - `receiver`: The contract receiving the tokens.
    ///   Must implement [`IERC3156FlashBorrower`].
    /// - `token`: The loan currency.
    /// - `amount`: The amount of tokens lent.
    /// - `data`: A data parameter to be passed on to the `receiver` for any custom use.
    ///
    /// ## Returns:
    /// - `bool`: True if the flash loan succeeds.
    #[ink(message)]
    fn flash_loan(
        &mut self,
        receiver: AccountId,
        token: AccountId,
        amount: u128,
        data: Vec<u8>,
    ) -> Result<bool>;

    /// The fee to be charged for a given loan.
    #[ink(message)]
    fn flash_fee(&self, token: AccountId, amount: u128) -> Result<u128>;

    /// The amount of currency available to be lent.
    #[ink(message)]
    fn max_flash_loan(&self, token: AccountId) -> Result<u128>;
}

/// A trait for flash borrowers, following the IERC3156 standard.
#[ink::trait_definition]
pub trait IERC3156FlashBorrower {
    /// Receive a flash loan.
    ///
    /// ## Params:
    /// - `initiator`: The initiator of the loan.
    /// - `token`: The loan currency.
    /// - `amount`: The amount of tokens lent.
    /// - `fee`: The additional amount of tokens to repay.
    /// - `data`: Arbitrary data structure, intended to contain user-defined parameters.
    ///
    /// ## Returns:
    /// - `Ok(keccak256(CALLBACK_SUCCESS_PREIMAGE))` on success. Lenders decode
    ///   the reply as `Result<[u8; 32]>`, never as a bare hash.
    #[ink(message)]
    fn on_flash_loan(
        &mut self,
        initiator: AccountId,
        token: AccountId,
        amount: u128,
        fee: u128,
        data: Vec<u8>,
    ) -> Result<[u8; 32]>;
}
