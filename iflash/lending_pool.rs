//! Multi-asset money market with a pull-style flash loan entrypoint.

use crate::Result;
use ink::{prelude::vec::Vec, primitives::AccountId};

/// Selector of [`ILendingPool::flash_loan`].
pub const FLASH_LOAN: [u8; 4] = ink::selector_bytes!("ILendingPool::flash_loan");

/// Selector of [`ILendingPoolReceiver::execute_operation`].
pub const EXECUTE_OPERATION: [u8; 4] =
    ink::selector_bytes!("ILendingPoolReceiver::execute_operation");

#[ink::trait_definition]
pub trait ILendingPool {
    /// Lends `amounts` of `assets` to `receiver`, then calls
    /// [`ILendingPoolReceiver::execute_operation`] on it.
    ///
    /// Once the callback returns, the pool pulls `amount + premium` of every
    /// asset from `receiver` through the allowance it was granted.
    #[ink(message)]
    fn flash_loan(
        &mut self,
        receiver: AccountId,
        assets: Vec<AccountId>,
        amounts: Vec<u128>,
        on_behalf_of: AccountId,
        params: Vec<u8>,
    ) -> Result<()>;

    /// Premium charged on flash loans, in basis points.
    #[ink(message)]
    fn flash_loan_premium(&self) -> u32;
}

/// Callback side of [`ILendingPool::flash_loan`].
#[ink::trait_definition]
pub trait ILendingPoolReceiver {
    /// Runs with the borrowed `assets` already transferred in. `premiums` are
    /// owed on top of `amounts`; the receiver approves the pool for both.
    ///
    /// ## Returns:
    /// - `Ok(true)` if the pool may pull repayment.
    #[ink(message)]
    fn execute_operation(
        &mut self,
        assets: Vec<AccountId>,
        amounts: Vec<u128>,
        premiums: Vec<u128>,
        initiator: AccountId,
        params: Vec<u8>,
    ) -> Result<bool>;
}
