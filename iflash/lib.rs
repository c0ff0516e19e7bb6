//! Interfaces of the external liquidity providers a flash aggregator routes
//! through, and of the caller-side contracts it hands liquidity to.
#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod ierc3156;
pub mod lending_pool;
pub mod market;
pub mod receiver;
pub mod staking;
pub mod vault;

/// The provider result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by provider entrypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
#[ink::scale_derive(Encode, Decode, TypeInfo)]
pub enum Error {
    /// Returned if currency is not available.
    UnsupportedCurrency,
    /// Returned if the provider holds less than the requested amount.
    InsufficientLiquidity,
    /// Returned if external `IERC20` transfer call failed.
    TransferFailed,
    /// Returned if the borrower callback failed.
    CallbackFailed,
    /// Returned if the loan was not paid back in full.
    RepayFailed,
    /// Returned if a market operation would leave the position unhealthy.
    InsufficientCollateral,
}
