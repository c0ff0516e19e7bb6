//! Collateralised borrowing used to bridge one provider's loan into another.
//!
//! Both the lending pool (one contract for every asset) and per-asset markets
//! expose this surface. Every operation pulls or pushes `asset` between the
//! caller and the market; pulls go through an `IERC20` allowance.

use crate::Result;
use ink::primitives::AccountId;

pub const SUPPLY: [u8; 4] = ink::selector_bytes!("ICollateralMarket::supply");
pub const BORROW: [u8; 4] = ink::selector_bytes!("ICollateralMarket::borrow");
pub const REPAY: [u8; 4] = ink::selector_bytes!("ICollateralMarket::repay");
pub const WITHDRAW: [u8; 4] = ink::selector_bytes!("ICollateralMarket::withdraw");
pub const UNDERLYING: [u8; 4] = ink::selector_bytes!("ICollateralMarket::underlying");

#[ink::trait_definition]
pub trait ICollateralMarket {
    /// Deposits `amount` of `asset` as collateral of the caller.
    #[ink(message)]
    fn supply(&mut self, asset: AccountId, amount: u128) -> Result<()>;

    /// Borrows `amount` of `asset` against the caller's collateral.
    #[ink(message)]
    fn borrow(&mut self, asset: AccountId, amount: u128) -> Result<()>;

    /// Repays `amount` of the caller's `asset` debt.
    #[ink(message)]
    fn repay(&mut self, asset: AccountId, amount: u128) -> Result<()>;

    /// Withdraws `amount` of the caller's `asset` collateral.
    #[ink(message)]
    fn withdraw(&mut self, asset: AccountId, amount: u128) -> Result<()>;

    /// The asset a single-asset market is denominated in.
    #[ink(message)]
    fn underlying(&self) -> AccountId;
}
