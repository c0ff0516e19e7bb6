use ink::{prelude::vec::Vec, primitives::AccountId};

/// Emitted once a flash loan settled and every provider was repaid.
#[ink::event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFlashloan {
    #[ink(topic)]
    pub caller: AccountId,
    #[ink(topic)]
    pub route: u32,
    pub tokens: Vec<AccountId>,
    pub amounts: Vec<u128>,
}

/// Emitted when accumulated fees are swept to the treasury.
#[ink::event]
pub struct LogCollectRevenue {
    #[ink(topic)]
    pub treasury: AccountId,
    pub tokens: Vec<AccountId>,
    pub amounts: Vec<u128>,
}

#[ink::event]
pub struct LogWhitelist {
    #[ink(topic)]
    pub account: AccountId,
    pub whitelisted: bool,
}

/// `caller` is `None` for a route-wide override.
#[ink::event]
pub struct LogFeeOverride {
    pub route: Option<u32>,
    pub caller: Option<AccountId>,
    pub bps: Option<u32>,
}

#[ink::event]
pub struct LogMarketRegistered {
    #[ink(topic)]
    pub asset: AccountId,
    pub market: AccountId,
}

#[ink::event]
pub struct LogOwnershipTransferred {
    #[ink(topic)]
    pub previous: AccountId,
    #[ink(topic)]
    pub owner: AccountId,
}
