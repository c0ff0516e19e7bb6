//! Owner-gated configuration, kept apart from the settlement data flow.

use crate::{
    errors::{Error, Result},
    fees::FeeSchedule,
    registry::TokenRegistry,
};
use ink::primitives::AccountId;

#[ink::storage_item]
#[derive(Debug)]
pub struct AdminState {
    owner: AccountId,
    fees: FeeSchedule,
    registry: TokenRegistry,
}

impl AdminState {
    pub fn new(owner: AccountId, default_bps: u32) -> Result<Self> {
        Ok(Self {
            owner,
            fees: FeeSchedule::new(default_bps)?,
            registry: TokenRegistry::default(),
        })
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn ensure_owner(&self, caller: AccountId) -> Result<()> {
        if caller != self.owner {
            return Err(Error::NotOwner);
        }
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: AccountId, new_owner: AccountId) -> Result<()> {
        self.ensure_owner(caller)?;
        self.owner = new_owner;
        Ok(())
    }

    pub fn fees_mut(&mut self, caller: AccountId) -> Result<&mut FeeSchedule> {
        self.ensure_owner(caller)?;
        Ok(&mut self.fees)
    }

    pub fn registry_mut(&mut self, caller: AccountId) -> Result<&mut TokenRegistry> {
        self.ensure_owner(caller)?;
        Ok(&mut self.registry)
    }
}
