//! Single-use proof binding a provider callback to the request that caused it.
//!
//! Exactly one fingerprint can be outstanding. That is only sound because
//! the dispatcher lets a single flash loan run at a time.

use crate::{
    errors::{Error, Result},
    host::{Fingerprint, FlashState},
};
use ink::{
    env::hash::{HashOutput, Keccak256},
    prelude::vec::Vec,
    primitives::AccountId,
    scale::{Decode, Encode},
};

/// Request context carried through the provider and back.
#[derive(Debug, Clone, PartialEq, Eq)]
#[ink::scale_derive(Encode, Decode, TypeInfo)]
pub struct FlashPayload {
    pub route: u32,
    /// Canonical order.
    pub tokens: Vec<AccountId>,
    pub amounts: Vec<u128>,
    /// Original caller of `flash_loan`.
    pub sender: AccountId,
    /// Caller payload, opaque to the aggregator.
    pub data: Vec<u8>,
}

impl FlashPayload {
    pub fn decode_from(mut bytes: &[u8]) -> Result<Self> {
        Self::decode(&mut bytes).map_err(|_| Error::DecodeFailed)
    }
}

/// keccak256 of `bytes`.
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    let mut output = <Keccak256 as HashOutput>::Type::default();
    ink::env::hash_bytes::<Keccak256>(bytes, &mut output);
    output
}

/// Encodes `payload`, stores its fingerprint as the outstanding one and
/// returns the bytes to hand to the provider.
pub fn register<S: FlashState>(state: &mut S, payload: &FlashPayload) -> Vec<u8> {
    let encoded = payload.encode();
    state.set_outstanding(Some(fingerprint(&encoded)));
    encoded
}

/// Checks `inbound` against the outstanding fingerprint and consumes it.
///
/// A payload is accepted once; afterwards the slot is empty and any replay
/// fails with [`Error::FingerprintMismatch`].
pub fn verify<S: FlashState>(state: &mut S, inbound: &[u8]) -> Result<FlashPayload> {
    match state.outstanding() {
        Some(expected) if expected == fingerprint(inbound) => {}
        _ => return Err(Error::FingerprintMismatch),
    }
    state.set_outstanding(None);
    FlashPayload::decode_from(inbound)
}
