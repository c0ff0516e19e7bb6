//! Canonical ordering of a flash request.
//!
//! Providers receive token lists strictly ascending by address, so two
//! requests naming the same assets in a different order encode, and
//! therefore fingerprint, identically.

use crate::errors::{Error, Result};
use ink::{prelude::vec::Vec, primitives::AccountId};

/// Sorts `tokens` ascending, permuting `amounts` along with them.
///
/// Fails with [`Error::ArityMismatch`] if the lists differ in length and
/// with [`Error::DuplicateAsset`] if a token appears twice. Duplicates are
/// rejected, never merged.
pub fn canonicalize(
    tokens: Vec<AccountId>,
    amounts: Vec<u128>,
) -> Result<(Vec<AccountId>, Vec<u128>)> {
    if tokens.len() != amounts.len() {
        return Err(Error::ArityMismatch);
    }
    let mut pairs: Vec<(AccountId, u128)> = tokens.into_iter().zip(amounts).collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(Error::DuplicateAsset);
    }
    Ok(pairs.into_iter().unzip())
}

/// True if `tokens` is strictly ascending, i.e. sorted and duplicate free.
pub fn is_canonical(tokens: &[AccountId]) -> bool {
    tokens.windows(2).all(|w| w[0] < w[1])
}
