//! Conversions between `BigUint` values and fixed-length big-endian blocks.

use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

/// Returns a new vector of the given length, with 0s left padded.
#[inline]
fn left_pad(input: &[u8], padded_len: usize) -> Result<Vec<u8>> {
    if input.len() > padded_len {
        return Err(Error::InvalidPadLen);
    }

    let mut out = vec![0u8; padded_len];
    out[padded_len - input.len()..].copy_from_slice(input);
    Ok(out)
}

/// Converts input to the new vector of the given length, using BE and with 0s left padded.
#[inline]
pub(crate) fn uint_to_be_pad(input: BigUint, padded_len: usize) -> Result<Vec<u8>> {
    left_pad(&input.to_bytes_be(), padded_len)
}

/// Like [`uint_to_be_pad`], for values holding secret data. Intermediate
/// copies are wiped and the block comes back in a [`Zeroizing`] wrapper.
#[inline]
pub(crate) fn uint_to_zeroizing_be_pad(
    input: BigUint,
    padded_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let m = Zeroizing::new(input);
    let m = Zeroizing::new(m.to_bytes_be());
    left_pad(&m, padded_len).map(Zeroizing::new)
}
