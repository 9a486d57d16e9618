//! Encryption and Decryption using [OAEP padding](https://datatracker.ietf.org/doc/html/rfc8017#section-7.1).
//!
use digest::{Digest, FixedOutputReset};
use rand_core::CryptoRngCore;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroizing;

use super::ct::fixed_time_eq_choice;
use super::mgf::mgf1_xor_digest;
use crate::errors::{Error, Result};

// 2**61 -1 (pow is not const yet)
pub(crate) const MAX_LABEL_LEN: u64 = 2_305_843_009_213_693_951;

/// Largest message OAEP with digest `D` can carry in a `k` byte block.
#[inline]
pub(crate) fn max_message_len<D: Digest>(k: usize) -> usize {
    k.saturating_sub(2 * <D as Digest>::output_size() + 2)
}

/// Pads `msg` into a `k` byte OAEP block using `D` for both the label hash
/// and MGF1.
///
/// The message must be no longer than the length of the public modulus minus
/// `2 + (2 * hash.size())`.
#[inline]
pub(crate) fn oaep_encrypt_digest<R, D>(
    rng: &mut R,
    msg: &[u8],
    label: Option<&str>,
    k: usize,
) -> Result<Zeroizing<Vec<u8>>>
where
    R: CryptoRngCore + ?Sized,
    D: Digest + FixedOutputReset,
{
    let h_size = <D as Digest>::output_size();

    let label = label.unwrap_or_default();
    if label.len() as u64 > MAX_LABEL_LEN {
        return Err(Error::LabelTooLong);
    }

    if msg.len() + 2 * h_size + 2 > k {
        return Err(Error::MessageTooLong);
    }

    let p_hash = D::digest(label.as_bytes());

    let mut em = Zeroizing::new(vec![0u8; k]);

    let (_, payload) = em.split_at_mut(1);
    let (seed, db) = payload.split_at_mut(h_size);
    rng.fill_bytes(seed);

    // Data block DB =  pHash || PS || 01 || M
    let db_len = k - h_size - 1;

    db[0..h_size].copy_from_slice(&p_hash);
    db[db_len - msg.len() - 1] = 1;
    db[db_len - msg.len()..].copy_from_slice(msg);

    let mut mgf_digest = D::new();
    mgf1_xor_digest(db, &mut mgf_digest, seed);
    mgf1_xor_digest(seed, &mut mgf_digest, db);

    Ok(em)
}

/// Removes OAEP padding from the `k` byte block `em`.
///
/// Every structural failure (leading byte, label hash, separator) is
/// reported as the same [`Error::DecryptionFailed`], and the checks are
/// combined without branching on secret data.
#[inline]
pub(crate) fn oaep_decrypt_digest<D>(em: &mut [u8], label: Option<&str>, k: usize) -> Result<Vec<u8>>
where
    D: Digest + FixedOutputReset,
{
    let h_size = <D as Digest>::output_size();

    let label = label.unwrap_or_default();
    if label.len() as u64 > MAX_LABEL_LEN {
        return Err(Error::LabelTooLong);
    }

    let expected_p_hash = D::digest(label.as_bytes());

    let res = decrypt_inner(em, h_size, &expected_p_hash, k, |seed, db| {
        let mut mgf_digest = D::new();
        mgf1_xor_digest(seed, &mut mgf_digest, db);
        mgf1_xor_digest(db, &mut mgf_digest, seed);
    })?;
    if res.is_none().into() {
        return Err(Error::DecryptionFailed);
    }

    let (out, index) = res.unwrap();

    Ok(out[index as usize..].to_vec())
}

/// Decrypts OAEP padding. It returns one or zero in valid that indicates whether the
/// plaintext was correctly structured.
#[inline]
fn decrypt_inner<MGF: FnMut(&mut [u8], &mut [u8])>(
    em: &mut [u8],
    h_size: usize,
    expected_p_hash: &[u8],
    k: usize,
    mut mgf: MGF,
) -> Result<CtOption<(Zeroizing<Vec<u8>>, u32)>> {
    if k < h_size * 2 + 2 || em.len() != k {
        return Err(Error::DecryptionFailed);
    }

    let first_byte_is_zero = em[0].ct_eq(&0u8);

    let (_, payload) = em.split_at_mut(1);
    let (seed, db) = payload.split_at_mut(h_size);

    // seed = maskedSeed ^ MGF(maskedDB), then DB = maskedDB ^ MGF(seed)
    mgf(seed, db);

    let hash_are_equal = fixed_time_eq_choice(&db[0..h_size], expected_p_hash);

    // The remainder of the plaintext must be zero or more 0x00, followed
    // by 0x01, followed by the message.
    //   looking_for_index: 1 if we are still looking for the 0x01
    //   index: the offset of the first 0x01 byte
    //   nonzero_before_one: 1 if we saw a non-zero byte before the 1
    let mut looking_for_index = Choice::from(1u8);
    let mut index = 0u32;
    let mut nonzero_before_one = Choice::from(0u8);

    for (i, el) in db.iter().skip(h_size).enumerate() {
        let equals0 = el.ct_eq(&0u8);
        let equals1 = el.ct_eq(&1u8);
        index.conditional_assign(&(i as u32), looking_for_index & equals1);
        looking_for_index &= !equals1;
        nonzero_before_one |= looking_for_index & !equals0;
    }

    let valid = first_byte_is_zero & hash_are_equal & !nonzero_before_one & !looking_for_index;

    Ok(CtOption::new(
        (Zeroizing::new(em.to_vec()), index + 2 + (h_size * 2) as u32),
        valid,
    ))
}
