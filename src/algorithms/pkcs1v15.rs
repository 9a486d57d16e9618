//! PKCS#1 v1.5 encryption padding as described in [RFC8017 § 7.2].
//!
//! [RFC8017 § 7.2]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.2

use rand_core::CryptoRngCore;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

/// Minimum number of non-zero padding bytes between the header and the
/// separator.
const MIN_PS_LEN: i32 = 8;

/// Largest message PKCS#1 v1.5 can carry in a `k` byte block.
#[inline]
pub(crate) fn max_message_len(k: usize) -> usize {
    k.saturating_sub(11)
}

/// Fills the provided slice with random values, which are guaranteed
/// to not be zero.
#[inline]
fn non_zero_random_bytes<R: CryptoRngCore + ?Sized>(rng: &mut R, data: &mut [u8]) {
    rng.fill_bytes(data);

    for el in data {
        while *el == 0u8 {
            rng.fill_bytes(core::slice::from_mut(el));
        }
    }
}

/// Applied the padding scheme from PKCS#1 v1.5 for encryption.  The message must be no longer than
/// the length of the public modulus minus 11 bytes.
pub(crate) fn pkcs1v15_encrypt_pad<R>(
    rng: &mut R,
    msg: &[u8],
    k: usize,
) -> Result<Zeroizing<Vec<u8>>>
where
    R: CryptoRngCore + ?Sized,
{
    if msg.len() + 11 > k {
        return Err(Error::MessageTooLong);
    }

    // EM = 0x00 || 0x02 || PS || 0x00 || M
    let mut em = Zeroizing::new(vec![0u8; k]);
    em[1] = 2;
    non_zero_random_bytes(rng, &mut em[2..k - msg.len() - 1]);
    em[k - msg.len() - 1] = 0;
    em[k - msg.len()..].copy_from_slice(msg);
    Ok(em)
}

/// Removes the encryption padding scheme from PKCS#1 v1.5.
///
/// Note that whether this function returns an error or not discloses secret
/// information. If an attacker can cause this function to run repeatedly and
/// learn whether each instance returned an error then they may be able to
/// recover the plaintext (Bleichenbacher's attack).
#[inline]
pub(crate) fn pkcs1v15_encrypt_unpad(em: &[u8], k: usize) -> Result<Vec<u8>> {
    let (valid, index) = decrypt_inner(em, k)?;
    if valid == 0 {
        return Err(Error::InvalidPadding);
    }

    Ok(em[index as usize..].to_vec())
}

/// Scans the PKCS1v15 padding. It returns one or zero in valid that indicates
/// whether the plaintext was correctly structured. Every byte of `em` is
/// visited regardless of where the separator sits. If the plaintext was valid
/// then index contains the index of the original message in em.
#[inline]
fn decrypt_inner(em: &[u8], k: usize) -> Result<(u8, u32)> {
    if k < 11 || em.len() != k {
        return Err(Error::InvalidPadding);
    }

    let first_byte_is_zero = em[0].ct_eq(&0u8);
    let second_byte_is_two = em[1].ct_eq(&2u8);

    // The remainder of the plaintext must be a string of non-zero random
    // octets, followed by a 0, followed by the message.
    //   looking_for_index: 1 iff we are still looking for the zero.
    //   index: the offset of the first zero byte.
    let mut looking_for_index = 1u8;
    let mut index = 0u32;

    for (i, el) in em.iter().enumerate().skip(2) {
        let equals0 = el.ct_eq(&0u8);
        index.conditional_assign(&(i as u32), Choice::from(looking_for_index) & equals0);
        looking_for_index.conditional_assign(&0u8, equals0);
    }

    // The PS padding must be at least 8 bytes long, and it starts two
    // bytes into em.
    let valid_ps = Choice::from((((2i32 + MIN_PS_LEN - index as i32 - 1i32) >> 31) & 1) as u8);
    let valid =
        first_byte_is_zero & second_byte_is_two & Choice::from(!looking_for_index & 1) & valid_ps;
    index = u32::conditional_select(&0, &(index + 1), valid);

    Ok((valid.unwrap_u8(), index))
}
