//! PKCS#1 v1.5 encryption as described in [RFC8017 § 7.2].
//!
//! [RFC8017 § 7.2]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.2

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use crate::algorithms::modexp::ModExpAlgorithm;
use crate::algorithms::pad::{uint_to_be_pad, uint_to_zeroizing_be_pad};
use crate::algorithms::pkcs1v15::*;
use crate::algorithms::rsa::{rsa_decrypt_and_check, rsa_encrypt};
use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::{PaddingScheme, PublicKeyParts};

/// Encryption using PKCS#1 v1.5 padding.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pkcs1v15Encrypt;

impl PaddingScheme for Pkcs1v15Encrypt {
    fn decrypt<Rng: CryptoRngCore + ?Sized>(
        &self,
        rng: Option<&mut Rng>,
        priv_key: &RsaPrivateKey,
        ciphertext: &[u8],
        algorithm: ModExpAlgorithm,
    ) -> Result<Vec<u8>> {
        decrypt(rng, priv_key, ciphertext, algorithm)
    }

    fn encrypt<Rng: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut Rng,
        pub_key: &RsaPublicKey,
        msg: &[u8],
        algorithm: ModExpAlgorithm,
    ) -> Result<Vec<u8>> {
        encrypt(rng, pub_key, msg, algorithm)
    }

    fn max_message_len(&self, k: usize) -> usize {
        max_message_len(k)
    }
}

/// Encrypts the given message with RSA and the padding
/// scheme from PKCS#1 v1.5.  The message must be no longer than the
/// length of the public modulus minus 11 bytes.
#[inline]
fn encrypt<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    pub_key: &RsaPublicKey,
    msg: &[u8],
    algorithm: ModExpAlgorithm,
) -> Result<Vec<u8>> {
    let em = pkcs1v15_encrypt_pad(rng, msg, pub_key.size())?;
    let int = BigUint::from_bytes_be(&em);
    uint_to_be_pad(rsa_encrypt(pub_key, &int, algorithm)?, pub_key.size())
}

/// Decrypts a plaintext using RSA and the padding scheme from PKCS#1 v1.5.
///
/// If an `rng` is passed, it uses RSA blinding to avoid timing side-channel attacks.
///
/// Note that whether this function returns an error or not discloses secret
/// information. If an attacker can cause this function to run repeatedly and
/// learn whether each instance returned an error then they may be able to
/// recover the plaintext.
#[inline]
fn decrypt<R: CryptoRngCore + ?Sized>(
    rng: Option<&mut R>,
    priv_key: &RsaPrivateKey,
    ciphertext: &[u8],
    algorithm: ModExpAlgorithm,
) -> Result<Vec<u8>> {
    if ciphertext.len() != priv_key.size() {
        return Err(Error::InvalidCiphertext);
    }

    let ciphertext = BigUint::from_bytes_be(ciphertext);
    let em = rsa_decrypt_and_check(priv_key, rng, &ciphertext, algorithm)?;
    let em = uint_to_zeroizing_be_pad(em, priv_key.size())?;

    pkcs1v15_encrypt_unpad(&em, priv_key.size())
}
