//! Encryption and Decryption using [OAEP padding](https://datatracker.ietf.org/doc/html/rfc8017#section-7.1).
//!
//! SHA-512 hashes the label and drives MGF1, so the largest message for a
//! `k` byte modulus is `k - 2 * 64 - 2` bytes: 126 bytes for a 2048-bit key.

use digest::{Digest, FixedOutputReset};
use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use sha2::Sha512;

use crate::algorithms::modexp::ModExpAlgorithm;
use crate::algorithms::oaep::*;
use crate::algorithms::pad::{uint_to_be_pad, uint_to_zeroizing_be_pad};
use crate::algorithms::rsa::{rsa_decrypt_and_check, rsa_encrypt};
use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::{PaddingScheme, PublicKeyParts};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Encryption and Decryption using OAEP padding with SHA-512 and MGF1-SHA-512.
///
/// - `label` is optional data that can be associated with the message. It
///   must be the same for encryption and decryption.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Oaep {
    /// Optional label.
    pub label: Option<String>,
}

impl Oaep {
    /// Create a new OAEP `PaddingScheme` with the default (empty) label.
    ///
    /// # Example
    /// ```
    /// use rsa_engine::{BigUint, Oaep, RsaPublicKey, traits::PaddingScheme, ModExpAlgorithm};
    ///
    /// let n = BigUint::parse_bytes(b"b2990f49c47dfa8cd400ae6a4d1b8a3b6a13642b23f28b003bfb97790ade9a4cc82b8b2a81747ddec08b6296e53a08c331687ef25c4bf4936ba1c0e6041e9d15", 16).unwrap();
    /// let key = RsaPublicKey::new(n, BigUint::from(65537u32)).unwrap();
    ///
    /// // A 512-bit modulus is too small to carry OAEP with SHA-512.
    /// let mut rng = rand::thread_rng();
    /// let res = Oaep::new().encrypt(&mut rng, &key, b"secret", ModExpAlgorithm::Baseline);
    /// assert!(res.is_err());
    /// ```
    pub fn new() -> Self {
        Self { label: None }
    }

    /// Create a new OAEP `PaddingScheme` with an associated `label`.
    pub fn new_with_label<S: AsRef<str>>(label: S) -> Self {
        Self {
            label: Some(label.as_ref().to_string()),
        }
    }
}

impl PaddingScheme for Oaep {
    fn decrypt<Rng: CryptoRngCore + ?Sized>(
        &self,
        rng: Option<&mut Rng>,
        priv_key: &RsaPrivateKey,
        ciphertext: &[u8],
        algorithm: ModExpAlgorithm,
    ) -> Result<Vec<u8>> {
        decrypt::<_, Sha512>(rng, priv_key, ciphertext, self.label.as_deref(), algorithm)
    }

    fn encrypt<Rng: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut Rng,
        pub_key: &RsaPublicKey,
        msg: &[u8],
        algorithm: ModExpAlgorithm,
    ) -> Result<Vec<u8>> {
        encrypt::<_, Sha512>(rng, pub_key, msg, self.label.as_deref(), algorithm)
    }

    fn max_message_len(&self, k: usize) -> usize {
        max_message_len::<Sha512>(k)
    }
}

/// Encrypts the given message with RSA and the padding scheme from
/// [PKCS#1 OAEP].
///
/// The message must be no longer than the length of the public modulus minus
/// `2 + (2 * hash.size())`.
///
/// [PKCS#1 OAEP]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.1
#[inline]
fn encrypt<R: CryptoRngCore + ?Sized, D: Digest + FixedOutputReset>(
    rng: &mut R,
    pub_key: &RsaPublicKey,
    msg: &[u8],
    label: Option<&str>,
    algorithm: ModExpAlgorithm,
) -> Result<Vec<u8>> {
    let em = oaep_encrypt_digest::<_, D>(rng, msg, label, pub_key.size())?;

    let int = BigUint::from_bytes_be(&em);
    uint_to_be_pad(rsa_encrypt(pub_key, &int, algorithm)?, pub_key.size())
}

/// Decrypts a plaintext using RSA and the padding scheme from [PKCS#1 OAEP].
///
/// If an `rng` is passed, it uses RSA blinding to avoid timing side-channel attacks.
///
/// Every padding failure is reported as [`Error::DecryptionFailed`]; the
/// caller cannot tell which check rejected the block.
///
/// [PKCS#1 OAEP]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.1
#[inline]
fn decrypt<R: CryptoRngCore + ?Sized, D: Digest + FixedOutputReset>(
    rng: Option<&mut R>,
    priv_key: &RsaPrivateKey,
    ciphertext: &[u8],
    label: Option<&str>,
    algorithm: ModExpAlgorithm,
) -> Result<Vec<u8>> {
    if ciphertext.len() != priv_key.size() {
        return Err(Error::InvalidCiphertext);
    }

    let ciphertext = BigUint::from_bytes_be(ciphertext);
    let em = rsa_decrypt_and_check(priv_key, rng, &ciphertext, algorithm)?;
    let mut em = uint_to_zeroizing_be_pad(em, priv_key.size())?;

    oaep_decrypt_digest::<D>(&mut em, label, priv_key.size())
}
