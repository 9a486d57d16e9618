//! Supported padding schemes.

use rand_core::CryptoRngCore;

use crate::algorithms::modexp::ModExpAlgorithm;
use crate::errors::Result;
use crate::key::{RsaPrivateKey, RsaPublicKey};

/// Padding scheme used for encryption.
pub trait PaddingScheme {
    /// Decrypt the given message using the given private key.
    ///
    /// If an `rng` is passed, it uses RSA blinding to help mitigate timing
    /// side-channel attacks.
    fn decrypt<Rng: CryptoRngCore + ?Sized>(
        &self,
        rng: Option<&mut Rng>,
        priv_key: &RsaPrivateKey,
        ciphertext: &[u8],
        algorithm: ModExpAlgorithm,
    ) -> Result<Vec<u8>>;

    /// Encrypt the given message using the given public key.
    fn encrypt<Rng: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut Rng,
        pub_key: &RsaPublicKey,
        msg: &[u8],
        algorithm: ModExpAlgorithm,
    ) -> Result<Vec<u8>>;

    /// Longest message this scheme can encrypt under a `k` byte modulus.
    fn max_message_len(&self, k: usize) -> usize;
}
