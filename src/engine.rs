//! Padding plus exponentiation over a [`KeyPair`].

use rand_core::CryptoRngCore;

use crate::config::EngineConfig;
use crate::dummy_rng::DummyRng;
use crate::errors::Result;
use crate::keypair::KeyPair;
use crate::traits::PaddingScheme;

/// Encrypts and decrypts with a fixed padding scheme and exponentiation
/// backend.
///
/// The engine holds no key material. Every call takes a [`KeyPair`], so one
/// engine can serve any number of keys and threads.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RsaEngine {
    config: EngineConfig,
}

impl RsaEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        RsaEngine { config }
    }

    /// Returns the engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pads `msg` and encrypts it with the public half of `key_pair`.
    ///
    /// Fails with [`Error::InvalidState`](crate::Error::InvalidState) once the
    /// pair is destroyed and [`Error::MessageTooLong`](crate::Error::MessageTooLong)
    /// when `msg` exceeds the padding's capacity.
    pub fn encrypt<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        key_pair: &KeyPair,
        msg: &[u8],
    ) -> Result<Vec<u8>> {
        key_pair.with_public(|key| {
            self.config
                .padding
                .encrypt(rng, key, msg, self.config.algorithm)
        })
    }

    /// Decrypts `ciphertext` with the private half of `key_pair`.
    ///
    /// Fails with [`Error::KeyNotLoaded`](crate::Error::KeyNotLoaded) for a
    /// public-only pair and
    /// [`Error::InvalidCiphertext`](crate::Error::InvalidCiphertext) when the
    /// ciphertext is not exactly the modulus size or not below the modulus.
    pub fn decrypt(&self, key_pair: &KeyPair, ciphertext: &[u8]) -> Result<Vec<u8>> {
        key_pair.with_private(|key| {
            self.config
                .padding
                .decrypt::<DummyRng>(None, key, ciphertext, self.config.algorithm)
        })
    }

    /// Same as [`RsaEngine::decrypt`], with the ciphertext blinded by a random
    /// factor drawn from `rng` before the private exponentiation.
    pub fn decrypt_blinded<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        key_pair: &KeyPair,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        key_pair.with_private(|key| {
            self.config
                .padding
                .decrypt(Some(rng), key, ciphertext, self.config.algorithm)
        })
    }
}
