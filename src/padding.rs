//! Padding scheme selection.

use rand_core::CryptoRngCore;

use crate::algorithms::modexp::ModExpAlgorithm;
use crate::errors::Result;
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::oaep::Oaep;
use crate::pkcs1v15::Pkcs1v15Encrypt;
use crate::traits::PaddingScheme;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Available padding schemes.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Padding {
    /// PKCS#1 v1.5 encryption padding.
    Pkcs1v15,

    /// OAEP with SHA-512 and MGF1-SHA-512.
    Oaep(Oaep),
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Oaep(Oaep::new())
    }
}

impl From<Oaep> for Padding {
    fn from(oaep: Oaep) -> Self {
        Padding::Oaep(oaep)
    }
}

impl From<Pkcs1v15Encrypt> for Padding {
    fn from(_: Pkcs1v15Encrypt) -> Self {
        Padding::Pkcs1v15
    }
}

impl PaddingScheme for Padding {
    fn decrypt<Rng: CryptoRngCore + ?Sized>(
        &self,
        rng: Option<&mut Rng>,
        priv_key: &RsaPrivateKey,
        ciphertext: &[u8],
        algorithm: ModExpAlgorithm,
    ) -> Result<Vec<u8>> {
        match self {
            Padding::Pkcs1v15 => Pkcs1v15Encrypt.decrypt(rng, priv_key, ciphertext, algorithm),
            Padding::Oaep(oaep) => oaep.decrypt(rng, priv_key, ciphertext, algorithm),
        }
    }

    fn encrypt<Rng: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut Rng,
        pub_key: &RsaPublicKey,
        msg: &[u8],
        algorithm: ModExpAlgorithm,
    ) -> Result<Vec<u8>> {
        match self {
            Padding::Pkcs1v15 => Pkcs1v15Encrypt.encrypt(rng, pub_key, msg, algorithm),
            Padding::Oaep(oaep) => oaep.encrypt(rng, pub_key, msg, algorithm),
        }
    }

    fn max_message_len(&self, k: usize) -> usize {
        match self {
            Padding::Pkcs1v15 => Pkcs1v15Encrypt.max_message_len(k),
            Padding::Oaep(oaep) => oaep.max_message_len(k),
        }
    }
}
