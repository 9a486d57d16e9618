//! Thread-safe key holder with an explicit destroy.

use core::fmt;
use std::sync::{RwLock, RwLockReadGuard};

use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::algorithms::ct::biguint_eq_choice;
use crate::config::KeyGenConfig;
use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// The eight named integers of an RSA key.
///
/// `n` and `e` are always present. The private fields are optional: a
/// component set with none of them describes a public key only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KeyComponents {
    /// Modulus.
    pub n: BigUint,
    /// Public exponent.
    pub e: BigUint,
    /// Private exponent.
    pub d: Option<BigUint>,
    /// First prime factor.
    pub p: Option<BigUint>,
    /// Second prime factor.
    pub q: Option<BigUint>,
    /// D mod (P-1)
    pub dp: Option<BigUint>,
    /// D mod (Q-1)
    pub dq: Option<BigUint>,
    /// Q^-1 mod P
    pub qinv: Option<BigUint>,
}

impl KeyComponents {
    /// Components of a public key.
    pub fn public(n: BigUint, e: BigUint) -> Self {
        KeyComponents {
            n,
            e,
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qinv: None,
        }
    }

    /// Returns `true` if any private field is set.
    pub fn has_private(&self) -> bool {
        self.d.is_some() || self.p.is_some() || self.q.is_some()
    }
}

impl fmt::Debug for KeyComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyComponents")
            .field("n", &self.n)
            .field("e", &self.e)
            .field("has_private", &self.has_private())
            .finish_non_exhaustive()
    }
}

impl Zeroize for KeyComponents {
    fn zeroize(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
    }
}

impl Drop for KeyComponents {
    fn drop(&mut self) {
        self.zeroize();
    }
}

struct KeySlot {
    public: Option<RsaPublicKey>,
    private: Option<RsaPrivateKey>,
    destroyed: bool,
}

/// An RSA key pair, or only its public half, shared between threads.
///
/// Encryption and decryption take a shared lock; [`KeyPair::destroy`] takes
/// the exclusive lock, wipes the private material and leaves the pair
/// permanently unusable.
pub struct KeyPair {
    slot: RwLock<KeySlot>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("KeyPair");
        match self.slot.read() {
            Ok(slot) => s
                .field("public", &slot.public)
                .field("has_private", &slot.private.is_some())
                .field("destroyed", &slot.destroyed),
            Err(_) => s.field("poisoned", &true),
        };
        s.finish()
    }
}

impl From<RsaPrivateKey> for KeyPair {
    fn from(private: RsaPrivateKey) -> Self {
        KeyPair {
            slot: RwLock::new(KeySlot {
                public: Some(private.to_public_key()),
                private: Some(private),
                destroyed: false,
            }),
        }
    }
}

impl From<RsaPublicKey> for KeyPair {
    fn from(public: RsaPublicKey) -> Self {
        KeyPair {
            slot: RwLock::new(KeySlot {
                public: Some(public),
                private: None,
                destroyed: false,
            }),
        }
    }
}

impl KeyPair {
    /// Generates a key pair of `bit_size` bits with the default
    /// [`KeyGenConfig`].
    ///
    /// Fails with [`Error::KeySizeTooSmall`] below
    /// [`MIN_KEY_SIZE`](crate::MIN_KEY_SIZE) bits.
    pub fn generate<R: CryptoRngCore + ?Sized>(rng: &mut R, bit_size: usize) -> Result<Self> {
        Self::generate_with_config(rng, bit_size, &KeyGenConfig::default())
    }

    /// Generates a key pair of `bit_size` bits.
    pub fn generate_with_config<R: CryptoRngCore + ?Sized>(
        rng: &mut R,
        bit_size: usize,
        config: &KeyGenConfig,
    ) -> Result<Self> {
        RsaPrivateKey::new_with_config(rng, bit_size, config).map(KeyPair::from)
    }

    /// Builds a key pair from raw components.
    ///
    /// - `d`, `p` and `q` give a CRT key. Any supplied `dp`, `dq` and `qinv`
    ///   must equal the values derived from them.
    /// - `d` alone gives a key that decrypts without CRT.
    /// - `p` and `q` without `d` derive `d` from `e`.
    /// - No private fields give a public-only pair.
    pub fn import(mut components: KeyComponents) -> Result<Self> {
        let n = core::mem::take(&mut components.n);
        let e = core::mem::take(&mut components.e);

        if !components.has_private() {
            return RsaPublicKey::new(n, e).map(KeyPair::from);
        }

        let private = match (components.d.take(), components.p.take(), components.q.take()) {
            (Some(d), None, None) => RsaPrivateKey::from_components(n, e, d, vec![])?,
            (Some(d), Some(p), Some(q)) => RsaPrivateKey::from_components(n, e, d, vec![p, q])?,
            (None, Some(p), Some(q)) => {
                let private = RsaPrivateKey::from_p_q(p, q, e)?;
                if private.n() != &n {
                    return Err(Error::InvalidModulus);
                }
                private
            }
            _ => return Err(Error::InvalidPrime),
        };

        check_supplied_crt_value(components.dp.as_ref(), private.dp())?;
        check_supplied_crt_value(components.dq.as_ref(), private.dq())?;
        check_supplied_crt_value(components.qinv.as_ref(), private.qinv())?;

        Ok(KeyPair::from(private))
    }

    /// Returns the key's components. The private fields are filled only when
    /// `include_private` is set and a private key is loaded.
    pub fn export_components(&self, include_private: bool) -> Result<KeyComponents> {
        let slot = self.read()?;
        let public = slot.public.as_ref().ok_or(Error::KeyNotLoaded)?;
        let mut components = KeyComponents::public(public.n().clone(), public.e().clone());

        if include_private {
            if let Some(private) = slot.private.as_ref() {
                components.d = Some(private.d().clone());
                if let [p, q] = private.primes() {
                    components.p = Some(p.clone());
                    components.q = Some(q.clone());
                }
                components.dp = private.dp().cloned();
                components.dq = private.dq().cloned();
                components.qinv = private.qinv().cloned();
            }
        }

        Ok(components)
    }

    /// Returns a copy of the public key.
    pub fn public_key(&self) -> Result<RsaPublicKey> {
        self.with_public(|key| Ok(key.clone()))
    }

    /// Returns `true` if the private half is loaded.
    pub fn has_private_key(&self) -> Result<bool> {
        Ok(self.read()?.private.is_some())
    }

    /// Wipes all key material. Every later call on this pair, including a
    /// second `destroy`, fails with [`Error::InvalidState`].
    pub fn destroy(&self) -> Result<()> {
        let mut slot = self.slot.write().map_err(|_| Error::InvalidState)?;
        if slot.destroyed {
            return Err(Error::InvalidState);
        }

        if let Some(mut private) = slot.private.take() {
            private.zeroize();
        }
        slot.public = None;
        slot.destroyed = true;

        log::debug!("key pair destroyed");
        Ok(())
    }

    /// Returns `true` once [`KeyPair::destroy`] has run.
    pub fn is_destroyed(&self) -> bool {
        self.slot.read().map_or(true, |slot| slot.destroyed)
    }

    /// Runs `f` against the public key while holding the shared lock.
    pub(crate) fn with_public<T>(&self, f: impl FnOnce(&RsaPublicKey) -> Result<T>) -> Result<T> {
        let slot = self.read()?;
        f(slot.public.as_ref().ok_or(Error::KeyNotLoaded)?)
    }

    /// Runs `f` against the private key while holding the shared lock.
    pub(crate) fn with_private<T>(
        &self,
        f: impl FnOnce(&RsaPrivateKey) -> Result<T>,
    ) -> Result<T> {
        let slot = self.read()?;
        f(slot.private.as_ref().ok_or(Error::KeyNotLoaded)?)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, KeySlot>> {
        let slot = self.slot.read().map_err(|_| Error::InvalidState)?;
        if slot.destroyed {
            return Err(Error::InvalidState);
        }
        Ok(slot)
    }
}

fn check_supplied_crt_value(supplied: Option<&BigUint>, derived: Option<&BigUint>) -> Result<()> {
    let supplied = match supplied {
        Some(supplied) => supplied,
        None => return Ok(()),
    };
    let derived = derived.ok_or(Error::InvalidCoefficient)?;

    if bool::from(biguint_eq_choice(supplied, derived)) {
        Ok(())
    } else {
        Err(Error::InvalidCoefficient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::tests::test_key_512;
    use crate::key::MIN_KEY_SIZE;
    use num_traits::One;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    fn full_components() -> KeyComponents {
        let key = test_key_512();
        KeyComponents {
            n: key.n().clone(),
            e: key.e().clone(),
            d: Some(key.d().clone()),
            p: Some(key.primes()[0].clone()),
            q: Some(key.primes()[1].clone()),
            dp: key.dp().cloned(),
            dq: key.dq().cloned(),
            qinv: key.qinv().cloned(),
        }
    }

    #[test]
    fn test_import_export() {
        let components = full_components();
        let pair = KeyPair::import(components.clone()).unwrap();
        assert!(pair.has_private_key().unwrap());
        assert_eq!(pair.export_components(true).unwrap(), components);

        let public = pair.export_components(false).unwrap();
        assert_eq!(public, KeyComponents::public(components.n.clone(), components.e.clone()));
        assert!(!public.has_private());
    }

    #[test]
    fn test_import_public_only() {
        let components = full_components();
        let pair =
            KeyPair::import(KeyComponents::public(components.n.clone(), components.e.clone()))
                .unwrap();
        assert!(!pair.has_private_key().unwrap());
        assert_eq!(pair.public_key().unwrap(), test_key_512().to_public_key());
        assert_eq!(
            pair.with_private(|_| Ok(())),
            Err(Error::KeyNotLoaded)
        );

        // private fields are never invented
        assert!(!pair.export_components(true).unwrap().has_private());
    }

    #[test]
    fn test_import_without_crt() {
        let mut components = full_components();
        components.p = None;
        components.q = None;
        components.dp = None;
        components.dq = None;
        components.qinv = None;

        let pair = KeyPair::import(components.clone()).unwrap();
        let exported = pair.export_components(true).unwrap();
        assert_eq!(exported.d, components.d);
        assert_eq!(exported.p, None);
        assert_eq!(exported.qinv, None);
    }

    #[test]
    fn test_import_primes_without_d() {
        let mut components = full_components();
        components.d = None;

        let pair = KeyPair::import(components).unwrap();
        pair.with_private(|key| key.validate()).unwrap();
        assert!(pair.export_components(true).unwrap().d.is_some());
    }

    #[test]
    fn test_import_rejects() {
        let mut components = full_components();
        components.q = None;
        assert_eq!(KeyPair::import(components).err(), Some(Error::InvalidPrime));

        let mut components = full_components();
        components.qinv = Some(BigUint::one());
        assert_eq!(
            KeyPair::import(components).err(),
            Some(Error::InvalidCoefficient)
        );

        let mut components = full_components();
        components.dp = components.dq.clone();
        assert_eq!(
            KeyPair::import(components).err(),
            Some(Error::InvalidCoefficient)
        );

        // CRT values without primes to check them against
        let mut components = full_components();
        components.p = None;
        components.q = None;
        assert_eq!(
            KeyPair::import(components).err(),
            Some(Error::InvalidCoefficient)
        );

        let mut components = full_components();
        components.d = components.d.take().map(|d| d + 2u32);
        assert_eq!(
            KeyPair::import(components).err(),
            Some(Error::InvalidExponent)
        );

        let mut components = full_components();
        components.d = None;
        components.n += 2u32;
        assert_eq!(
            KeyPair::import(components).err(),
            Some(Error::InvalidModulus)
        );
    }

    #[test]
    fn test_generate_too_small() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        assert_eq!(
            KeyPair::generate(&mut rng, MIN_KEY_SIZE - 1).err(),
            Some(Error::KeySizeTooSmall)
        );
        assert_eq!(
            KeyPair::generate(&mut rng, 512).err(),
            Some(Error::KeySizeTooSmall)
        );
    }

    #[test]
    fn test_generate_without_prime_rounds() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let config = KeyGenConfig::new().with_prime_rounds(0);
        assert_eq!(
            KeyPair::generate_with_config(&mut rng, MIN_KEY_SIZE, &config).err(),
            Some(Error::InvalidPrime)
        );
    }

    #[test]
    fn test_destroy() {
        let pair = KeyPair::from(test_key_512());
        assert!(!pair.is_destroyed());

        pair.destroy().unwrap();
        assert!(pair.is_destroyed());

        assert_eq!(pair.destroy(), Err(Error::InvalidState));
        assert_eq!(pair.public_key().err(), Some(Error::InvalidState));
        assert_eq!(pair.has_private_key(), Err(Error::InvalidState));
        assert_eq!(pair.export_components(true).err(), Some(Error::InvalidState));
        assert_eq!(pair.with_private(|_| Ok(())), Err(Error::InvalidState));
    }

    #[test]
    fn test_debug_redacts_private_fields() {
        let components = full_components();
        let p = components.p.clone().unwrap().to_string();
        let rendered = format!("{:?}", components);
        assert!(rendered.contains("has_private: true"));
        assert!(!rendered.contains(&p));

        let pair = KeyPair::from(test_key_512());
        assert!(!format!("{:?}", pair).contains(&p));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KeyPair>();
    }
}
