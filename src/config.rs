//! Configuration for key generation and the encryption engine.

use num_bigint::BigUint;

use crate::algorithms::modexp::ModExpAlgorithm;
use crate::algorithms::prime::DEFAULT_PRIME_ROUNDS;
use crate::errors::{Error, Result};
use crate::padding::Padding;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The conventional public exponent, `2^16 + 1`.
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65537;

/// How the public exponent of a generated key is chosen.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PublicExponent {
    /// Use this exponent. Primes `p` with `gcd(e, p - 1) != 1` are rejected
    /// during generation.
    Fixed(u64),

    /// Draw a random `e` with `3 <= e < phi` and `gcd(e, phi) = 1`.
    RandomCoprime,
}

impl Default for PublicExponent {
    fn default() -> Self {
        PublicExponent::Fixed(DEFAULT_PUBLIC_EXPONENT)
    }
}

impl PublicExponent {
    /// Returns the fixed exponent, or `None` for [`PublicExponent::RandomCoprime`].
    ///
    /// A fixed exponent must be odd and at least 3.
    pub(crate) fn fixed(&self) -> Result<Option<BigUint>> {
        match *self {
            PublicExponent::Fixed(e) if e < 3 || e % 2 == 0 => Err(Error::InvalidExponent),
            PublicExponent::Fixed(e) => Ok(Some(BigUint::from(e))),
            PublicExponent::RandomCoprime => Ok(None),
        }
    }
}

/// Parameters for RSA key generation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyGenConfig {
    /// Public exponent policy.
    pub public_exponent: PublicExponent,

    /// Miller-Rabin rounds run against every prime candidate. Key generation
    /// rejects zero.
    pub prime_rounds: usize,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        KeyGenConfig {
            public_exponent: PublicExponent::default(),
            prime_rounds: DEFAULT_PRIME_ROUNDS,
        }
    }
}

impl KeyGenConfig {
    /// Same as [`KeyGenConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the public exponent policy.
    pub fn with_public_exponent(mut self, public_exponent: PublicExponent) -> Self {
        self.public_exponent = public_exponent;
        self
    }

    /// Sets the number of Miller-Rabin rounds.
    pub fn with_prime_rounds(mut self, prime_rounds: usize) -> Self {
        self.prime_rounds = prime_rounds;
        self
    }
}

/// Parameters for [`RsaEngine`](crate::RsaEngine).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Padding applied before encryption and removed after decryption.
    pub padding: Padding,

    /// Modular exponentiation backend.
    pub algorithm: ModExpAlgorithm,
}

impl EngineConfig {
    /// Same as [`EngineConfig::default`]: OAEP with SHA-512 and the baseline
    /// exponentiation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the padding scheme.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the modular exponentiation backend.
    pub fn with_algorithm(mut self, algorithm: ModExpAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}
