//! Traits related to the key components

use num_bigint::BigUint;

use crate::algorithms::modexp::MontgomeryContext;

/// Components of an RSA public key.
pub trait PublicKeyParts {
    /// Returns the modulus of the key.
    fn n(&self) -> &BigUint;

    /// Returns the public exponent of the key.
    fn e(&self) -> &BigUint;

    /// Returns the modulus size in bytes. Padded blocks and ciphertexts for
    /// this public key will have the same size.
    fn size(&self) -> usize {
        (self.n().bits() + 7) / 8
    }

    /// Returns the Montgomery context for the modulus, if the key caches one.
    fn n_montgomery(&self) -> Option<&MontgomeryContext> {
        None
    }
}

/// Components of an RSA private key.
pub trait PrivateKeyParts: PublicKeyParts {
    /// Returns the private exponent of the key.
    fn d(&self) -> &BigUint;

    /// Returns the prime factors. Empty for keys imported without them.
    fn primes(&self) -> &[BigUint];

    /// Returns the precomputed dp value, D mod (P-1)
    fn dp(&self) -> Option<&BigUint>;

    /// Returns the precomputed dq value, D mod (Q-1)
    fn dq(&self) -> Option<&BigUint>;

    /// Returns the precomputed qinv value, Q^-1 mod P
    fn qinv(&self) -> Option<&BigUint>;

    /// Returns the Montgomery contexts for `p` and `q`, if the key caches them.
    fn primes_montgomery(&self) -> Option<(&MontgomeryContext, &MontgomeryContext)> {
        None
    }
}
