//! Generic RSA implementation

use std::borrow::Cow;

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::algorithms::math::mod_inverse;
use crate::algorithms::modexp::{mod_exp, mod_exp_with, ModExpAlgorithm, MontgomeryContext};
use crate::errors::{Error, Result};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// ⚠️ Raw RSA encryption of m with the public key. No padding is performed.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_encrypt<K: PublicKeyParts>(
    key: &K,
    m: &BigUint,
    algorithm: ModExpAlgorithm,
) -> Result<BigUint> {
    mod_exp_with(m, key.e(), key.n(), algorithm, || key.n_montgomery())
}

/// ⚠️ Performs raw RSA decryption with no padding or error checking.
///
/// Returns a plaintext `BigUint`. Uses the CRT when the key carries
/// precomputed values and falls back to `c^d mod n` otherwise. Performs RSA
/// blinding if an `Rng` is passed.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_decrypt<R: CryptoRngCore + ?Sized>(
    mut rng: Option<&mut R>,
    priv_key: &impl PrivateKeyParts,
    c: &BigUint,
    algorithm: ModExpAlgorithm,
) -> Result<BigUint> {
    if priv_key.n().is_zero() {
        return Err(Error::InvalidModulus);
    }

    if c >= priv_key.n() {
        return Err(Error::InvalidCiphertext);
    }

    let mut ir = None;

    let c = if let Some(ref mut rng) = rng {
        let (blinded, unblinder) = blind(rng, priv_key, c);
        ir = Some(unblinder);
        Cow::Owned(blinded)
    } else {
        Cow::Borrowed(c)
    };

    let primes = priv_key.primes();
    let m = match (priv_key.dp(), priv_key.dq(), priv_key.qinv()) {
        (Some(dp), Some(dq), Some(qinv)) if primes.len() == 2 => {
            // We have the precalculated values needed for the CRT.
            let contexts = match algorithm {
                ModExpAlgorithm::Montgomery => priv_key.primes_montgomery(),
                ModExpAlgorithm::Baseline => None,
            };
            crt_decrypt_with(&c, &primes[0], &primes[1], dp, dq, qinv, algorithm, contexts)?
        }
        _ => mod_exp_with(&c, priv_key.d(), priv_key.n(), algorithm, || {
            priv_key.n_montgomery()
        })?,
    };

    match ir {
        Some(ref ir) => {
            // unblind
            Ok(unblind(priv_key, &m, ir))
        }
        None => Ok(m),
    }
}

/// ⚠️ Performs raw RSA decryption with no padding.
///
/// Returns a plaintext `BigUint`. Performs RSA blinding if an `Rng` is passed.  This will also
/// check for errors in the CRT computation.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_decrypt_and_check<R: CryptoRngCore + ?Sized>(
    priv_key: &impl PrivateKeyParts,
    rng: Option<&mut R>,
    c: &BigUint,
    algorithm: ModExpAlgorithm,
) -> Result<BigUint> {
    let m = rsa_decrypt(rng, priv_key, c, algorithm)?;

    // In order to defend against errors in the CRT computation, m^e is
    // calculated, which should match the original ciphertext.
    let check = rsa_encrypt(priv_key, &m, algorithm)?;

    if c != &check {
        return Err(Error::Internal);
    }

    Ok(m)
}

/// ⚠️ Chinese remainder theorem decryption of `c` with the two prime factors
/// and their precomputed exponents.
///
/// Computes `m1 = c^dp mod p`, `m2 = c^dq mod q`, `h = qinv·(m1 - m2) mod p`
/// and returns `m2 + h·q`.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! See the [module-level documentation][crate::hazmat] for
/// more information.
pub fn crt_decrypt(
    c: &BigUint,
    p: &BigUint,
    q: &BigUint,
    dp: &BigUint,
    dq: &BigUint,
    qinv: &BigUint,
    algorithm: ModExpAlgorithm,
) -> Result<BigUint> {
    crt_decrypt_with(c, p, q, dp, dq, qinv, algorithm, None)
}

#[allow(clippy::too_many_arguments)]
fn crt_decrypt_with(
    c: &BigUint,
    p: &BigUint,
    q: &BigUint,
    dp: &BigUint,
    dq: &BigUint,
    qinv: &BigUint,
    algorithm: ModExpAlgorithm,
    contexts: Option<(&MontgomeryContext, &MontgomeryContext)>,
) -> Result<BigUint> {
    let (m1, m2) = match contexts {
        Some((p_ctx, q_ctx)) => (
            Zeroizing::new(mod_exp_with(c, dp, p, algorithm, || Some(p_ctx))?),
            Zeroizing::new(mod_exp_with(c, dq, q, algorithm, || Some(q_ctx))?),
        ),
        None => (
            Zeroizing::new(mod_exp(c, dp, p, algorithm)?),
            Zeroizing::new(mod_exp(c, dq, q, algorithm)?),
        ),
    };

    // h = qinv * (m1 - m2) mod p, kept non-negative by adding p first
    let m2_mod_p = Zeroizing::new(&*m2 % p);
    let diff = Zeroizing::new((&*m1 + p - &*m2_mod_p) % p);
    let h = Zeroizing::new((qinv * &*diff) % p);

    Ok(&*m2 + &*h * q)
}

/// Computes `d = e⁻¹ mod (p-1)(q-1)`.
pub(crate) fn compute_private_exponent(p: &BigUint, q: &BigUint, e: &BigUint) -> Result<BigUint> {
    let one = BigUint::one();
    let phi = Zeroizing::new((p - &one) * (q - &one));
    mod_inverse(e, &phi).ok_or(Error::NoInverse)
}

/// Computes the CRT values `(d mod (p-1), d mod (q-1), q⁻¹ mod p)`.
pub(crate) fn compute_crt_values(
    d: &BigUint,
    p: &BigUint,
    q: &BigUint,
) -> Result<(BigUint, BigUint, BigUint)> {
    let one = BigUint::one();
    let dp = d % (p - &one);
    let dq = d % (q - &one);
    let qinv = mod_inverse(q, p).ok_or(Error::InvalidPrime)?;

    Ok((dp, dq, qinv))
}

/// Returns the blinded c, along with the unblinding factor.
fn blind<R: CryptoRngCore + ?Sized, K: PublicKeyParts>(
    rng: &mut R,
    key: &K,
    c: &BigUint,
) -> (BigUint, BigUint) {
    // Blinding involves multiplying c by r^e.
    // Then the decryption operation performs (m^e * r^e)^d mod n
    // which equals mr mod n. The factor of r can then be removed
    // by multiplying by the multiplicative inverse of r.

    let mut r: BigUint;
    let unblinder;
    loop {
        r = rng.gen_biguint_below(key.n());
        if r.is_zero() {
            r = BigUint::one();
        }
        if let Some(ir) = mod_inverse(&r, key.n()) {
            unblinder = ir;
            break;
        }
    }

    let c = {
        let mut rpowe = r.modpow(key.e(), key.n()); // N != 0
        let mut c = c * &rpowe;
        c %= key.n();

        rpowe.zeroize();

        c
    };
    r.zeroize();

    (c, unblinder)
}

/// Given an m and and unblinding factor, unblind the m.
fn unblind(key: &impl PublicKeyParts, m: &BigUint, unblinder: &BigUint) -> BigUint {
    (m * unblinder) % key.n()
}
