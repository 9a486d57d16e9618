//! Modular exponentiation: a baseline backed by `BigUint::modpow` and a
//! Montgomery-form implementation.

use core::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use zeroize::Zeroize;

use crate::algorithms::math::mod_inverse;
use crate::errors::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Selects how modular exponentiation is carried out.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ModExpAlgorithm {
    /// Square-and-multiply provided by the big integer library.
    #[default]
    Baseline,

    /// Montgomery multiplication. Even moduli fall back to [`ModExpAlgorithm::Baseline`].
    Montgomery,
}

/// Precomputed values for Montgomery multiplication modulo an odd `n`.
///
/// `R = 2^w` where `w` is the bit length of `n` rounded up to a multiple of 64.
#[derive(Clone)]
pub struct MontgomeryContext {
    modulus: BigUint,
    r: BigUint,
    r_inv: BigUint,
    /// `-n⁻¹ mod R`
    neg_mod_inv: BigUint,
    /// `R² mod n`
    r2: BigUint,
    /// `R - 1`
    mask: BigUint,
    word_width: usize,
}

impl MontgomeryContext {
    /// Builds the context for `modulus`, which must be odd and at least 3.
    pub fn new(modulus: &BigUint) -> Result<Self> {
        if modulus.is_even() || *modulus < BigUint::from(3u32) {
            return Err(Error::InvalidModulus);
        }

        let word_width = (modulus.bits() + 63) / 64 * 64;
        let r = BigUint::one() << word_width;
        let mask = &r - 1u32;

        let r_inv = mod_inverse(&(&r % modulus), modulus).ok_or(Error::NoInverse)?;
        let n_inv = mod_inverse(modulus, &r).ok_or(Error::NoInverse)?;
        let neg_mod_inv = &r - n_inv;
        let r2 = (&r * &r) % modulus;

        Ok(MontgomeryContext {
            modulus: modulus.clone(),
            r,
            r_inv,
            neg_mod_inv,
            r2,
            mask,
            word_width,
        })
    }

    /// The modulus `n`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// `R = 2^w`.
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    /// `R⁻¹ mod n`.
    pub fn r_inv(&self) -> &BigUint {
        &self.r_inv
    }

    /// The width `w` of `R` in bits.
    pub fn word_width(&self) -> usize {
        self.word_width
    }

    /// Montgomery reduction: returns `t·R⁻¹ mod n` for `t < n·R`.
    pub fn redc(&self, t: &BigUint) -> BigUint {
        let m = ((t & &self.mask) * &self.neg_mod_inv) & &self.mask;
        let mut u = (t + m * &self.modulus) >> self.word_width;
        if u >= self.modulus {
            u -= &self.modulus;
        }
        u
    }

    /// Maps `a` into Montgomery form, `a·R mod n`.
    pub fn to_montgomery(&self, a: &BigUint) -> BigUint {
        self.redc(&((a % &self.modulus) * &self.r2))
    }

    /// Maps `x` out of Montgomery form, `x·R⁻¹ mod n`.
    pub fn from_montgomery(&self, x: &BigUint) -> BigUint {
        self.redc(x)
    }

    /// Multiplies two values in Montgomery form.
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        self.redc(&(a * b))
    }

    /// Computes `base^exponent mod n`, scanning the exponent from its most
    /// significant bit down.
    pub fn pow(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        let base = self.to_montgomery(base);
        let mut x = &self.r % &self.modulus;

        for byte in exponent.to_bytes_be() {
            for i in (0..8).rev() {
                x = self.mul(&x, &x);
                if (byte >> i) & 1 == 1 {
                    x = self.mul(&x, &base);
                }
            }
        }

        self.from_montgomery(&x)
    }
}

impl fmt::Debug for MontgomeryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MontgomeryContext")
            .field("word_width", &self.word_width)
            .finish_non_exhaustive()
    }
}

impl Zeroize for MontgomeryContext {
    fn zeroize(&mut self) {
        self.modulus.zeroize();
        self.r.zeroize();
        self.r_inv.zeroize();
        self.neg_mod_inv.zeroize();
        self.r2.zeroize();
        self.mask.zeroize();
        self.modulus = BigUint::zero();
        self.r = BigUint::zero();
        self.r_inv = BigUint::zero();
        self.neg_mod_inv = BigUint::zero();
        self.r2 = BigUint::zero();
        self.mask = BigUint::zero();
        self.word_width = 0;
    }
}

impl Drop for MontgomeryContext {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Computes `base^exponent mod modulus` with the requested algorithm.
///
/// A zero modulus is rejected; a modulus of one always yields zero.
pub fn mod_exp(
    base: &BigUint,
    exponent: &BigUint,
    modulus: &BigUint,
    algorithm: ModExpAlgorithm,
) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(Error::InvalidModulus);
    }
    if modulus.is_one() {
        return Ok(BigUint::zero());
    }

    match algorithm {
        ModExpAlgorithm::Montgomery if modulus.is_odd() => {
            Ok(MontgomeryContext::new(modulus)?.pow(base, exponent))
        }
        _ => Ok(base.modpow(exponent, modulus)),
    }
}

/// Like [`mod_exp`], but reuses a Montgomery context owned by the caller.
///
/// `context` is only consulted for [`ModExpAlgorithm::Montgomery`]; a `None`
/// result falls back to the baseline.
pub(crate) fn mod_exp_with<'a>(
    base: &BigUint,
    exponent: &BigUint,
    modulus: &BigUint,
    algorithm: ModExpAlgorithm,
    context: impl FnOnce() -> Option<&'a MontgomeryContext>,
) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(Error::InvalidModulus);
    }
    if modulus.is_one() {
        return Ok(BigUint::zero());
    }

    match algorithm {
        ModExpAlgorithm::Baseline => Ok(base.modpow(exponent, modulus)),
        ModExpAlgorithm::Montgomery => match context() {
            Some(ctx) => Ok(ctx.pow(base, exponent)),
            None => Ok(base.modpow(exponent, modulus)),
        },
    }
}
