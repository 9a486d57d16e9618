//! Modular arithmetic helpers.

use num_bigint::Sign::Plus;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};

/// Iterative extended Euclidean algorithm.
///
/// Returns `(g, x, y)` such that `a*x + b*y = g = gcd(a, b)`.
pub(crate) fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let quotient = &old_r / &r;

        let next_r = &old_r - &quotient * &r;
        old_r = core::mem::replace(&mut r, next_r);

        let next_s = &old_s - &quotient * &s;
        old_s = core::mem::replace(&mut s, next_s);

        let next_t = &old_t - &quotient * &t;
        old_t = core::mem::replace(&mut t, next_t);
    }

    if old_r.is_negative() {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// Calculates the [modular multiplicative
/// inverse](https://en.wikipedia.org/wiki/Modular_multiplicative_inverse) of `a` modulo `m`.
///
/// Returns `None` if `gcd(a, m) != 1` or `m` is zero.
pub(crate) fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    if m.is_one() {
        return Some(BigUint::zero());
    }

    let modulus = BigInt::from_biguint(Plus, m.clone());
    let a = BigInt::from_biguint(Plus, a % m);

    let (gcd, x, _) = extended_gcd(&a, &modulus);
    if !gcd.is_one() {
        return None;
    }

    let mut x = x % &modulus;
    if x.is_negative() {
        x += &modulus;
    }

    x.to_biguint()
}
