//! Constant-time byte comparison.

use core::hint::black_box;

use num_bigint::BigUint;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

/// Compares two byte slices without exiting early on the first mismatch.
///
/// Slices of different lengths compare unequal immediately; lengths are not
/// treated as secret. The result is a [`Choice`] so callers can keep
/// combining conditions in constant time.
pub(crate) fn fixed_time_eq_choice(a: &[u8], b: &[u8]) -> Choice {
    if a.len() != b.len() {
        return Choice::from(0);
    }

    let mut acc = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        acc = black_box(acc | (x ^ y));
    }

    acc.ct_eq(&0u8)
}

/// Compares two secret integers through their big-endian encodings.
pub(crate) fn biguint_eq_choice(a: &BigUint, b: &BigUint) -> Choice {
    let a = Zeroizing::new(a.to_bytes_be());
    let b = Zeroizing::new(b.to_bytes_be());
    fixed_time_eq_choice(&a, &b)
}
