//! Miller-Rabin probable prime testing and random prime generation.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand_core::CryptoRngCore;

/// Number of Miller-Rabin rounds used when no explicit count is configured.
pub const DEFAULT_PRIME_ROUNDS: usize = 50;

/// The primes below 64. Candidates divisible by one of these are rejected
/// before running any Miller-Rabin rounds.
const SMALL_PRIMES: [u32; 18] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61,
];

/// Reports whether `n` is probably prime, running `rounds` rounds of the
/// Miller-Rabin test with fresh random witnesses drawn from `[2, n - 2]`.
///
/// If `n` is prime this always returns `true`. A composite `n` survives each
/// round with probability at most ¼.
///
/// See Menezes et al., Handbook of Applied Cryptography, 1997, p. 139,
/// Algorithm 4.24.
pub fn is_probable_prime<R: CryptoRngCore + ?Sized>(rng: &mut R, n: &BigUint, rounds: usize) -> bool {
    if let Some(small) = n.to_u64() {
        if small < 64 {
            return SMALL_PRIMES.contains(&(small as u32));
        }
    }

    for prime in SMALL_PRIMES.iter() {
        if (n % *prime).is_zero() {
            return false;
        }
    }

    miller_rabin(rng, n, rounds)
}

/// Runs `rounds` Miller-Rabin rounds against an odd `n > 3`.
fn miller_rabin<R: CryptoRngCore + ?Sized>(rng: &mut R, n: &BigUint, rounds: usize) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;

    // n - 1 = d * 2^s with d odd
    let mut d = n_minus_one.clone();
    let mut s = 0usize;
    while d.is_even() {
        d = &d >> 1usize;
        s += 1;
    }

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);

        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
            if x.is_one() {
                return false;
            }
        }

        return false;
    }

    true
}

/// Generates a random probable prime of exactly `bit_size` bits.
///
/// The two most significant bits of every candidate are set, so the product
/// of two such primes is never one bit short. Failed candidates are stepped
/// by two until one passes; a step that overflows `bit_size` draws a fresh
/// candidate instead.
///
/// # Panics
///
/// Panics if `bit_size < 2`.
pub fn generate_prime<R: CryptoRngCore + ?Sized>(rng: &mut R, bit_size: usize, rounds: usize) -> BigUint {
    assert!(bit_size >= 2, "prime size must be at least 2-bit");

    let mut b = bit_size % 8;
    if b == 0 {
        b = 8;
    }

    let bytes_len = (bit_size + 7) / 8;
    let mut bytes = vec![0u8; bytes_len];
    let mut candidates = 0usize;

    loop {
        rng.fill_bytes(&mut bytes);
        // Clear bits in the first byte to make sure the candidate has a size <= bits.
        bytes[0] &= ((1u32 << (b as u32)) - 1) as u8;

        if b >= 2 {
            bytes[0] |= 3u8.wrapping_shl(b as u32 - 2);
        } else {
            // Here b==1, because b cannot be zero.
            bytes[0] |= 1;
            if bytes_len > 1 {
                bytes[1] |= 0x80;
            }
        }

        // Make the value odd since an even number this large certainly isn't prime.
        bytes[bytes_len - 1] |= 1u8;

        let mut p = BigUint::from_bytes_be(&bytes);
        while p.bits() == bit_size {
            candidates += 1;
            if is_probable_prime(rng, &p, rounds) {
                log::trace!("found {}-bit prime after {} candidates", bit_size, candidates);
                return p;
            }
            p += 2u32;
        }
    }
}
