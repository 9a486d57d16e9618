//! Generate prime components for the RSA Private Key

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::algorithms::prime::generate_prime;
use crate::algorithms::rsa::compute_private_exponent;
use crate::config::KeyGenConfig;
use crate::errors::{Error, Result};

/// Smallest modulus the generator will attempt at all. Public entry points
/// enforce a much larger minimum.
const MIN_GENERATED_BITS: usize = 16;

pub(crate) struct RsaPrivateKeyComponents {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub primes: Vec<BigUint>,
}

/// Generates a two-prime RSA key of exactly `bit_size` bits.
///
/// `p` gets `bit_size / 2` bits and `q` the rest. Candidate pairs are drawn
/// again when the primes coincide, when the product misses the requested
/// size, or when a fixed public exponent shares a factor with `p - 1` or
/// `q - 1`.
///
/// Fails with [`Error::InvalidPrime`] when `config` asks for zero
/// Miller-Rabin rounds.
pub(crate) fn generate_key_components<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
    config: &KeyGenConfig,
) -> Result<RsaPrivateKeyComponents> {
    if bit_size < MIN_GENERATED_BITS {
        return Err(Error::KeySizeTooSmall);
    }

    // trial division alone lets composites through
    if config.prime_rounds == 0 {
        return Err(Error::InvalidPrime);
    }

    let fixed_e = config.public_exponent.fixed()?;
    if let Some(ref e) = fixed_e {
        if e.bits() >= bit_size {
            return Err(Error::InvalidExponent);
        }
    }

    let one = BigUint::one();
    let mut attempts = 0usize;

    loop {
        attempts += 1;

        let p = generate_prime(rng, bit_size / 2, config.prime_rounds);
        let q = generate_prime(rng, bit_size - bit_size / 2, config.prime_rounds);

        if p == q {
            continue;
        }

        if let Some(ref e) = fixed_e {
            if !e.gcd(&(&p - &one)).is_one() || !e.gcd(&(&q - &one)).is_one() {
                continue;
            }
        }

        let n = &p * &q;
        if n.bits() != bit_size {
            // generate_prime sets the top two bits of each prime, so this
            // should not happen.
            continue;
        }

        let e = match fixed_e {
            Some(ref e) => e.clone(),
            None => {
                let phi = Zeroizing::new((&p - &one) * (&q - &one));
                random_coprime(rng, &phi)
            }
        };

        let d = compute_private_exponent(&p, &q, &e)?;

        log::debug!(
            "generated {}-bit key with e = {} after {} attempt(s)",
            bit_size,
            e,
            attempts
        );

        return Ok(RsaPrivateKeyComponents {
            n,
            e,
            d,
            primes: vec![p, q],
        });
    }
}

/// Draws `e` uniformly from `[3, phi)` until `gcd(e, phi) = 1`.
fn random_coprime<R: CryptoRngCore + ?Sized>(rng: &mut R, phi: &BigUint) -> BigUint {
    let three = BigUint::from(3u32);
    loop {
        let e = rng.gen_biguint_range(&three, phi);
        if e.gcd(phi).is_one() {
            return e;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PublicExponent;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    fn check_components(components: &RsaPrivateKeyComponents, bit_size: usize) {
        let one = BigUint::one();
        let p = &components.primes[0];
        let q = &components.primes[1];
        let phi = (p - &one) * (q - &one);

        assert_eq!(components.n.bits(), bit_size);
        assert_eq!(&components.n, &(p * q));
        assert_ne!(p, q);
        assert!(components.e.gcd(&phi).is_one());
        assert!(((&components.e * &components.d) % &phi).is_one());
    }

    #[test]
    fn test_generate_fixed_exponent() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        for bit_size in [64usize, 65, 256, 512].iter() {
            let components =
                generate_key_components(&mut rng, *bit_size, &KeyGenConfig::default()).unwrap();
            assert_eq!(components.e, BigUint::from(65537u32));
            check_components(&components, *bit_size);
        }
    }

    #[test]
    fn test_generate_small_fixed_exponent() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let config = KeyGenConfig::new().with_public_exponent(PublicExponent::Fixed(3));
        let components = generate_key_components(&mut rng, 256, &config).unwrap();
        assert_eq!(components.e, BigUint::from(3u32));
        check_components(&components, 256);
    }

    #[test]
    fn test_generate_random_exponent() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let config = KeyGenConfig::new().with_public_exponent(PublicExponent::RandomCoprime);
        let components = generate_key_components(&mut rng, 256, &config).unwrap();
        assert!(components.e >= BigUint::from(3u32));
        check_components(&components, 256);
    }

    #[test]
    fn test_generate_rejects_bad_input() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        assert!(matches!(
            generate_key_components(&mut rng, 8, &KeyGenConfig::default()),
            Err(Error::KeySizeTooSmall)
        ));

        let even = KeyGenConfig::new().with_public_exponent(PublicExponent::Fixed(4));
        assert!(matches!(
            generate_key_components(&mut rng, 256, &even),
            Err(Error::InvalidExponent)
        ));

        // 65537 does not fit below a 16-bit modulus
        assert!(matches!(
            generate_key_components(&mut rng, 16, &KeyGenConfig::default()),
            Err(Error::InvalidExponent)
        ));
    }

    #[test]
    fn test_generate_rejects_zero_prime_rounds() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let config = KeyGenConfig::new().with_prime_rounds(0);
        for bit_size in [64usize, 512].iter() {
            assert!(matches!(
                generate_key_components(&mut rng, *bit_size, &config),
                Err(Error::InvalidPrime)
            ));
        }

        // a single round is enough to filter out composites at this size
        let config = KeyGenConfig::new().with_prime_rounds(1);
        let components = generate_key_components(&mut rng, 256, &config).unwrap();
        check_components(&components, 256);
    }
}
