//! RSA public and private keys.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::OnceLock;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::algorithms::generate::generate_key_components;
use crate::algorithms::modexp::MontgomeryContext;
use crate::algorithms::rsa::{compute_crt_values, compute_private_exponent};
use crate::config::KeyGenConfig;
use crate::errors::{Error, Result};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// Smallest modulus, in bits, accepted for newly generated keys.
pub const MIN_KEY_SIZE: usize = 2048;

/// Represents the public part of an RSA key.
#[derive(Clone)]
pub struct RsaPublicKey {
    /// Modulus: product of prime numbers `p` and `q`
    n: BigUint,
    /// Public exponent: power to which a plaintext message is raised in
    /// order to encrypt it.
    e: BigUint,
    /// Lazily built Montgomery context for `n`.
    n_montgomery: OnceLock<Option<MontgomeryContext>>,
}

/// Represents a whole RSA key, public and private parts.
#[derive(Clone)]
pub struct RsaPrivateKey {
    /// Public components of the private key.
    pubkey_components: RsaPublicKey,
    /// Private exponent
    pub(crate) d: BigUint,
    /// Prime factors of N, contains either zero or two elements.
    pub(crate) primes: Vec<BigUint>,
    /// precomputed values to speed up private operations
    pub(crate) precomputed: Option<PrecomputedValues>,
}

/// CRT values derived from the private exponent and prime factors.
#[derive(Clone)]
pub(crate) struct PrecomputedValues {
    /// D mod (P-1)
    pub(crate) dp: BigUint,
    /// D mod (Q-1)
    pub(crate) dq: BigUint,
    /// Q^-1 mod P
    pub(crate) qinv: BigUint,

    p_montgomery: OnceLock<Option<MontgomeryContext>>,
    q_montgomery: OnceLock<Option<MontgomeryContext>>,
}

impl PrecomputedValues {
    fn new(d: &BigUint, p: &BigUint, q: &BigUint) -> Result<Self> {
        let (dp, dq, qinv) = compute_crt_values(d, p, q)?;

        Ok(PrecomputedValues {
            dp,
            dq,
            qinv,
            p_montgomery: OnceLock::new(),
            q_montgomery: OnceLock::new(),
        })
    }

    fn montgomery(&self, p: &BigUint, q: &BigUint) -> Option<(&MontgomeryContext, &MontgomeryContext)> {
        let p_ctx = self
            .p_montgomery
            .get_or_init(|| MontgomeryContext::new(p).ok())
            .as_ref()?;
        let q_ctx = self
            .q_montgomery
            .get_or_init(|| MontgomeryContext::new(q).ok())
            .as_ref()?;

        Some((p_ctx, q_ctx))
    }
}

impl Zeroize for PrecomputedValues {
    fn zeroize(&mut self) {
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
        self.dp = BigUint::zero();
        self.dq = BigUint::zero();
        self.qinv = BigUint::zero();
        // contexts wipe themselves when dropped
        self.p_montgomery.take();
        self.q_montgomery.take();
    }
}

impl Drop for PrecomputedValues {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl PartialEq for RsaPublicKey {
    fn eq(&self, other: &RsaPublicKey) -> bool {
        self.n == other.n && self.e == other.e
    }
}

impl Eq for RsaPublicKey {}

impl Hash for RsaPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Domain separator for RSA public keys
        state.write(b"RsaPublicKey");
        Hash::hash(&self.n, state);
        Hash::hash(&self.e, state);
    }
}

impl fmt::Debug for RsaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPublicKey")
            .field("n", &self.n)
            .field("e", &self.e)
            .finish()
    }
}

impl PublicKeyParts for RsaPublicKey {
    fn n(&self) -> &BigUint {
        &self.n
    }

    fn e(&self) -> &BigUint {
        &self.e
    }

    fn n_montgomery(&self) -> Option<&MontgomeryContext> {
        self.n_montgomery
            .get_or_init(|| MontgomeryContext::new(&self.n).ok())
            .as_ref()
    }
}

impl RsaPublicKey {
    /// Create a new public key from its components.
    ///
    /// `n` must be odd and greater than one, and `e` must satisfy `1 < e < n`.
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        check_public_components(&n, &e)?;

        Ok(RsaPublicKey {
            n,
            e,
            n_montgomery: OnceLock::new(),
        })
    }
}

impl PartialEq for RsaPrivateKey {
    #[inline]
    fn eq(&self, other: &RsaPrivateKey) -> bool {
        self.pubkey_components == other.pubkey_components
            && self.d == other.d
            && self.primes == other.primes
    }
}

impl Eq for RsaPrivateKey {}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("pubkey_components", &self.pubkey_components)
            .field("crt", &self.precomputed.is_some())
            .finish_non_exhaustive()
    }
}

impl Zeroize for RsaPrivateKey {
    fn zeroize(&mut self) {
        self.d.zeroize();
        self.d = BigUint::zero();
        for prime in self.primes.iter_mut() {
            prime.zeroize();
        }
        self.primes.clear();
        if let Some(mut precomputed) = self.precomputed.take() {
            precomputed.zeroize();
        }
    }
}

impl Drop for RsaPrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl From<RsaPrivateKey> for RsaPublicKey {
    fn from(private_key: RsaPrivateKey) -> Self {
        (&private_key).into()
    }
}

impl From<&RsaPrivateKey> for RsaPublicKey {
    fn from(private_key: &RsaPrivateKey) -> Self {
        private_key.to_public_key()
    }
}

impl PublicKeyParts for RsaPrivateKey {
    fn n(&self) -> &BigUint {
        &self.pubkey_components.n
    }

    fn e(&self) -> &BigUint {
        &self.pubkey_components.e
    }

    fn n_montgomery(&self) -> Option<&MontgomeryContext> {
        self.pubkey_components.n_montgomery()
    }
}

impl PrivateKeyParts for RsaPrivateKey {
    fn d(&self) -> &BigUint {
        &self.d
    }

    fn primes(&self) -> &[BigUint] {
        &self.primes
    }

    fn dp(&self) -> Option<&BigUint> {
        self.precomputed.as_ref().map(|p| &p.dp)
    }

    fn dq(&self) -> Option<&BigUint> {
        self.precomputed.as_ref().map(|p| &p.dq)
    }

    fn qinv(&self) -> Option<&BigUint> {
        self.precomputed.as_ref().map(|p| &p.qinv)
    }

    fn primes_montgomery(&self) -> Option<(&MontgomeryContext, &MontgomeryContext)> {
        match (self.precomputed.as_ref(), self.primes.as_slice()) {
            (Some(precomputed), [p, q]) => precomputed.montgomery(p, q),
            _ => None,
        }
    }
}

impl RsaPrivateKey {
    /// Generate a new RSA key pair of the given bit size using the passed in
    /// `rng`, a public exponent of 65537 and 50 Miller-Rabin rounds per prime.
    ///
    /// Fails with [`Error::KeySizeTooSmall`] below [`MIN_KEY_SIZE`] bits.
    pub fn new<R: CryptoRngCore + ?Sized>(rng: &mut R, bit_size: usize) -> Result<RsaPrivateKey> {
        Self::new_with_config(rng, bit_size, &KeyGenConfig::default())
    }

    /// Generate a new RSA key pair of the given bit size with the exponent
    /// policy and round count from `config`.
    pub fn new_with_config<R: CryptoRngCore + ?Sized>(
        rng: &mut R,
        bit_size: usize,
        config: &KeyGenConfig,
    ) -> Result<RsaPrivateKey> {
        if bit_size < MIN_KEY_SIZE {
            return Err(Error::KeySizeTooSmall);
        }

        Self::generate(rng, bit_size, config)
    }

    /// ⚠️ Generate a key without enforcing [`MIN_KEY_SIZE`].
    ///
    /// # ☢️️ WARNING: HAZARDOUS API ☢️
    ///
    /// Keys below 2048 bits offer little to no security. This exists for
    /// tests and benchmarks.
    #[cfg(feature = "hazmat")]
    pub fn new_unchecked<R: CryptoRngCore + ?Sized>(
        rng: &mut R,
        bit_size: usize,
        config: &KeyGenConfig,
    ) -> Result<RsaPrivateKey> {
        Self::generate(rng, bit_size, config)
    }

    pub(crate) fn generate<R: CryptoRngCore + ?Sized>(
        rng: &mut R,
        bit_size: usize,
        config: &KeyGenConfig,
    ) -> Result<RsaPrivateKey> {
        let components = generate_key_components(rng, bit_size, config)?;
        RsaPrivateKey::from_components(components.n, components.e, components.d, components.primes)
    }

    /// Constructs an RSA key pair from individual components.
    ///
    /// `primes` is either empty, giving a key that decrypts with `c^d mod n`,
    /// or holds exactly `[p, q]`, in which case the key is validated and the
    /// CRT values are precomputed.
    pub fn from_components(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        primes: Vec<BigUint>,
    ) -> Result<RsaPrivateKey> {
        let pubkey_components = RsaPublicKey::new(n, e)?;

        if !primes.is_empty() && primes.len() != 2 {
            return Err(Error::InvalidPrime);
        }

        let mut k = RsaPrivateKey {
            pubkey_components,
            d,
            primes,
            precomputed: None,
        };

        k.validate()?;

        if k.primes.is_empty() {
            log::debug!("private key loaded without prime factors; CRT disabled");
        } else {
            k.precompute()?;
        }

        Ok(k)
    }

    /// Constructs an RSA key pair from its two prime factors and public
    /// exponent, deriving `d = e⁻¹ mod (p-1)(q-1)`.
    pub fn from_p_q(p: BigUint, q: BigUint, public_exponent: BigUint) -> Result<RsaPrivateKey> {
        if p <= BigUint::one() || q <= BigUint::one() || p == q {
            return Err(Error::InvalidPrime);
        }

        let n = &p * &q;
        let d = compute_private_exponent(&p, &q, &public_exponent)?;

        Self::from_components(n, public_exponent, d, vec![p, q])
    }

    /// Get the public key from the private key, cloning `n` and `e`.
    ///
    /// Generally this is not needed since `RsaPrivateKey` implements the `PublicKeyParts` trait,
    /// but it can occasionally be useful to discard the private information entirely.
    pub fn to_public_key(&self) -> RsaPublicKey {
        self.pubkey_components.clone()
    }

    /// Performs some calculations to speed up private key operations.
    pub fn precompute(&mut self) -> Result<()> {
        if self.precomputed.is_some() || self.primes.len() != 2 {
            return Ok(());
        }

        self.precomputed = Some(PrecomputedValues::new(
            &self.d,
            &self.primes[0],
            &self.primes[1],
        )?);

        Ok(())
    }

    /// Clears precomputed values by setting to None
    pub fn clear_precomputed(&mut self) {
        self.precomputed = None;
    }

    /// Performs basic sanity checks on the key.
    /// Returns `Ok(())` if everything is good, otherwise an appropriate error.
    pub fn validate(&self) -> Result<()> {
        check_public_components(self.n(), self.e())?;

        if self.d.is_zero() || &self.d >= self.n() {
            return Err(Error::InvalidExponent);
        }

        if self.primes.is_empty() {
            return Ok(());
        }

        let one = BigUint::one();
        let mut m = BigUint::one();
        for prime in &self.primes {
            // Any primes ≤ 1 will cause divide-by-zero panics later.
            if *prime <= one {
                return Err(Error::InvalidPrime);
            }
            m *= prime;
        }

        if self.primes[0] == self.primes[1] {
            return Err(Error::InvalidPrime);
        }

        // Check that Πprimes == n.
        if &m != self.n() {
            return Err(Error::InvalidModulus);
        }

        // Check that de ≡ 1 mod p-1, for each prime.
        // This implies that e is coprime to each p-1 as e has a multiplicative
        // inverse. Therefore e is coprime to lcm(p-1,q-1) = λ(N).
        let de = &self.d * self.e();
        for prime in &self.primes {
            if !de.mod_floor(&(prime - &one)).is_one() {
                return Err(Error::InvalidExponent);
            }
        }

        Ok(())
    }
}

/// Checks that `n` is odd and greater than one and that `1 < e < n`.
#[inline]
pub(crate) fn check_public_components(n: &BigUint, e: &BigUint) -> Result<()> {
    if n <= &BigUint::one() || n.is_even() {
        return Err(Error::InvalidModulus);
    }

    if e <= &BigUint::one() || e >= n {
        return Err(Error::InvalidExponent);
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::algorithms::modexp::ModExpAlgorithm;
    use crate::algorithms::rsa::{rsa_decrypt, rsa_decrypt_and_check, rsa_encrypt};
    use pkcs1::DecodeRsaPrivateKey;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    fn big(s: &str) -> BigUint {
        BigUint::parse_bytes(s.as_bytes(), 10).unwrap()
    }

    /// 512-bit key also available as PKCS#1 PEM in `tests/data/rsa512-priv.pem`.
    pub(crate) fn test_key_512() -> RsaPrivateKey {
        RsaPrivateKey::from_components(
            big("9353930466774385905609975137998169297361893554149986716853295022578535724979677252958524466350471210367835187480748268864277464700638583474144061408845077"),
            BigUint::from(65537u32),
            big("7266398431328116344057699379749222532279343923819063639497049039389899328538543087657733766554155839834519529439851673014800261285757759040931985506583861"),
            vec![
                big("98920366548084643601728869055592650835572950932266967461790948584315647051443"),
                big("94560208308847015747498523884063394671606671904944666360068158221458669711639"),
            ],
        )
        .unwrap()
    }

    pub(crate) fn test_key_2048() -> RsaPrivateKey {
        RsaPrivateKey::from_pkcs1_der(include_bytes!("../tests/data/rsa2048-priv.der")).unwrap()
    }

    fn test_key_basics(private_key: &RsaPrivateKey) {
        private_key.validate().expect("invalid private key");

        assert!(
            private_key.d() < private_key.n(),
            "private exponent too large"
        );

        let pub_key: RsaPublicKey = private_key.clone().into();
        let m = BigUint::from(42u64);
        for algorithm in [ModExpAlgorithm::Baseline, ModExpAlgorithm::Montgomery].iter() {
            let c = rsa_encrypt(&pub_key, &m, *algorithm).expect("encryption successful");
            let m2 = rsa_decrypt_and_check::<ChaCha8Rng>(private_key, None, &c, *algorithm)
                .expect("unable to decrypt without blinding");
            assert_eq!(m, m2);
            let mut rng = ChaCha8Rng::from_seed([42; 32]);
            let m3 = rsa_decrypt_and_check(private_key, Some(&mut rng), &c, *algorithm)
                .expect("unable to decrypt with blinding");
            assert_eq!(m, m3);
        }
    }

    #[test]
    fn test_from_into() {
        let private_key = test_key_512();
        let public_key: RsaPublicKey = private_key.clone().into();

        assert_eq!(public_key.n(), private_key.n());
        assert_eq!(public_key.e(), &BigUint::from(65537u32));
        assert_eq!(public_key, private_key.to_public_key());
    }

    #[test]
    fn test_fixture_keys() {
        test_key_basics(&test_key_512());
        test_key_basics(&test_key_2048());
    }

    #[test]
    fn test_generated_keys() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        for bit_size in [64usize, 128, 512, 1024].iter() {
            let key = RsaPrivateKey::generate(&mut rng, *bit_size, &KeyGenConfig::default())
                .unwrap();
            assert_eq!(key.n().bits(), *bit_size);
            assert_eq!(key.primes().len(), 2);
            test_key_basics(&key);
        }
    }

    #[test]
    fn test_key_size_too_small() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        assert_eq!(
            RsaPrivateKey::new(&mut rng, 1024).unwrap_err(),
            Error::KeySizeTooSmall
        );
        assert_eq!(
            RsaPrivateKey::new(&mut rng, 2047).unwrap_err(),
            Error::KeySizeTooSmall
        );
    }

    #[test]
    fn test_crt_values() {
        let key = test_key_512();
        let one = BigUint::one();
        let p = &key.primes()[0];
        let q = &key.primes()[1];

        assert_eq!(key.dp().unwrap(), &(key.d() % (p - &one)));
        assert_eq!(key.dq().unwrap(), &(key.d() % (q - &one)));
        assert!(((key.qinv().unwrap() * q) % p).is_one());
        assert_eq!(
            key.qinv().unwrap(),
            &big("47638973061122417334096019128201936226471260520567738371834345845091466616405")
        );
    }

    #[test]
    fn test_crt_matches_direct() {
        let key = test_key_512();
        let mut direct = key.clone();
        direct.clear_precomputed();
        assert!(direct.dp().is_none());

        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        for _ in 0..8 {
            let c = num_bigint::RandBigInt::gen_biguint_below(&mut rng, key.n());
            assert_eq!(
                rsa_decrypt::<ChaCha8Rng>(None, &key, &c, ModExpAlgorithm::Baseline).unwrap(),
                rsa_decrypt::<ChaCha8Rng>(None, &direct, &c, ModExpAlgorithm::Baseline).unwrap(),
            );
            assert_eq!(
                rsa_decrypt::<ChaCha8Rng>(None, &key, &c, ModExpAlgorithm::Montgomery).unwrap(),
                c.modpow(key.d(), key.n()),
            );
        }
    }

    #[test]
    fn test_montgomery_contexts_cached() {
        let key = test_key_512();
        let first = key.n_montgomery().unwrap() as *const MontgomeryContext;
        let second = key.n_montgomery().unwrap() as *const MontgomeryContext;
        assert_eq!(first, second);

        let (p_ctx, q_ctx) = key.primes_montgomery().unwrap();
        assert_eq!(p_ctx.modulus(), &key.primes()[0]);
        assert_eq!(q_ctx.modulus(), &key.primes()[1]);
    }

    #[test]
    fn test_non_crt_key() {
        let key = test_key_512();
        let non_crt = RsaPrivateKey::from_components(
            key.n().clone(),
            key.e().clone(),
            key.d().clone(),
            vec![],
        )
        .unwrap();

        assert!(non_crt.primes().is_empty());
        assert!(non_crt.dp().is_none());
        assert!(non_crt.primes_montgomery().is_none());
        test_key_basics(&non_crt);
    }

    #[test]
    fn test_from_p_q() {
        let key = test_key_512();
        let derived = RsaPrivateKey::from_p_q(
            key.primes()[0].clone(),
            key.primes()[1].clone(),
            key.e().clone(),
        )
        .unwrap();

        assert_eq!(derived.n(), key.n());
        test_key_basics(&derived);

        assert_eq!(
            RsaPrivateKey::from_p_q(
                key.primes()[0].clone(),
                key.primes()[0].clone(),
                key.e().clone()
            )
            .unwrap_err(),
            Error::InvalidPrime
        );
    }

    #[test]
    fn test_validate_rejects() {
        let key = test_key_512();
        let n = key.n().clone();
        let e = key.e().clone();
        let d = key.d().clone();
        let p = key.primes()[0].clone();
        let q = key.primes()[1].clone();

        // even modulus
        assert_eq!(
            RsaPrivateKey::from_components(&n + 1u32, e.clone(), d.clone(), vec![]).unwrap_err(),
            Error::InvalidModulus
        );
        // e out of range
        assert_eq!(
            RsaPrivateKey::from_components(n.clone(), BigUint::one(), d.clone(), vec![])
                .unwrap_err(),
            Error::InvalidExponent
        );
        // wrong d
        assert_eq!(
            RsaPrivateKey::from_components(
                n.clone(),
                e.clone(),
                &d + 2u32,
                vec![p.clone(), q.clone()]
            )
            .unwrap_err(),
            Error::InvalidExponent
        );
        // primes do not multiply to n
        assert_eq!(
            RsaPrivateKey::from_components(
                n.clone(),
                e.clone(),
                d.clone(),
                vec![p.clone(), &q + 2u32]
            )
            .unwrap_err(),
            Error::InvalidModulus
        );
        // a single prime
        assert_eq!(
            RsaPrivateKey::from_components(n, e, d, vec![p]).unwrap_err(),
            Error::InvalidPrime
        );
    }

    #[test]
    fn test_public_key_new() {
        assert_eq!(
            RsaPublicKey::new(BigUint::from(3233u32), BigUint::from(17u32))
                .unwrap()
                .size(),
            2
        );
        assert_eq!(
            RsaPublicKey::new(BigUint::from(3234u32), BigUint::from(17u32)).unwrap_err(),
            Error::InvalidModulus
        );
        assert_eq!(
            RsaPublicKey::new(BigUint::one(), BigUint::from(17u32)).unwrap_err(),
            Error::InvalidModulus
        );
        assert_eq!(
            RsaPublicKey::new(BigUint::from(3233u32), BigUint::from(3233u32)).unwrap_err(),
            Error::InvalidExponent
        );
    }

    #[test]
    fn test_zeroize() {
        let mut key = test_key_512();
        key.zeroize();
        assert!(key.d().is_zero());
        assert_eq!(key.d(), &BigUint::zero());
        assert_eq!(key.d().to_string(), "0");
        assert_eq!(key.d().bits(), 0);
        assert!(key.primes().is_empty());
        assert!(key.dp().is_none());
    }

    #[test]
    fn test_zeroize_precomputed() {
        let key = test_key_512();
        let (p, q) = (&key.primes()[0], &key.primes()[1]);
        let mut precomputed = PrecomputedValues::new(key.d(), p, q).unwrap();
        assert!(precomputed.montgomery(p, q).is_some());

        precomputed.zeroize();
        assert!(precomputed.dp.is_zero());
        assert!(precomputed.dq.is_zero());
        assert!(precomputed.qinv.is_zero());
        assert_eq!(precomputed.qinv.to_string(), "0");
        assert!(precomputed.p_montgomery.get().is_none());
        assert!(precomputed.q_montgomery.get().is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let key = test_key_512();
        let debug = format!("{:?}", key);
        assert!(!debug.contains(&key.d().to_string()));
        assert!(!debug.contains(&key.primes()[0].to_string()));
    }
}
