//! PKCS#1 encoding support.
//!
//! Keys are stored as the ASN.1 `RSAPublicKey` and `RSAPrivateKey` structures
//! from [RFC8017 Appendix A.1]. PEM helpers come from the provided methods of
//! the [`pkcs1`] traits when the `pem` feature is enabled.
//!
//! [RFC8017 Appendix A.1]: https://datatracker.ietf.org/doc/html/rfc8017#appendix-A.1

use core::convert::TryFrom;

use num_bigint::BigUint;
use pkcs1::der::{Document, SecretDocument};
use pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use zeroize::Zeroizing;

use crate::algorithms::ct::biguint_eq_choice;
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

fn uint(bytes: pkcs1::UintRef<'_>) -> BigUint {
    BigUint::from_bytes_be(bytes.as_bytes())
}

impl DecodeRsaPrivateKey for RsaPrivateKey {
    fn from_pkcs1_der(bytes: &[u8]) -> pkcs1::Result<Self> {
        let pkcs1_key = pkcs1::RsaPrivateKey::try_from(bytes)?;

        // Multi-prime RSA keys not currently supported
        if pkcs1_key.version() != pkcs1::Version::TwoPrime {
            return Err(pkcs1::Error::Version);
        }

        let n = uint(pkcs1_key.modulus);
        let e = uint(pkcs1_key.public_exponent);
        let d = uint(pkcs1_key.private_exponent);
        let prime1 = uint(pkcs1_key.prime1);
        let prime2 = uint(pkcs1_key.prime2);
        let primes = vec![prime1, prime2];

        let key = RsaPrivateKey::from_components(n, e, d, primes).map_err(|err| {
            log::debug!("rejecting PKCS#1 private key: {}", err);
            pkcs1::Error::Crypto
        })?;

        // The stored CRT values must agree with the ones derived from the primes.
        let (dp, dq, qinv) = match (key.dp(), key.dq(), key.qinv()) {
            (Some(dp), Some(dq), Some(qinv)) => (dp, dq, qinv),
            _ => return Err(pkcs1::Error::Crypto),
        };
        let stored_dp = Zeroizing::new(uint(pkcs1_key.exponent1));
        let stored_dq = Zeroizing::new(uint(pkcs1_key.exponent2));
        let stored_qinv = Zeroizing::new(uint(pkcs1_key.coefficient));
        let matches = biguint_eq_choice(dp, &stored_dp)
            & biguint_eq_choice(dq, &stored_dq)
            & biguint_eq_choice(qinv, &stored_qinv);

        if bool::from(matches) {
            Ok(key)
        } else {
            Err(pkcs1::Error::Crypto)
        }
    }
}

impl DecodeRsaPublicKey for RsaPublicKey {
    fn from_pkcs1_der(bytes: &[u8]) -> pkcs1::Result<Self> {
        let pkcs1_key = pkcs1::RsaPublicKey::try_from(bytes)?;
        let n = uint(pkcs1_key.modulus);
        let e = uint(pkcs1_key.public_exponent);
        RsaPublicKey::new(n, e).map_err(|_| pkcs1::Error::Crypto)
    }
}

impl EncodeRsaPrivateKey for RsaPrivateKey {
    /// Fails with [`pkcs1::Error::Crypto`] for keys imported without their
    /// primes, since the structure has no encoding for them.
    fn to_pkcs1_der(&self) -> pkcs1::Result<SecretDocument> {
        let primes = self.primes();
        if primes.len() != 2 {
            return Err(pkcs1::Error::Crypto);
        }
        let (dp, dq, qinv) = match (self.dp(), self.dq(), self.qinv()) {
            (Some(dp), Some(dq), Some(qinv)) => (dp, dq, qinv),
            _ => return Err(pkcs1::Error::Crypto),
        };

        let modulus = self.n().to_bytes_be();
        let public_exponent = self.e().to_bytes_be();
        let private_exponent = Zeroizing::new(self.d().to_bytes_be());
        let prime1 = Zeroizing::new(primes[0].to_bytes_be());
        let prime2 = Zeroizing::new(primes[1].to_bytes_be());
        let exponent1 = Zeroizing::new(dp.to_bytes_be());
        let exponent2 = Zeroizing::new(dq.to_bytes_be());
        let coefficient = Zeroizing::new(qinv.to_bytes_be());

        SecretDocument::try_from(pkcs1::RsaPrivateKey {
            modulus: pkcs1::UintRef::new(&modulus)?,
            public_exponent: pkcs1::UintRef::new(&public_exponent)?,
            private_exponent: pkcs1::UintRef::new(&private_exponent)?,
            prime1: pkcs1::UintRef::new(&prime1)?,
            prime2: pkcs1::UintRef::new(&prime2)?,
            exponent1: pkcs1::UintRef::new(&exponent1)?,
            exponent2: pkcs1::UintRef::new(&exponent2)?,
            coefficient: pkcs1::UintRef::new(&coefficient)?,
            other_prime_infos: None,
        })
    }
}

impl EncodeRsaPublicKey for RsaPublicKey {
    fn to_pkcs1_der(&self) -> pkcs1::Result<Document> {
        let modulus = self.n().to_bytes_be();
        let public_exponent = self.e().to_bytes_be();

        Document::try_from(pkcs1::RsaPublicKey {
            modulus: pkcs1::UintRef::new(&modulus)?,
            public_exponent: pkcs1::UintRef::new(&public_exponent)?,
        })
    }
}
