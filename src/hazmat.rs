//! ⚠️ Low-level "hazmat" RSA functions.
//!
//! # ☢️️ WARNING: HAZARDOUS API ☢️
//!
//! This module holds functions that apply RSA's core encryption and decryption
//! primitives to raw data without adding or removing appropriate padding, along
//! with the number theory underneath them. A well-reviewed padding scheme is
//! crucial to the security of RSA, so there are very few valid uses cases for
//! this API. It's intended to be used for testing, benchmarking and
//! implementing well-reviewed higher-level constructions.
//!
//! We do NOT recommend using it to implement any algorithm which has not
//! received extensive peer review by cryptographers.

pub use crate::algorithms::modexp::{mod_exp, MontgomeryContext};
pub use crate::algorithms::prime::{generate_prime, is_probable_prime, DEFAULT_PRIME_ROUNDS};
pub use crate::algorithms::rsa::{crt_decrypt, rsa_decrypt, rsa_decrypt_and_check, rsa_encrypt};
