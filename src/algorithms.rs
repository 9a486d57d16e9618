//! Useful algorithms related to RSA.

pub(crate) mod ct;
pub(crate) mod generate;
pub(crate) mod math;
pub(crate) mod mgf;
pub(crate) mod modexp;
pub(crate) mod oaep;
pub(crate) mod pad;
pub(crate) mod pkcs1v15;
pub(crate) mod prime;
pub(crate) mod rsa;
