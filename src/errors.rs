//! Error types.

/// Alias for [`core::result::Result`] with the `rsa-engine` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Requested modulus is smaller than the minimum supported size.
    KeySizeTooSmall,

    /// The key half required by the operation is not loaded.
    KeyNotLoaded,

    /// The key has been destroyed.
    InvalidState,

    /// Message too long for the active padding scheme.
    MessageTooLong,

    /// PKCS#1 v1.5 padding is malformed.
    InvalidPadding,

    /// OAEP decryption failed.
    DecryptionFailed,

    /// No modular inverse exists.
    NoInverse,

    /// Ciphertext has the wrong length or is not smaller than the modulus.
    InvalidCiphertext,

    /// Invalid modulus.
    InvalidModulus,

    /// Invalid exponent.
    InvalidExponent,

    /// Invalid prime value.
    InvalidPrime,

    /// Invalid CRT coefficient.
    InvalidCoefficient,

    /// Label too long.
    LabelTooLong,

    /// Invalid padding length.
    InvalidPadLen,

    /// Internal error.
    Internal,

    /// PKCS#1 encoding error.
    Pkcs1(pkcs1::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Pkcs1(err) => Some(err),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::KeySizeTooSmall => write!(f, "key size too small"),
            Error::KeyNotLoaded => write!(f, "key not loaded"),
            Error::InvalidState => write!(f, "key has been destroyed"),
            Error::MessageTooLong => write!(f, "message too long"),
            Error::InvalidPadding => write!(f, "invalid padding"),
            Error::DecryptionFailed => write!(f, "decryption failed"),
            Error::NoInverse => write!(f, "no modular inverse exists"),
            Error::InvalidCiphertext => write!(f, "invalid ciphertext"),
            Error::InvalidModulus => write!(f, "invalid modulus"),
            Error::InvalidExponent => write!(f, "invalid exponent"),
            Error::InvalidPrime => write!(f, "invalid prime value"),
            Error::InvalidCoefficient => write!(f, "invalid coefficient"),
            Error::LabelTooLong => write!(f, "label too long"),
            Error::InvalidPadLen => write!(f, "invalid padding length"),
            Error::Internal => write!(f, "internal error"),
            Error::Pkcs1(err) => write!(f, "{}", err),
        }
    }
}

impl From<pkcs1::Error> for Error {
    fn from(err: pkcs1::Error) -> Error {
        Error::Pkcs1(err)
    }
}

impl From<pkcs1::der::Error> for Error {
    fn from(err: pkcs1::der::Error) -> Error {
        Error::Pkcs1(pkcs1::Error::from(err))
    }
}
