//! Error taxonomy for sealing and unsealing.

use thiserror::Error;

/// Every failure the library can report.
///
/// Errors are returned on the first violated precondition and surface to the
/// [`seal`](crate::seal) / [`unseal`](crate::unseal) caller unchanged in kind.
#[derive(Debug, Error)]
pub enum Error {
    /// No usable password or password buffer was supplied.
    #[error("password or password buffer is required")]
    PasswordRequired,

    /// The password id contains non-alphabetic characters.
    #[error("password is invalid")]
    PasswordInvalid,

    #[error("password is too short (minimum {min} characters)")]
    PasswordTooShort { min: usize },

    #[error("password buffer is too short (minimum {min} bytes)")]
    PasswordBufferTooShort { min: usize },

    /// Key options were left entirely unset.
    #[error("missing options")]
    MissingParameters,

    #[error("missing salt and salt bits")]
    MissingSalt,

    #[error("iterations must be at least 1")]
    InvalidIterations,

    #[error("invalid iv length: expected {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid encryption algorithm")]
    InvalidEncryptionAlgorithm,

    #[error("invalid hmac algorithm")]
    InvalidMacAlgorithm,

    #[error("size must be between 1 and 268435456 bytes, got {0}")]
    InvalidSize(usize),

    #[error("OS random generator unavailable: {0}")]
    GenerationFailed(getrandom::Error),

    #[error("block size must be between 1 and 255, got {0}")]
    InvalidBlockSize(usize),

    #[error("error creating cipher")]
    CipherCreationFailed,

    /// Ciphertext is not a whole number of blocks or its padding overruns it.
    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid seal")]
    InvalidSeal,

    #[error("expired seal")]
    ExpiredSeal,

    #[error("bad seal hmac value")]
    BadSealHmac,

    #[error("error base64 decoding, check input is valid base64")]
    Base64DecodeFailed(#[source] base64::DecodeError),

    #[error("error marshalling object")]
    MarshallingFailed(#[source] serde_json::Error),

    #[error("error unmarshalling object")]
    UnmarshallingFailed(#[source] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
