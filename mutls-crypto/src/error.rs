//! Error types for the cryptographic provider.

use std::fmt;

/// Result type for cryptographic operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested algorithm is not supported by this provider.
    UnsupportedAlgorithm(String),

    /// Invalid key size for the algorithm.
    InvalidKeySize {
        /// Expected key size in bytes
        expected: usize,
        /// Actual key size in bytes
        actual: usize,
    },

    /// Invalid IV size for the algorithm.
    InvalidIvSize {
        /// Expected IV size in bytes
        expected: usize,
        /// Actual IV size in bytes
        actual: usize,
    },

    /// Invalid key length (generic).
    InvalidKeyLength,

    /// Input length is not a multiple of the cipher block size.
    UnalignedInput,

    /// Signature verification failed.
    SignatureVerificationFailed,

    /// Invalid public key.
    InvalidPublicKey,

    /// Invalid private key.
    InvalidPrivateKey,

    /// The certificate could not be parsed far enough to find a key.
    MalformedCertificate(String),

    /// Encryption failed.
    EncryptionFailed,

    /// Decryption failed.
    DecryptionFailed,

    /// Signing failed.
    SigningFailed,

    /// Random number generation failed.
    RandomGenerationFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedAlgorithm(s) => write!(f, "Algorithm not supported: {}", s),
            Error::InvalidKeySize { expected, actual } => {
                write!(
                    f,
                    "Invalid key size: expected {} bytes, got {}",
                    expected, actual
                )
            },
            Error::InvalidIvSize { expected, actual } => {
                write!(
                    f,
                    "Invalid IV size: expected {} bytes, got {}",
                    expected, actual
                )
            },
            Error::InvalidKeyLength => write!(f, "Invalid key length"),
            Error::UnalignedInput => write!(f, "Input is not block-aligned"),
            Error::SignatureVerificationFailed => write!(f, "Signature verification failed"),
            Error::InvalidPublicKey => write!(f, "Invalid public key"),
            Error::InvalidPrivateKey => write!(f, "Invalid private key"),
            Error::MalformedCertificate(msg) => write!(f, "Malformed certificate: {}", msg),
            Error::EncryptionFailed => write!(f, "Encryption failed"),
            Error::DecryptionFailed => write!(f, "Decryption failed"),
            Error::SigningFailed => write!(f, "Signing failed"),
            Error::RandomGenerationFailed => write!(f, "Random number generation failed"),
        }
    }
}

impl std::error::Error for Error {}
