//! # mutls Cryptographic Provider Interface
//!
//! This crate defines the cryptographic abstraction layer for mutls.
//! It provides trait-based interfaces that allow pluggable cryptographic
//! backends; the protocol core never names a concrete primitive
//! implementation.
//!
//! The interface is deliberately small: it covers exactly the algorithms
//! required by `TLS_RSA_WITH_AES_128_CBC_SHA` with RSA key transport and
//! RSA PKCS#1 v1.5 client authentication.
//!
//! ## Architecture
//!
//! ```text
//! CryptoProvider (main trait)
//! ├── Hash         (SHA-1, SHA-256)
//! ├── Hmac         (HMAC over the hash functions)
//! ├── BlockCipher  (AES-128-CBC, raw block-aligned mode)
//! ├── KeyTransport (RSA PKCS#1 v1.5 encryption to a certificate)
//! ├── Signature    (RSA PKCS#1 v1.5 sign/verify)
//! └── Random       (CSPRNG)
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

pub mod block;
pub mod error;
pub mod hash;
pub mod hmac;
pub mod key_transport;
pub mod random;
pub mod signature;

pub use block::{BlockCipher, BlockCipherAlgorithm};
pub use error::{Error, Result};
pub use hash::{Hash, HashAlgorithm};
pub use hmac::Hmac;
pub use key_transport::KeyTransport;
pub use random::Random;
pub use signature::{Signature, SignatureAlgorithm};

/// The main cryptographic provider trait.
///
/// Implementations of this trait provide all cryptographic operations
/// needed by mutls. The trait is object-safe, allowing the protocol core
/// to hold a provider behind `dyn CryptoProvider`.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use in
/// multi-threaded environments.
pub trait CryptoProvider: Send + Sync + 'static {
    /// Create a new instance of the crypto provider.
    fn new() -> Self
    where
        Self: Sized;

    /// Get a hash function instance.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - The hash algorithm to use
    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>>;

    /// Get an HMAC instance keyed with `key`.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - The hash algorithm to use for HMAC
    /// * `key` - The HMAC key
    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>>;

    /// Get a block cipher instance.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - The block cipher algorithm to use
    fn block_cipher(&self, algorithm: BlockCipherAlgorithm) -> Result<Box<dyn BlockCipher>>;

    /// Get the RSA key transport implementation.
    fn key_transport(&self) -> &dyn KeyTransport;

    /// Get a signature scheme instance.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - The signature algorithm to use
    fn signature(&self, algorithm: SignatureAlgorithm) -> Result<Box<dyn Signature>>;

    /// Get the random number generator.
    fn random(&self) -> &dyn Random;
}
