//! # RustCrypto-based Cryptography Provider for mutls
//!
//! This crate provides the default [`CryptoProvider`] implementation for
//! mutls, backed by the RustCrypto project crates:
//!
//! - **Hash**: SHA-1, SHA-256 (`sha1`, `sha2`)
//! - **HMAC**: HMAC-SHA1, HMAC-SHA256 (`hmac`)
//! - **Block cipher**: AES-128-CBC (`aes`, `cbc`)
//! - **Key transport**: RSA PKCS#1 v1.5 encryption (`rsa`)
//! - **Signatures**: RSA PKCS#1 v1.5 (`rsa`)
//! - **RNG**: OS entropy via `rand::rngs::OsRng`
//!
//! It also carries the minimal DER walk that locates the
//! SubjectPublicKeyInfo inside an X.509 certificate; no other ASN.1
//! parsing happens in this workspace.

#![deny(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

use mutls_crypto::{
    BlockCipher, BlockCipherAlgorithm, CryptoProvider, Hash, HashAlgorithm, Hmac, KeyTransport,
    Random, Result, Signature, SignatureAlgorithm,
};

pub mod block;
pub mod hash;
pub mod hmac;
pub mod key_transport;
pub mod random;
pub mod signature;
mod spki;

use key_transport::RsaKeyTransport;
use random::OsRandom;

/// Cryptography provider backed by the RustCrypto crates.
///
/// # Thread Safety
///
/// This provider is `Send + Sync` and can be safely shared across threads.
#[derive(Debug, Default)]
pub struct RustCryptoProvider {
    random: OsRandom,
    key_transport: RsaKeyTransport,
}

impl CryptoProvider for RustCryptoProvider {
    fn new() -> Self {
        Self::default()
    }

    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
        hash::create_hash(algorithm)
    }

    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
        hmac::create_hmac(algorithm, key)
    }

    fn block_cipher(&self, algorithm: BlockCipherAlgorithm) -> Result<Box<dyn BlockCipher>> {
        block::create_block_cipher(algorithm)
    }

    fn key_transport(&self) -> &dyn KeyTransport {
        &self.key_transport
    }

    fn signature(&self, algorithm: SignatureAlgorithm) -> Result<Box<dyn Signature>> {
        signature::create_signature(algorithm)
    }

    fn random(&self) -> &dyn Random {
        &self.random
    }
}
