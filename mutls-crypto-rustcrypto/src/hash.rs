//! Hash function implementations using the `sha1` and `sha2` crates.

use mutls_crypto::{Hash, HashAlgorithm, Result};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Create a hash instance for the specified algorithm.
pub fn create_hash(algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
    match algorithm {
        HashAlgorithm::Sha1 => Ok(Box::new(Sha1Hash::default())),
        HashAlgorithm::Sha256 => Ok(Box::new(Sha256Hash::default())),
    }
}

/// SHA-1 hash function (FIPS 180-4).
///
/// Only used inside HMAC-SHA1 record MACs; never as a collision-resistant
/// hash on its own.
#[derive(Default)]
struct Sha1Hash {
    hasher: Sha1,
}

impl Hash for Sha1Hash {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        20
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha1
    }
}

/// SHA-256 hash function (FIPS 180-4).
#[derive(Default)]
struct Sha256Hash {
    hasher: Sha256,
}

impl Hash for Sha256Hash {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }
}
