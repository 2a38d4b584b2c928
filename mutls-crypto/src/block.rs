//! Block cipher interface (raw CBC mode).

use crate::Result;

/// Block cipher algorithms supported by mutls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockCipherAlgorithm {
    /// AES-128 in CBC mode (TLS 1.2 CBC cipher suites)
    Aes128Cbc,
}

impl BlockCipherAlgorithm {
    /// Get the key size in bytes for this algorithm.
    pub const fn key_size(self) -> usize {
        match self {
            BlockCipherAlgorithm::Aes128Cbc => 16,
        }
    }

    /// Get the block size in bytes for this algorithm.
    pub const fn block_size(self) -> usize {
        match self {
            BlockCipherAlgorithm::Aes128Cbc => 16,
        }
    }

    /// Get the name of this algorithm as used in TLS.
    pub const fn name(self) -> &'static str {
        match self {
            BlockCipherAlgorithm::Aes128Cbc => "AES_128_CBC",
        }
    }
}

/// Block cipher trait (CBC mode, no padding).
///
/// The caller is responsible for TLS-style padding: inputs to both
/// operations must be a whole number of blocks. MAC-then-encrypt record
/// protection layers its own padding and MAC handling on top of these raw
/// operations.
pub trait BlockCipher: Send {
    /// Encrypt `data` under `key` with the given `iv`.
    ///
    /// # Errors
    ///
    /// Fails if the key or IV size does not match the algorithm, or if
    /// `data` is not block-aligned.
    fn encrypt(&self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt `data` under `key` with the given `iv`.
    ///
    /// # Errors
    ///
    /// Fails if the key or IV size does not match the algorithm, or if
    /// `data` is not block-aligned.
    fn decrypt(&self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// Get the algorithm this cipher implements.
    fn algorithm(&self) -> BlockCipherAlgorithm;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes128cbc_parameters() {
        let alg = BlockCipherAlgorithm::Aes128Cbc;
        assert_eq!(alg.key_size(), 16);
        assert_eq!(alg.block_size(), 16);
        assert_eq!(alg.name(), "AES_128_CBC");
    }
}
