//! Block cipher implementations using the `aes` and `cbc` crates.

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use mutls_crypto::{BlockCipher, BlockCipherAlgorithm, Error, Result};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Create a block cipher instance for the specified algorithm.
pub fn create_block_cipher(algorithm: BlockCipherAlgorithm) -> Result<Box<dyn BlockCipher>> {
    match algorithm {
        BlockCipherAlgorithm::Aes128Cbc => Ok(Box::new(Aes128CbcCipher)),
    }
}

/// AES-128 in CBC mode, raw (no padding).
///
/// TLS record protection performs its own padding and MAC handling; this
/// type only accepts block-aligned input.
struct Aes128CbcCipher;

impl Aes128CbcCipher {
    fn check_input(key: &[u8], iv: &[u8], data: &[u8]) -> Result<([u8; 16], [u8; 16])> {
        let key: [u8; 16] = key.try_into().map_err(|_| Error::InvalidKeySize {
            expected: 16,
            actual: key.len(),
        })?;
        let iv: [u8; 16] = iv.try_into().map_err(|_| Error::InvalidIvSize {
            expected: 16,
            actual: iv.len(),
        })?;
        if data.len() % 16 != 0 {
            return Err(Error::UnalignedInput);
        }
        Ok((key, iv))
    }
}

impl BlockCipher for Aes128CbcCipher {
    fn encrypt(&self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let (key, iv) = Self::check_input(key, iv, data)?;
        let cipher = Aes128CbcEnc::new(&key.into(), &iv.into());
        Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(data))
    }

    fn decrypt(&self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let (key, iv) = Self::check_input(key, iv, data)?;
        let cipher = Aes128CbcDec::new(&key.into(), &iv.into());
        cipher
            .decrypt_padded_vec_mut::<NoPadding>(data)
            .map_err(|_| Error::DecryptionFailed)
    }

    fn algorithm(&self) -> BlockCipherAlgorithm {
        BlockCipherAlgorithm::Aes128Cbc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let cipher = create_block_cipher(BlockCipherAlgorithm::Aes128Cbc).unwrap();
        let key = [0x11u8; 16];
        let iv = [0x22u8; 16];
        let plaintext = [0x42u8; 48];

        let ciphertext = cipher.encrypt(&key, &iv, &plaintext).unwrap();
        assert_eq!(ciphertext.len(), 48);
        assert_ne!(&ciphertext[..], &plaintext[..]);

        let decrypted = cipher.decrypt(&key, &iv, &ciphertext).unwrap();
        assert_eq!(&decrypted[..], &plaintext[..]);
    }

    #[test]
    fn test_iv_changes_ciphertext() {
        let cipher = create_block_cipher(BlockCipherAlgorithm::Aes128Cbc).unwrap();
        let key = [0x11u8; 16];
        let plaintext = [0u8; 16];

        let a = cipher.encrypt(&key, &[0u8; 16], &plaintext).unwrap();
        let b = cipher.encrypt(&key, &[1u8; 16], &plaintext).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_bad_sizes() {
        let cipher = create_block_cipher(BlockCipherAlgorithm::Aes128Cbc).unwrap();

        assert!(matches!(
            cipher.encrypt(&[0u8; 8], &[0u8; 16], &[0u8; 16]),
            Err(Error::InvalidKeySize { .. })
        ));
        assert!(matches!(
            cipher.encrypt(&[0u8; 16], &[0u8; 8], &[0u8; 16]),
            Err(Error::InvalidIvSize { .. })
        ));
        assert!(matches!(
            cipher.encrypt(&[0u8; 16], &[0u8; 16], &[0u8; 17]),
            Err(Error::UnalignedInput)
        ));
    }
}
