//! TLS 1.2 record protection for `TLS_RSA_WITH_AES_128_CBC_SHA`.
//!
//! MAC-then-encrypt with an explicit IV (RFC 5246 Section 6.2.3.2):
//!
//! ```text
//! MAC   = HMAC_SHA1(mac_key, seq_num || type || version || length || plaintext)
//! block = plaintext || MAC || padding
//! wire  = IV || AES_128_CBC(enc_key, IV, block)
//! ```
//!
//! Each direction holds its own keys and a 64-bit sequence number that
//! starts at zero and increments once per record; overflow is fatal.
//!
//! Padding and MAC failures on decryption are reported with the same
//! error and comparable cost: the MAC is always computed and compared,
//! whether or not the padding was well-formed.

use mutls_crypto::{BlockCipherAlgorithm, CryptoProvider, HashAlgorithm};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::protocol::{CipherSuite, ContentType, ProtocolVersion};

/// Record MAC size in bytes (HMAC-SHA1).
pub const MAC_SIZE: usize = 20;

/// Cipher block and IV size in bytes (AES).
pub const BLOCK_SIZE: usize = 16;

/// A per-direction 64-bit record sequence number.
///
/// Each use emits the pre-increment value; wrap-around is an error, never
/// silent.
#[derive(Debug, Default)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    /// Create a sequence number starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the current value and advance.
    pub fn next(&mut self) -> Result<u64> {
        let value = self.0;
        self.0 = self
            .0
            .checked_add(1)
            .ok_or_else(|| Error::Internal("record sequence number overflow".into()))?;
        Ok(value)
    }

    /// The value the next record will use.
    pub fn peek(&self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, value: u64) {
        self.0 = value;
    }
}

/// The PRF key-block expansion, partitioned.
///
/// Layout (88 bytes total):
/// client_write_MAC_key (20) || server_write_MAC_key (20) ||
/// client_write_key (16) || server_write_key (16) || IV seed (16)
pub struct KeyBlock {
    /// HMAC-SHA1 key for records this client sends
    pub client_write_mac_key: Zeroizing<Vec<u8>>,
    /// HMAC-SHA1 key for records the server sends
    pub server_write_mac_key: Zeroizing<Vec<u8>>,
    /// AES key for records this client sends
    pub client_write_key: Zeroizing<Vec<u8>>,
    /// AES key for records the server sends
    pub server_write_key: Zeroizing<Vec<u8>>,
    /// Opaque nonce seed for write-side IV derivation
    pub iv_seed: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for KeyBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyBlock").finish_non_exhaustive()
    }
}

impl KeyBlock {
    /// Partition an 88-byte key block.
    pub fn partition(key_block: &[u8]) -> Result<Self> {
        let suite = CipherSuite::RsaWithAes128CbcSha;
        if key_block.len() != suite.key_block_size() {
            return Err(Error::Internal(format!(
                "key block must be {} bytes, got {}",
                suite.key_block_size(),
                key_block.len()
            )));
        }

        let mac = suite.mac_key_size();
        let key = suite.enc_key_size();
        let iv = suite.block_size();

        let mut offset = 0;
        let mut take = |n: usize| {
            let part = Zeroizing::new(key_block[offset..offset + n].to_vec());
            offset += n;
            part
        };

        Ok(Self {
            client_write_mac_key: take(mac),
            server_write_mac_key: take(mac),
            client_write_key: take(key),
            server_write_key: take(key),
            iv_seed: take(iv),
        })
    }
}

/// Write-side IV generator.
///
/// A 128-bit counter is seeded from the key block's IV seed; each
/// record's IV is the first 16 bytes of SHA-256 over the counter's
/// big-endian encoding, and the counter advances once per record. IVs are
/// unique per record under a key and independent of the plaintext.
struct IvSequence {
    counter: u128,
}

impl IvSequence {
    fn new(seed: &[u8]) -> Result<Self> {
        let seed: [u8; BLOCK_SIZE] = seed
            .try_into()
            .map_err(|_| Error::Internal("IV seed must be 16 bytes".into()))?;
        Ok(Self {
            counter: u128::from_be_bytes(seed),
        })
    }

    fn next(&mut self, provider: &dyn CryptoProvider) -> Result<[u8; BLOCK_SIZE]> {
        let mut hash = provider.hash(HashAlgorithm::Sha256)?;
        hash.update(&self.counter.to_be_bytes());
        let digest = hash.finalize();
        self.counter = self.counter.wrapping_add(1);

        let mut iv = [0u8; BLOCK_SIZE];
        iv.copy_from_slice(&digest[..BLOCK_SIZE]);
        Ok(iv)
    }
}

/// MAC input prefix: seq_num (8) || type (1) || version (2) || length (2).
fn mac_prefix(seq: u64, content_type: ContentType, length: u16) -> [u8; 13] {
    let mut prefix = [0u8; 13];
    prefix[..8].copy_from_slice(&seq.to_be_bytes());
    prefix[8] = content_type.to_u8();
    prefix[9..11].copy_from_slice(&ProtocolVersion::Tls12.to_u16().to_be_bytes());
    prefix[11..13].copy_from_slice(&length.to_be_bytes());
    prefix
}

/// Write-side record protection.
///
/// Immutable once installed; only the sequence number and IV counter
/// advance.
pub struct RecordEncryptor {
    enc_key: Zeroizing<Vec<u8>>,
    mac_key: Zeroizing<Vec<u8>>,
    seq: SequenceNumber,
    ivs: IvSequence,
}

impl std::fmt::Debug for RecordEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordEncryptor")
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

impl RecordEncryptor {
    /// Create an encryptor from the client-write half of the key block.
    pub fn new(
        enc_key: Zeroizing<Vec<u8>>,
        mac_key: Zeroizing<Vec<u8>>,
        iv_seed: &[u8],
    ) -> Result<Self> {
        Ok(Self {
            enc_key,
            mac_key,
            seq: SequenceNumber::new(),
            ivs: IvSequence::new(iv_seed)?,
        })
    }

    /// Protect one record payload; returns `IV || ciphertext`.
    pub fn encrypt(
        &mut self,
        provider: &dyn CryptoProvider,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        if plaintext.len() > crate::record::MAX_FRAGMENT_SIZE {
            return Err(Error::Internal(format!(
                "plaintext fragment of {} bytes",
                plaintext.len()
            )));
        }

        let seq = self.seq.next()?;

        let mut mac = provider.hmac(HashAlgorithm::Sha1, &self.mac_key)?;
        mac.update(&mac_prefix(seq, content_type, plaintext.len() as u16));
        mac.update(plaintext);
        let mac = mac.finalize();

        // TLS padding: padlen bytes, each equal to padlen - 1
        let padlen = BLOCK_SIZE - ((plaintext.len() + MAC_SIZE) % BLOCK_SIZE);
        let mut block_input =
            Zeroizing::new(Vec::with_capacity(plaintext.len() + MAC_SIZE + padlen));
        block_input.extend_from_slice(plaintext);
        block_input.extend_from_slice(&mac);
        block_input.extend(std::iter::repeat((padlen - 1) as u8).take(padlen));

        let iv = self.ivs.next(provider)?;
        let cipher = provider.block_cipher(BlockCipherAlgorithm::Aes128Cbc)?;
        let ciphertext = cipher.encrypt(&self.enc_key, &iv, &block_input)?;

        let mut record = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
        record.extend_from_slice(&iv);
        record.extend_from_slice(&ciphertext);
        Ok(record)
    }

    /// The sequence number the next record will use.
    pub fn next_sequence(&self) -> u64 {
        self.seq.peek()
    }

    #[cfg(test)]
    pub(crate) fn set_sequence(&mut self, value: u64) {
        self.seq.set(value);
    }
}

/// Read-side record protection.
pub struct RecordDecryptor {
    enc_key: Zeroizing<Vec<u8>>,
    mac_key: Zeroizing<Vec<u8>>,
    seq: SequenceNumber,
}

impl std::fmt::Debug for RecordDecryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDecryptor")
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

impl RecordDecryptor {
    /// Create a decryptor from the server-write half of the key block.
    pub fn new(enc_key: Zeroizing<Vec<u8>>, mac_key: Zeroizing<Vec<u8>>) -> Self {
        Self {
            enc_key,
            mac_key,
            seq: SequenceNumber::new(),
        }
    }

    /// Unprotect one record payload of the form `IV || ciphertext`.
    ///
    /// Padding and MAC failures are indistinguishable: both verdicts are
    /// collected as constant-time choices, the MAC is computed in either
    /// case, and the single combined check yields [`Error::BadRecordMac`].
    pub fn decrypt(
        &mut self,
        provider: &dyn CryptoProvider,
        content_type: ContentType,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        // Smallest valid payload: IV plus one block holding MAC + padding
        if payload.len() < 2 * BLOCK_SIZE || (payload.len() - BLOCK_SIZE) % BLOCK_SIZE != 0 {
            return Err(Error::BadRecordMac);
        }

        let (iv, ciphertext) = payload.split_at(BLOCK_SIZE);
        let cipher = provider.block_cipher(BlockCipherAlgorithm::Aes128Cbc)?;
        let decrypted = Zeroizing::new(
            cipher
                .decrypt(&self.enc_key, iv, ciphertext)
                .map_err(|_| Error::BadRecordMac)?,
        );

        let total = decrypted.len();
        let padlen = decrypted[total - 1] as usize + 1;
        let seq = self.seq.next()?;

        if padlen + MAC_SIZE > total {
            // Unpaddable record: compute a MAC of comparable cost before
            // reporting the shared error
            let mut mac = provider.hmac(HashAlgorithm::Sha1, &self.mac_key)?;
            mac.update(&mac_prefix(seq, content_type, 0));
            mac.update(&decrypted);
            let _ = mac.finalize();
            return Err(Error::BadRecordMac);
        }

        // Every padding byte must equal padlen - 1
        let pad_byte = (padlen - 1) as u8;
        let pad_start = total - padlen;
        let mut pad_ok = Choice::from(1u8);
        for &b in &decrypted[pad_start..] {
            pad_ok &= b.ct_eq(&pad_byte);
        }

        let content_len = total - MAC_SIZE - padlen;
        let plaintext = &decrypted[..content_len];
        let received_mac = &decrypted[content_len..content_len + MAC_SIZE];

        let mut mac = provider.hmac(HashAlgorithm::Sha1, &self.mac_key)?;
        mac.update(&mac_prefix(seq, content_type, content_len as u16));
        mac.update(plaintext);
        let computed_mac = mac.finalize();
        let mac_ok = computed_mac.ct_eq(received_mac);

        if bool::from(pad_ok & mac_ok) {
            Ok(plaintext.to_vec())
        } else {
            Err(Error::BadRecordMac)
        }
    }

    /// The sequence number the next record will use.
    pub fn next_sequence(&self) -> u64 {
        self.seq.peek()
    }
}
