//! ClientKeyExchange message (RFC 5246 Section 7.4.7).
//!
//! For RSA key transport the body is the PKCS#1 v1.5 encryption of the
//! 48-byte pre-master secret, carried with a 2-byte length:
//!
//! ```text
//! struct {
//!     public-key-encrypted PreMasterSecret pre_master_secret;
//! } ClientKeyExchange;
//! ```

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Error, Result};

/// ClientKeyExchange message for RSA key transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKeyExchange {
    /// RSA-encrypted pre-master secret
    pub encrypted_pre_master_secret: Vec<u8>,
}

impl ClientKeyExchange {
    /// Create a new ClientKeyExchange message.
    pub fn new(encrypted_pre_master_secret: Vec<u8>) -> Self {
        Self {
            encrypted_pre_master_secret,
        }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.encrypted_pre_master_secret.len() > 65535 {
            return Err(Error::DecodeError("encrypted secret too large".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_u16(self.encrypted_pre_master_secret.len() as u16);
        buf.put_slice(&self.encrypted_pre_master_secret);
        Ok(buf.to_vec())
    }

    /// Decode a message body.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(Error::DecodeError("ClientKeyExchange too short".into()));
        }

        let length = data.get_u16() as usize;
        if data.len() != length {
            return Err(Error::DecodeError(format!(
                "encrypted secret length {} does not match body of {}",
                length,
                data.len()
            )));
        }

        Ok(Self {
            encrypted_pre_master_secret: data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        // A 2048-bit RSA ciphertext is 256 bytes
        let msg = ClientKeyExchange::new(vec![0xC5; 256]);
        let encoded = msg.encode().unwrap();
        assert_eq!(&encoded[..2], &[0x01, 0x00]);
        assert_eq!(ClientKeyExchange::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        assert!(ClientKeyExchange::decode(&[0x00, 0x04, 0xAA]).is_err());
        assert!(ClientKeyExchange::decode(&[0x00]).is_err());
    }
}
