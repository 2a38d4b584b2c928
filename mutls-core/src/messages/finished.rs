//! Finished message (RFC 5246 Section 7.4.9).
//!
//! The body is verify_data: 12 bytes of PRF output proving knowledge of
//! the master secret and agreement on the transcript.

use crate::error::{Error, Result};
use crate::prf::VERIFY_DATA_SIZE;

/// Finished message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    /// Verify data (exactly 12 bytes)
    pub verify_data: Vec<u8>,
}

impl Finished {
    /// Create a new Finished message.
    pub fn new(verify_data: Vec<u8>) -> Self {
        Self { verify_data }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.verify_data.len() != VERIFY_DATA_SIZE {
            return Err(Error::Internal(format!(
                "verify_data must be {} bytes, got {}",
                VERIFY_DATA_SIZE,
                self.verify_data.len()
            )));
        }
        Ok(self.verify_data.clone())
    }

    /// Decode a message body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != VERIFY_DATA_SIZE {
            return Err(Error::DecodeError(format!(
                "Finished verify_data must be {} bytes, got {}",
                VERIFY_DATA_SIZE,
                data.len()
            )));
        }
        Ok(Self {
            verify_data: data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let msg = Finished::new(vec![0x7F; 12]);
        let encoded = msg.encode().unwrap();
        assert_eq!(encoded.len(), 12);
        assert_eq!(Finished::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_rejects_wrong_sizes() {
        assert!(Finished::new(vec![0; 11]).encode().is_err());
        assert!(Finished::decode(&[0; 11]).is_err());
        assert!(Finished::decode(&[0; 13]).is_err());
        assert!(Finished::decode(&[]).is_err());
    }
}
