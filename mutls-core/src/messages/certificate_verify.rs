//! CertificateVerify message (RFC 5246 Section 7.4.8).
//!
//! Proves possession of the client certificate's private key with a
//! signature over the handshake transcript:
//!
//! ```text
//! struct {
//!     SignatureAndHashAlgorithm algorithm;
//!     opaque signature<0..2^16-1>;
//! } CertificateVerify;
//! ```

use bytes::{Buf, BufMut, BytesMut};
use mutls_crypto::SignatureAlgorithm;

use crate::error::{Error, Result};

/// CertificateVerify message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateVerify {
    /// Signature algorithm
    pub algorithm: SignatureAlgorithm,

    /// Signature over the transcript bytes
    pub signature: Vec<u8>,
}

impl CertificateVerify {
    /// Create a new CertificateVerify message.
    pub fn new(algorithm: SignatureAlgorithm, signature: Vec<u8>) -> Self {
        Self {
            algorithm,
            signature,
        }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.signature.len() > 65535 {
            return Err(Error::DecodeError("signature too large".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_u16(self.algorithm.iana_codepoint());
        buf.put_u16(self.signature.len() as u16);
        buf.put_slice(&self.signature);
        Ok(buf.to_vec())
    }

    /// Decode a message body.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::DecodeError("CertificateVerify too short".into()));
        }

        let algorithm_raw = data.get_u16();
        let algorithm = SignatureAlgorithm::from_u16(algorithm_raw).ok_or_else(|| {
            Error::DecodeError(format!("unknown signature algorithm 0x{:04X}", algorithm_raw))
        })?;

        let signature_len = data.get_u16() as usize;
        if data.len() != signature_len {
            return Err(Error::DecodeError("truncated signature".into()));
        }

        Ok(Self {
            algorithm,
            signature: data.to_vec(),
        })
    }
}
