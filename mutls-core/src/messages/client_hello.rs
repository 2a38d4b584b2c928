//! ClientHello message (RFC 5246 Section 7.4.1.2).
//!
//! ```text
//! struct {
//!     ProtocolVersion client_version = 0x0303;
//!     Random random;
//!     SessionID session_id;
//!     CipherSuite cipher_suites<2..2^16-2>;
//!     CompressionMethod compression_methods<1..2^8-1>;
//! } ClientHello;
//! ```
//!
//! This client offers exactly one cipher suite and the null compression
//! method, and never resumes, so the session ID is empty and no
//! extensions are sent.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::{CipherSuite, ProtocolVersion, COMPRESSION_NULL};

/// ClientHello message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// Client random (32 bytes)
    pub random: [u8; 32],

    /// Session ID (always empty for this client)
    pub session_id: Vec<u8>,

    /// Offered cipher suites, in preference order
    pub cipher_suites: Vec<CipherSuite>,

    /// Offered compression methods
    pub compression_methods: Vec<u8>,
}

impl ClientHello {
    /// Create the ClientHello this profile sends.
    pub fn new(random: [u8; 32]) -> Self {
        Self {
            random,
            session_id: Vec::new(),
            cipher_suites: vec![CipherSuite::RsaWithAes128CbcSha],
            compression_methods: vec![COMPRESSION_NULL],
        }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.session_id.len() > 32 {
            return Err(Error::DecodeError("session ID too long".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_u16(ProtocolVersion::Tls12.to_u16());
        buf.put_slice(&self.random);

        buf.put_u8(self.session_id.len() as u8);
        buf.put_slice(&self.session_id);

        buf.put_u16((self.cipher_suites.len() * 2) as u16);
        for suite in &self.cipher_suites {
            buf.put_u16(suite.to_u16());
        }

        buf.put_u8(self.compression_methods.len() as u8);
        buf.put_slice(&self.compression_methods);

        Ok(buf.to_vec())
    }

    /// Decode a message body.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 2 + 32 + 1 {
            return Err(Error::DecodeError("ClientHello too short".into()));
        }

        let version = data.get_u16();
        if version != ProtocolVersion::Tls12.to_u16() {
            return Err(Error::ProtocolVersion);
        }

        let mut random = [0u8; 32];
        data.copy_to_slice(&mut random);

        let session_id_len = data.get_u8() as usize;
        if session_id_len > 32 || data.len() < session_id_len {
            return Err(Error::DecodeError("invalid session ID".into()));
        }
        let session_id = data[..session_id_len].to_vec();
        data.advance(session_id_len);

        if data.len() < 2 {
            return Err(Error::DecodeError("truncated cipher suite list".into()));
        }
        let suites_len = data.get_u16() as usize;
        if suites_len % 2 != 0 || data.len() < suites_len {
            return Err(Error::DecodeError("invalid cipher suite list".into()));
        }
        let mut cipher_suites = Vec::with_capacity(suites_len / 2);
        for _ in 0..suites_len / 2 {
            let raw = data.get_u16();
            let suite = CipherSuite::from_u16(raw).ok_or_else(|| {
                Error::DecodeError(format!("unknown cipher suite 0x{:04X}", raw))
            })?;
            cipher_suites.push(suite);
        }

        if data.is_empty() {
            return Err(Error::DecodeError("truncated compression list".into()));
        }
        let compression_len = data.get_u8() as usize;
        if data.len() < compression_len {
            return Err(Error::DecodeError("invalid compression list".into()));
        }
        let compression_methods = data[..compression_len].to_vec();

        Ok(Self {
            random,
            session_id,
            cipher_suites,
            compression_methods,
        })
    }
}
