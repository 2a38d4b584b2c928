//! ServerHello message (RFC 5246 Section 7.4.1.3).
//!
//! ```text
//! struct {
//!     ProtocolVersion server_version;
//!     Random random;
//!     SessionID session_id;
//!     CipherSuite cipher_suite;
//!     CompressionMethod compression_method;
//!     select (extensions_present) { ... };
//! } ServerHello;
//! ```
//!
//! The decoder validates structure and version; the cipher suite and
//! compression octets stay raw so the state machine can decide the policy
//! (and the matching error kind). Trailing extension bytes are skipped.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::ProtocolVersion;

/// ServerHello message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// Server random (32 bytes)
    pub random: [u8; 32],

    /// Echoed session ID (parsed, otherwise unused)
    pub session_id: Vec<u8>,

    /// Selected cipher suite, raw wire value
    pub cipher_suite: u16,

    /// Selected compression method, raw wire value
    pub compression_method: u8,
}

impl ServerHello {
    /// Create a new ServerHello.
    pub fn new(random: [u8; 32], cipher_suite: u16) -> Self {
        Self {
            random,
            session_id: Vec::new(),
            cipher_suite,
            compression_method: 0,
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
        buf.put_u16(self.cipher_suite);
        buf.put_u8(self.compression_method);
        Ok(buf.to_vec())
    }

    /// Decode a message body.
    ///
    /// A version other than 0x0303 is a `protocol_version` error; trailing
    /// extension bytes are ignored.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 2 + 32 + 1 {
            return Err(Error::DecodeError("ServerHello too short".into()));
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

        if data.len() < 3 {
            return Err(Error::DecodeError("ServerHello truncated".into()));
        }
        let cipher_suite = data.get_u16();
        let compression_method = data.get_u8();

        // Anything left is extension data this profile does not interpret

        Ok(Self {
            random,
            session_id,
            cipher_suite,
            compression_method,
        })
    }
}
