//! Handshake message codecs.
//!
//! One file per message, each a plain struct with `encode`/`decode` over
//! the wire format of RFC 5246 Section 7.4:
//!
//! ```text
//! struct {
//!     HandshakeType msg_type;    /* handshake type */
//!     uint24 length;             /* bytes in message */
//!     opaque body[Handshake.length];
//! } Handshake;
//! ```
//!
//! [`HandshakeMessage`] handles the outer header; the per-message types
//! handle their bodies.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::HandshakeType;

mod certificate;
mod certificate_request;
mod certificate_verify;
mod client_hello;
mod client_key_exchange;
mod finished;
mod server_hello;
mod server_hello_done;

pub use certificate::Certificate;
pub use certificate_request::CertificateRequest;
pub use certificate_verify::CertificateVerify;
pub use client_hello::ClientHello;
pub use client_key_exchange::ClientKeyExchange;
pub use finished::Finished;
pub use server_hello::ServerHello;
pub use server_hello_done::ServerHelloDone;

/// A handshake message: type octet, 24-bit length, body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    /// Handshake message type
    pub msg_type: HandshakeType,

    /// Message body (without the 4-byte header)
    pub body: Vec<u8>,
}

impl HandshakeMessage {
    /// Create a new handshake message.
    pub fn new(msg_type: HandshakeType, body: Vec<u8>) -> Self {
        Self { msg_type, body }
    }

    /// Encode the message, header included.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.body.len() > 0x00FF_FFFF {
            return Err(Error::DecodeError("handshake message too large".into()));
        }

        let mut buf = BytesMut::with_capacity(4 + self.body.len());
        buf.put_u8(self.msg_type.to_u8());
        buf.put_uint(self.body.len() as u64, 3);
        buf.put_slice(&self.body);
        Ok(buf.to_vec())
    }

    /// Decode a complete message, header included.
    ///
    /// Unknown type octets are an `unexpected_message` condition: no state
    /// has a handler for them.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::DecodeError("handshake message too short".into()));
        }

        let type_raw = data.get_u8();
        let msg_type = HandshakeType::from_u8(type_raw).ok_or_else(|| {
            Error::UnexpectedMessage(format!("unknown handshake type {}", type_raw))
        })?;

        let length = data.get_uint(3) as usize;
        if data.len() != length {
            return Err(Error::DecodeError(format!(
                "handshake length {} does not match body of {}",
                length,
                data.len()
            )));
        }

        Ok(Self {
            msg_type,
            body: data.to_vec(),
        })
    }
}

/// Read a `uint24` big-endian value.
pub(crate) fn get_u24(data: &mut &[u8]) -> Result<usize> {
    if data.len() < 3 {
        return Err(Error::DecodeError("truncated uint24".into()));
    }
    Ok(data.get_uint(3) as usize)
}

/// Append a `uint24` big-endian value.
pub(crate) fn put_u24(buf: &mut BytesMut, value: usize) -> Result<()> {
    if value > 0x00FF_FFFF {
        return Err(Error::DecodeError("value exceeds uint24".into()));
    }
    buf.put_uint(value as u64, 3);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_message_round_trip() {
        let msg = HandshakeMessage::new(HandshakeType::ServerHello, vec![1, 2, 3]);
        let encoded = msg.encode().unwrap();
        assert_eq!(encoded, vec![2, 0, 0, 3, 1, 2, 3]);
        assert_eq!(HandshakeMessage::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_zero_length_message() {
        let msg = HandshakeMessage::new(HandshakeType::ServerHelloDone, Vec::new());
        let encoded = msg.encode().unwrap();
        assert_eq!(encoded, vec![14, 0, 0, 0]);
        assert_eq!(HandshakeMessage::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_unknown_type_is_unexpected_message() {
        let result = HandshakeMessage::decode(&[99, 0, 0, 0]);
        assert!(matches!(result, Err(Error::UnexpectedMessage(_))));
    }

    #[test]
    fn test_length_mismatch_is_decode_error() {
        let result = HandshakeMessage::decode(&[2, 0, 0, 5, 1, 2]);
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }

    #[test]
    fn test_u24_round_trip() {
        for value in [0usize, 1, 255, 256, 0x00FF_FFFF] {
            let mut buf = BytesMut::new();
            put_u24(&mut buf, value).unwrap();
            let mut slice = &buf[..];
            assert_eq!(get_u24(&mut slice).unwrap(), value);
        }
        let mut buf = BytesMut::new();
        assert!(put_u24(&mut buf, 0x0100_0000).is_err());
    }
}
