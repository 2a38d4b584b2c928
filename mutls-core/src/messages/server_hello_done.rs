//! ServerHelloDone message (RFC 5246 Section 7.4.5).
//!
//! An empty message marking the end of the server's first flight:
//!
//! ```text
//! struct { } ServerHelloDone;
//! ```

use crate::error::{Error, Result};

/// ServerHelloDone message (empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerHelloDone;

impl ServerHelloDone {
    /// Create a new ServerHelloDone message.
    pub fn new() -> Self {
        ServerHelloDone
    }

    /// Encode the message body (empty).
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    /// Decode a message body; any payload is an error.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if !data.is_empty() {
            return Err(Error::DecodeError(format!(
                "ServerHelloDone must be empty, got {} bytes",
                data.len()
            )));
        }
        Ok(ServerHelloDone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_hello_done_is_empty() {
        let encoded = ServerHelloDone::new().encode().unwrap();
        assert!(encoded.is_empty());
        assert!(ServerHelloDone::decode(&encoded).is_ok());
    }

    #[test]
    fn test_decode_rejects_payload() {
        assert!(matches!(
            ServerHelloDone::decode(&[0x00]),
            Err(Error::DecodeError(_))
        ));
    }
}
