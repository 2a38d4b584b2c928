//! Handshake transcript buffer.
//!
//! The transcript is the ordered concatenation of handshake messages sent
//! and received, header bytes included. It feeds three consumers: the
//! external signer (raw bytes), the client Finished verify_data (SHA-256
//! digest), and the server Finished verify_data (SHA-256 digest taken
//! later). HelloRequest and the inbound Finished are never appended; the
//! state machine owns those rules.
//!
//! Once the connection is established the transcript has no further use
//! and is discarded.

use mutls_crypto::{CryptoProvider, HashAlgorithm};

use crate::error::Result;

/// Append-only transcript of handshake message bytes.
#[derive(Debug, Default)]
pub struct Transcript {
    buf: Vec<u8>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one complete handshake message (4-byte header included).
    pub fn append(&mut self, message: &[u8]) {
        self.buf.extend_from_slice(message);
    }

    /// The raw transcript bytes, as handed to the external signer.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// SHA-256 digest of the transcript at this point.
    pub fn digest(&self, provider: &dyn CryptoProvider) -> Result<Vec<u8>> {
        let mut hash = provider.hash(HashAlgorithm::Sha256)?;
        hash.update(&self.buf);
        Ok(hash.finalize())
    }

    /// Total transcript size in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Discard the transcript contents.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.buf.shrink_to_fit();
    }
}
