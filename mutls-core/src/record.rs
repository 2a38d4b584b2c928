//! TLS record layer.
//!
//! The record layer turns the transport byte stream into typed protocol
//! messages and frames outbound payloads:
//!
//! ```text
//! struct {
//!     ContentType type;
//!     ProtocolVersion version = 0x0303;
//!     uint16 length;
//!     opaque fragment[TLSPlaintext.length];
//! } TLSPlaintext;
//! ```
//!
//! Inbound processing is two-staged. [`RecordDeframer`] buffers raw
//! transport chunks and detaches whole records; [`FragmentDispatcher`]
//! restages the (possibly decrypted) fragments per content type and
//! extracts one complete protocol message at a time. Messages of one type
//! may span records; one record must not mix types.

use bytes::{Buf, BytesMut};

use crate::alert::Alert;
use crate::error::{Error, Result};
use crate::protocol::{ContentType, ProtocolVersion};

/// Maximum plaintext fragment size (2^14).
pub const MAX_FRAGMENT_SIZE: usize = 16384;

/// Maximum record payload we accept from the wire. Encrypted fragments
/// carry IV, MAC, and padding on top of the plaintext limit.
pub const MAX_ENCRYPTED_SIZE: usize = MAX_FRAGMENT_SIZE + 256;

/// TLS record header size (5 bytes).
pub const RECORD_HEADER_SIZE: usize = 5;

/// A decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Content type of the record
    pub content_type: ContentType,

    /// Protocol version (always 0x0303 on both directions)
    pub version: ProtocolVersion,

    /// Payload length in bytes
    pub length: usize,
}

impl RecordHeader {
    /// Encode the header to bytes.
    pub fn encode(&self) -> [u8; RECORD_HEADER_SIZE] {
        let version = self.version.to_u16().to_be_bytes();
        let length = (self.length as u16).to_be_bytes();
        [
            self.content_type.to_u8(),
            version[0],
            version[1],
            length[0],
            length[1],
        ]
    }

    /// Decode a header from the first five bytes of `data`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < RECORD_HEADER_SIZE {
            return Err(Error::DecodeError("record header too short".into()));
        }

        let content_type = ContentType::from_u8(data[0]).ok_or_else(|| {
            Error::UnexpectedMessage(format!("unknown record content type {}", data[0]))
        })?;

        let version_raw = u16::from_be_bytes([data[1], data[2]]);
        if version_raw != ProtocolVersion::Tls12.to_u16() {
            return Err(Error::ProtocolVersion);
        }

        let length = u16::from_be_bytes([data[3], data[4]]) as usize;
        if length > MAX_ENCRYPTED_SIZE {
            return Err(Error::DecodeError(format!(
                "record length {} exceeds limit",
                length
            )));
        }

        Ok(Self {
            content_type,
            version: ProtocolVersion::Tls12,
            length,
        })
    }
}

/// Frame one outbound record into `out`.
///
/// The payload must already be protected if a write cipher is active;
/// framing is the last step before the transport.
pub fn write_record(out: &mut Vec<u8>, content_type: ContentType, payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_ENCRYPTED_SIZE {
        return Err(Error::Internal(format!(
            "outbound record payload of {} bytes",
            payload.len()
        )));
    }
    let header = RecordHeader {
        content_type,
        version: ProtocolVersion::Tls12,
        length: payload.len(),
    };
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(payload);
    Ok(())
}

/// Buffers raw transport bytes and detaches whole records.
#[derive(Debug, Default)]
pub struct RecordDeframer {
    buf: BytesMut,
}

impl RecordDeframer {
    /// Create an empty deframer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transport chunk of arbitrary size.
    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Detach the next complete record, if one is buffered.
    ///
    /// Header errors (unknown content type, wrong version, oversized
    /// length) surface as soon as five bytes are available, before the
    /// payload arrives.
    pub fn next_record(&mut self) -> Result<Option<(RecordHeader, Vec<u8>)>> {
        if self.buf.len() < RECORD_HEADER_SIZE {
            return Ok(None);
        }

        let header = RecordHeader::decode(&self.buf)?;
        if self.buf.len() < RECORD_HEADER_SIZE + header.length {
            return Ok(None);
        }

        self.buf.advance(RECORD_HEADER_SIZE);
        let payload = self.buf.split_to(header.length).to_vec();
        Ok(Some((header, payload)))
    }

    /// Number of buffered bytes not yet consumed.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

/// One complete protocol message extracted from staged fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolMessage {
    /// ChangeCipherSpec, already validated to be the single octet 0x01
    ChangeCipherSpec,

    /// A (level, description) alert
    Alert(Alert),

    /// A complete handshake message, header included
    Handshake(Vec<u8>),

    /// Application payload bytes
    ApplicationData(Vec<u8>),
}

/// Reassembles protocol messages from record fragments.
///
/// A handshake message may be split across several records of type 22; a
/// fragment of a different type while bytes are staged is a protocol
/// violation.
#[derive(Debug, Default)]
pub struct FragmentDispatcher {
    staged: BytesMut,
    staged_type: Option<ContentType>,
}

impl FragmentDispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one record fragment.
    pub fn push(&mut self, content_type: ContentType, fragment: &[u8]) -> Result<()> {
        match self.staged_type {
            Some(staged) if staged != content_type && !self.staged.is_empty() => {
                return Err(Error::DecodeError(format!(
                    "fragment type mismatch: {:?} while {:?} is staged",
                    content_type, staged
                )));
            },
            _ => {},
        }
        self.staged_type = Some(content_type);
        self.staged.extend_from_slice(fragment);
        Ok(())
    }

    /// Extract the next complete message of the staged type.
    ///
    /// Returns `Ok(None)` when the staged bytes cannot yet form a complete
    /// message; push more fragments and try again.
    pub fn next_message(&mut self) -> Result<Option<ProtocolMessage>> {
        let content_type = match self.staged_type {
            Some(t) if !self.staged.is_empty() => t,
            _ => return Ok(None),
        };

        match content_type {
            ContentType::ChangeCipherSpec => {
                if self.staged[0] != 0x01 {
                    return Err(Error::DecodeError("invalid ChangeCipherSpec".into()));
                }
                self.staged.advance(1);
                Ok(Some(ProtocolMessage::ChangeCipherSpec))
            },
            ContentType::Alert => {
                if self.staged.len() < 2 {
                    return Ok(None);
                }
                let alert = Alert::decode(&self.staged[..2])?;
                self.staged.advance(2);
                Ok(Some(ProtocolMessage::Alert(alert)))
            },
            ContentType::Handshake => {
                if self.staged.len() < 4 {
                    return Ok(None);
                }
                let length = ((self.staged[1] as usize) << 16)
                    | ((self.staged[2] as usize) << 8)
                    | (self.staged[3] as usize);
                if self.staged.len() < 4 + length {
                    return Ok(None);
                }
                let message = self.staged.split_to(4 + length).to_vec();
                Ok(Some(ProtocolMessage::Handshake(message)))
            },
            ContentType::ApplicationData => {
                let data = self.staged.split().to_vec();
                Ok(Some(ProtocolMessage::ApplicationData(data)))
            },
        }
    }

    /// Number of staged bytes not yet formed into a message.
    pub fn staged(&self) -> usize {
        self.staged.len()
    }
}
