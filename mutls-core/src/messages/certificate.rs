//! Certificate message (RFC 5246 Section 7.4.2).
//!
//! ```text
//! opaque ASN.1Cert<1..2^24-1>;
//!
//! struct {
//!     ASN.1Cert certificate_list<0..2^24-1>;
//! } Certificate;
//! ```
//!
//! Used in both directions: the server's chain on receive, the client's
//! chain (possibly empty) on send. Certificates are opaque DER blobs
//! throughout the core.

use bytes::{Buf, BytesMut};

use crate::error::{Error, Result};
use crate::messages::{get_u24, put_u24};

/// Certificate message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// Certificate chain, leaf first, as opaque DER blobs
    pub certificate_list: Vec<Vec<u8>>,
}

impl Certificate {
    /// Create a new Certificate message.
    pub fn new(certificate_list: Vec<Vec<u8>>) -> Self {
        Self { certificate_list }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut list = BytesMut::new();
        for cert in &self.certificate_list {
            put_u24(&mut list, cert.len())
                .map_err(|_| Error::DecodeError("certificate too large".into()))?;
            list.extend_from_slice(cert);
        }

        let mut buf = BytesMut::new();
        put_u24(&mut buf, list.len())
            .map_err(|_| Error::DecodeError("certificate list too large".into()))?;
        buf.extend_from_slice(&list);
        Ok(buf.to_vec())
    }

    /// Decode a message body.
    ///
    /// The outer 24-bit length must account for every remaining byte.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        let list_len = get_u24(&mut data)?;
        if data.len() != list_len {
            return Err(Error::DecodeError(format!(
                "certificate list length {} does not match body of {}",
                list_len,
                data.len()
            )));
        }

        let mut certificate_list = Vec::new();
        while !data.is_empty() {
            let cert_len = get_u24(&mut data)?;
            if data.len() < cert_len {
                return Err(Error::DecodeError("truncated certificate".into()));
            }
            certificate_list.push(data[..cert_len].to_vec());
            data.advance(cert_len);
        }

        Ok(Self { certificate_list })
    }

    /// The leaf certificate (first in the chain).
    pub fn leaf(&self) -> Option<&[u8]> {
        self.certificate_list.first().map(|c| c.as_slice())
    }
}
