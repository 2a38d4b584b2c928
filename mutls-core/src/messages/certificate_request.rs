//! CertificateRequest message (RFC 5246 Section 7.4.4).
//!
//! ```text
//! struct {
//!     ClientCertificateType certificate_types<1..2^8-1>;
//!     SignatureAndHashAlgorithm supported_signature_algorithms<2..2^16-2>;
//!     DistinguishedName certificate_authorities<0..2^16-1>;
//! } CertificateRequest;
//! ```
//!
//! The client answers every CertificateRequest with its configured chain,
//! so the parsed lists are only validated, not matched against the chain.
//! Distinguished names are skipped.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Error, Result};

/// CertificateRequest message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    /// Acceptable certificate types (1-byte IDs, e.g. 0x01 rsa_sign)
    pub certificate_types: Vec<u8>,

    /// Acceptable signature algorithms (IANA codepoints)
    pub supported_signature_algorithms: Vec<u16>,
}

impl CertificateRequest {
    /// Create a new CertificateRequest.
    pub fn new(certificate_types: Vec<u8>, supported_signature_algorithms: Vec<u16>) -> Self {
        Self {
            certificate_types,
            supported_signature_algorithms,
        }
    }

    /// Encode the message body (with an empty distinguished-name list).
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.certificate_types.len() > 255 {
            return Err(Error::DecodeError("too many certificate types".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_u8(self.certificate_types.len() as u8);
        buf.put_slice(&self.certificate_types);

        buf.put_u16((self.supported_signature_algorithms.len() * 2) as u16);
        for algorithm in &self.supported_signature_algorithms {
            buf.put_u16(*algorithm);
        }

        buf.put_u16(0); // certificate_authorities
        Ok(buf.to_vec())
    }

    /// Decode a message body.
    ///
    /// The signature algorithm list length must be even; distinguished
    /// names are ignored.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::DecodeError("CertificateRequest too short".into()));
        }

        let types_len = data.get_u8() as usize;
        if data.len() < types_len {
            return Err(Error::DecodeError("truncated certificate types".into()));
        }
        let certificate_types = data[..types_len].to_vec();
        data.advance(types_len);

        if data.len() < 2 {
            return Err(Error::DecodeError("truncated signature algorithms".into()));
        }
        let algorithms_len = data.get_u16() as usize;
        if algorithms_len % 2 != 0 {
            return Err(Error::DecodeError(
                "signature algorithm list length is odd".into(),
            ));
        }
        if data.len() < algorithms_len {
            return Err(Error::DecodeError("truncated signature algorithms".into()));
        }
        let mut supported_signature_algorithms = Vec::with_capacity(algorithms_len / 2);
        for _ in 0..algorithms_len / 2 {
            supported_signature_algorithms.push(data.get_u16());
        }

        // certificate_authorities: present on the wire, irrelevant here

        Ok(Self {
            certificate_types,
            supported_signature_algorithms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let msg = CertificateRequest::new(vec![0x01], vec![0x0401, 0x0501]);
        let decoded = CertificateRequest::decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_decode_ignores_distinguished_names() {
        let mut encoded = CertificateRequest::new(vec![0x01], vec![0x0401])
            .encode()
            .unwrap();
        // Replace the empty DN list with a non-empty one
        let len = encoded.len();
        encoded.truncate(len - 2);
        encoded.extend_from_slice(&[0x00, 0x04, 0x30, 0x02, 0x31, 0x00]);

        let decoded = CertificateRequest::decode(&encoded).unwrap();
        assert_eq!(decoded.certificate_types, vec![0x01]);
        assert_eq!(decoded.supported_signature_algorithms, vec![0x0401]);
    }

    #[test]
    fn test_decode_rejects_odd_algorithm_list() {
        // types [0x01], then a 3-byte algorithm list
        let data = [0x01, 0x01, 0x00, 0x03, 0x04, 0x01, 0x05];
        assert!(matches!(
            CertificateRequest::decode(&data),
            Err(Error::DecodeError(_))
        ));
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let encoded = CertificateRequest::new(vec![0x01], vec![0x0401])
            .encode()
            .unwrap();
        assert!(CertificateRequest::decode(&encoded[..2]).is_err());
        assert!(CertificateRequest::decode(&[]).is_err());
    }
}
