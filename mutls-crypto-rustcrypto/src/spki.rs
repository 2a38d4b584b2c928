//! Minimal DER walk locating the SubjectPublicKeyInfo in an X.509
//! certificate.
//!
//! This is not an ASN.1 library. It understands exactly enough DER to step
//! over the leading fields of a TBSCertificate and return the complete
//! SubjectPublicKeyInfo TLV:
//!
//! ```text
//! Certificate ::= SEQUENCE {
//!     tbsCertificate       TBSCertificate,
//!     signatureAlgorithm   AlgorithmIdentifier,
//!     signatureValue       BIT STRING
//! }
//!
//! TBSCertificate ::= SEQUENCE {
//!     version         [0] EXPLICIT Version OPTIONAL,
//!     serialNumber         INTEGER,
//!     signature            AlgorithmIdentifier,
//!     issuer               Name,
//!     validity             Validity,
//!     subject              Name,
//!     subjectPublicKeyInfo SubjectPublicKeyInfo,
//!     ...
//! }
//! ```

use mutls_crypto::{Error, Result};

fn malformed(msg: &str) -> Error {
    Error::MalformedCertificate(msg.to_string())
}

/// One tag-length-value element.
struct Tlv<'a> {
    tag: u8,
    /// The complete element, header included
    raw: &'a [u8],
}

/// Sequential DER reader over a byte slice.
struct DerReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn read_tlv(&mut self) -> Result<Tlv<'a>> {
        let start = self.pos;
        let tag = *self
            .data
            .get(self.pos)
            .ok_or_else(|| malformed("truncated tag"))?;
        // High-tag-number forms never appear in certificates
        if tag & 0x1F == 0x1F {
            return Err(malformed("unsupported tag form"));
        }
        self.pos += 1;

        let first = *self
            .data
            .get(self.pos)
            .ok_or_else(|| malformed("truncated length"))?;
        self.pos += 1;
        let len = if first & 0x80 == 0 {
            first as usize
        } else {
            let n = (first & 0x7F) as usize;
            if n == 0 || n > 4 {
                return Err(malformed("unsupported length encoding"));
            }
            let mut len = 0usize;
            for _ in 0..n {
                let b = *self
                    .data
                    .get(self.pos)
                    .ok_or_else(|| malformed("truncated length"))?;
                self.pos += 1;
                len = (len << 8) | b as usize;
            }
            len
        };

        let end = self
            .pos
            .checked_add(len)
            .filter(|&e| e <= self.data.len())
            .ok_or_else(|| malformed("truncated contents"))?;
        self.pos = end;

        Ok(Tlv {
            tag,
            raw: &self.data[start..end],
        })
    }

    /// Read a TLV and return a reader over its contents.
    fn descend(&mut self, expected_tag: u8, what: &str) -> Result<DerReader<'a>> {
        let tlv = self.read_tlv()?;
        if tlv.tag != expected_tag {
            return Err(malformed(what));
        }
        // Skip the header to get at the contents
        let header_len = tlv.raw.len() - contents_len(tlv.raw)?;
        Ok(DerReader::new(&tlv.raw[header_len..]))
    }
}

fn contents_len(raw: &[u8]) -> Result<usize> {
    let first = *raw.get(1).ok_or_else(|| malformed("truncated length"))?;
    if first & 0x80 == 0 {
        Ok(first as usize)
    } else {
        let n = (first & 0x7F) as usize;
        let mut len = 0usize;
        for i in 0..n {
            len = (len << 8) | *raw.get(2 + i).ok_or_else(|| malformed("truncated length"))? as usize;
        }
        Ok(len)
    }
}

/// Extract the SubjectPublicKeyInfo TLV from a DER-encoded certificate.
pub(crate) fn subject_public_key_info(der: &[u8]) -> Result<Vec<u8>> {
    let mut outer = DerReader::new(der);
    let mut cert = outer.descend(0x30, "certificate is not a SEQUENCE")?;
    let mut tbs = cert.descend(0x30, "tbsCertificate is not a SEQUENCE")?;

    // [0] EXPLICIT version, present for v2/v3 certificates
    if tbs.peek_tag() == Some(0xA0) {
        tbs.read_tlv()?;
    }
    // serialNumber, signature, issuer, validity, subject
    for _ in 0..5 {
        tbs.read_tlv()?;
    }

    let spki = tbs.read_tlv()?;
    if spki.tag != 0x30 {
        return Err(malformed("subjectPublicKeyInfo is not a SEQUENCE"));
    }
    Ok(spki.raw.to_vec())
}

#[cfg(test)]
pub(crate) mod testutil {
    //! DER construction helpers shared by the provider's tests.

    /// Encode one tag-length-value element.
    pub(crate) fn tlv(tag: u8, contents: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        let len = contents.len();
        if len < 0x80 {
            out.push(len as u8);
        } else if len <= 0xFF {
            out.push(0x81);
            out.push(len as u8);
        } else {
            out.push(0x82);
            out.push((len >> 8) as u8);
            out.push(len as u8);
        }
        out.extend_from_slice(contents);
        out
    }

    /// Build a structurally valid certificate around the given SPKI TLV.
    ///
    /// Every field other than the SPKI is an empty placeholder; the result
    /// is good enough for the SPKI locator and for wire-format tests, not
    /// for any verifier.
    pub(crate) fn certificate_with_spki(spki: &[u8], with_version: bool) -> Vec<u8> {
        let mut tbs = Vec::new();
        if with_version {
            tbs.extend(tlv(0xA0, &tlv(0x02, &[2])));
        }
        tbs.extend(tlv(0x02, &[1])); // serialNumber
        tbs.extend(tlv(0x30, &[])); // signature
        tbs.extend(tlv(0x30, &[])); // issuer
        tbs.extend(tlv(0x30, &[])); // validity
        tbs.extend(tlv(0x30, &[])); // subject
        tbs.extend_from_slice(spki);

        let mut cert = tlv(0x30, &tbs);
        cert.extend(tlv(0x30, &[])); // signatureAlgorithm
        cert.extend(tlv(0x03, &[0x00, 0xAA])); // signatureValue
        tlv(0x30, &cert)
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::{certificate_with_spki, tlv};
    use super::*;

    fn sample_spki() -> Vec<u8> {
        // SEQUENCE { SEQUENCE { OID rsaEncryption, NULL }, BIT STRING ... }
        let alg = {
            let mut inner = tlv(
                0x06,
                &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01],
            );
            inner.extend(tlv(0x05, &[]));
            tlv(0x30, &inner)
        };
        let mut contents = alg;
        contents.extend(tlv(0x03, &[0x00, 0x01, 0x02, 0x03]));
        tlv(0x30, &contents)
    }

    #[test]
    fn test_extracts_spki_from_v3_certificate() {
        let spki = sample_spki();
        let cert = certificate_with_spki(&spki, true);
        assert_eq!(subject_public_key_info(&cert).unwrap(), spki);
    }

    #[test]
    fn test_extracts_spki_from_v1_certificate() {
        let spki = sample_spki();
        let cert = certificate_with_spki(&spki, false);
        assert_eq!(subject_public_key_info(&cert).unwrap(), spki);
    }

    #[test]
    fn test_rejects_truncated_certificate() {
        let spki = sample_spki();
        let cert = certificate_with_spki(&spki, true);
        assert!(subject_public_key_info(&cert[..cert.len() / 2]).is_err());
    }

    #[test]
    fn test_rejects_non_sequence() {
        assert!(subject_public_key_info(&[0x02, 0x01, 0x01]).is_err());
        assert!(subject_public_key_info(&[]).is_err());
    }

    #[test]
    fn test_long_form_lengths() {
        // A 300-byte issuer forces two-byte length encodings on the path
        // down to the SPKI
        let spki = sample_spki();
        let mut big_tbs = Vec::new();
        big_tbs.extend(tlv(0xA0, &tlv(0x02, &[2])));
        big_tbs.extend(tlv(0x02, &[1]));
        big_tbs.extend(tlv(0x30, &[]));
        big_tbs.extend(tlv(0x30, &vec![0x00u8; 300]));
        big_tbs.extend(tlv(0x30, &[]));
        big_tbs.extend(tlv(0x30, &[]));
        big_tbs.extend_from_slice(&spki);

        let mut cert = tlv(0x30, &big_tbs);
        cert.extend(tlv(0x30, &[]));
        cert.extend(tlv(0x03, &[0x00, 0xAA]));
        let cert = tlv(0x30, &cert);

        assert_eq!(subject_public_key_info(&cert).unwrap(), spki);
    }
}
