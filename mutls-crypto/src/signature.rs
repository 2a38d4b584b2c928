//! Digital signature algorithms for TLS client authentication.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::Result;

/// Signature algorithms supported by mutls.
///
/// Only the RSA PKCS#1 v1.5 family is carried: it is what the
/// CertificateVerify message of an RSA-key-transport handshake uses, and
/// what a CertificateRequest's algorithm list is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-256
    RsaPkcs1Sha256,
    /// RSA PKCS#1 v1.5 with SHA-384
    RsaPkcs1Sha384,
    /// RSA PKCS#1 v1.5 with SHA-512
    RsaPkcs1Sha512,
}

impl SignatureAlgorithm {
    /// Get the IANA TLS SignatureScheme codepoint.
    pub const fn iana_codepoint(self) -> u16 {
        match self {
            SignatureAlgorithm::RsaPkcs1Sha256 => 0x0401,
            SignatureAlgorithm::RsaPkcs1Sha384 => 0x0501,
            SignatureAlgorithm::RsaPkcs1Sha512 => 0x0601,
        }
    }

    /// Get the algorithm name.
    pub const fn name(self) -> &'static str {
        match self {
            SignatureAlgorithm::RsaPkcs1Sha256 => "rsa_pkcs1_sha256",
            SignatureAlgorithm::RsaPkcs1Sha384 => "rsa_pkcs1_sha384",
            SignatureAlgorithm::RsaPkcs1Sha512 => "rsa_pkcs1_sha512",
        }
    }

    /// Create from IANA codepoint.
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0401 => Some(SignatureAlgorithm::RsaPkcs1Sha256),
            0x0501 => Some(SignatureAlgorithm::RsaPkcs1Sha384),
            0x0601 => Some(SignatureAlgorithm::RsaPkcs1Sha512),
            _ => None,
        }
    }
}

/// Signing key (private key).
///
/// This type wraps the DER-encoded private key and ensures it is zeroized
/// when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SigningKey {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("bytes", &"<redacted>")
            .finish()
    }
}

impl SigningKey {
    /// Create a new signing key from DER bytes (PKCS#8 or PKCS#1).
    pub fn from_der(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the signing key bytes.
    pub fn as_der(&self) -> &[u8] {
        &self.bytes
    }
}

/// Signature scheme trait.
pub trait Signature: Send {
    /// Sign `message` with the private key.
    ///
    /// The message is hashed with the scheme's digest before the PKCS#1
    /// v1.5 signature operation.
    fn sign(&self, key: &SigningKey, message: &[u8]) -> Result<Vec<u8>>;

    /// Verify `signature` over `message` against the RSA public key in
    /// `spki_der`.
    fn verify(&self, spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<()>;

    /// Get the algorithm this scheme implements.
    fn algorithm(&self) -> SignatureAlgorithm;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codepoint_conversion() {
        assert_eq!(
            SignatureAlgorithm::from_u16(0x0401),
            Some(SignatureAlgorithm::RsaPkcs1Sha256)
        );
        assert_eq!(SignatureAlgorithm::RsaPkcs1Sha256.iana_codepoint(), 0x0401);
        assert_eq!(SignatureAlgorithm::from_u16(0x0403), None);
    }

    #[test]
    fn test_signing_key_debug_is_redacted() {
        let key = SigningKey::from_der(vec![1, 2, 3]);
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains('1'));
    }
}
