//! RSA key transport interface.
//!
//! RSA key transport cipher suites encrypt the pre-master secret directly
//! under the public key of the server's leaf certificate (RFC 5246
//! Section 7.4.7.1). The protocol core treats certificates as opaque DER
//! blobs; locating the key inside the certificate is the provider's job.

use crate::Result;

/// RSA key transport trait.
pub trait KeyTransport: Send + Sync {
    /// Extract the SubjectPublicKeyInfo from a DER-encoded X.509
    /// certificate.
    ///
    /// Returns the complete SPKI structure (algorithm identifier plus key
    /// bits) as an opaque byte string usable with [`encrypt`] and with
    /// [`crate::Signature::verify`].
    ///
    /// [`encrypt`]: KeyTransport::encrypt
    fn public_key_from_certificate(&self, cert_der: &[u8]) -> Result<Vec<u8>>;

    /// RSA PKCS#1 v1.5 encryption of `plaintext` under the RSA public key
    /// in `spki_der`.
    ///
    /// # Errors
    ///
    /// Fails if the SPKI does not contain an RSA key or if `plaintext`
    /// is too large for the modulus.
    fn encrypt(&self, spki_der: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;
}
