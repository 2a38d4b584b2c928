//! RSA key transport implementation using the `rsa` crate.

use mutls_crypto::{Error, KeyTransport, Result};
use rand::rngs::OsRng;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};

use crate::spki;

/// RSA PKCS#1 v1.5 key transport.
///
/// Locates the public key inside an opaque DER certificate and encrypts
/// the pre-master secret under it.
#[derive(Debug, Default)]
pub struct RsaKeyTransport;

impl KeyTransport for RsaKeyTransport {
    fn public_key_from_certificate(&self, cert_der: &[u8]) -> Result<Vec<u8>> {
        spki::subject_public_key_info(cert_der)
    }

    fn encrypt(&self, spki_der: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let public_key =
            RsaPublicKey::from_public_key_der(spki_der).map_err(|_| Error::InvalidPublicKey)?;
        public_key
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
            .map_err(|_| Error::EncryptionFailed)
    }
}
