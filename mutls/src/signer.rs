//! The external handshake signing capability.

use std::sync::Arc;

use mutls_core::{Error, Result};
use mutls_crypto::signature::SigningKey;
use mutls_crypto::{CryptoProvider, SignatureAlgorithm};

/// Signs the handshake transcript for CertificateVerify.
///
/// The connection suspends while the signer runs, so implementations may
/// defer to an HSM, an agent process, or any other out-of-band holder of
/// the client key.
pub trait HandshakeSigner: Send + Sync {
    /// Sign the raw transcript bytes; returns the signature algorithm's
    /// codepoint pair and the signature itself.
    fn sign(&self, tbs: &[u8]) -> Result<(SignatureAlgorithm, Vec<u8>)>;
}

/// The default in-process signer: RSA PKCS#1 v1.5 over SHA-256
/// (codepoint 0x0401) with a locally held key.
pub struct RsaKeySigner {
    provider: Arc<dyn CryptoProvider>,
    key: SigningKey,
}

impl std::fmt::Debug for RsaKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeySigner").finish_non_exhaustive()
    }
}

impl RsaKeySigner {
    /// Create a signer from a DER-encoded RSA private key (PKCS#8 or
    /// PKCS#1).
    pub fn new(provider: Arc<dyn CryptoProvider>, key_der: Vec<u8>) -> Self {
        Self {
            provider,
            key: SigningKey::from_der(key_der),
        }
    }
}

impl HandshakeSigner for RsaKeySigner {
    fn sign(&self, tbs: &[u8]) -> Result<(SignatureAlgorithm, Vec<u8>)> {
        let signature = self
            .provider
            .signature(SignatureAlgorithm::RsaPkcs1Sha256)
            .map_err(Error::from)?
            .sign(&self.key, tbs)
            .map_err(|e| Error::DecryptError(format!("signing failed: {}", e)))?;
        Ok((SignatureAlgorithm::RsaPkcs1Sha256, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutls_crypto::CryptoProvider as _;
    use mutls_crypto_rustcrypto::RustCryptoProvider;
    use rand::rngs::OsRng;
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
    use rsa::RsaPrivateKey;

    #[test]
    fn test_rsa_key_signer_produces_verifiable_signatures() {
        let private_key = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        let key_der = private_key.to_pkcs8_der().unwrap().as_bytes().to_vec();
        let spki = private_key
            .to_public_key()
            .to_public_key_der()
            .unwrap()
            .as_bytes()
            .to_vec();

        let provider: Arc<dyn CryptoProvider> = Arc::new(RustCryptoProvider::new());
        let signer = RsaKeySigner::new(provider.clone(), key_der);

        let (algorithm, signature) = signer.sign(b"transcript bytes").unwrap();
        assert_eq!(algorithm, SignatureAlgorithm::RsaPkcs1Sha256);
        assert_eq!(algorithm.iana_codepoint(), 0x0401);

        provider
            .signature(SignatureAlgorithm::RsaPkcs1Sha256)
            .unwrap()
            .verify(&spki, b"transcript bytes", &signature)
            .unwrap();
    }

    #[test]
    fn test_signer_failure_maps_to_decrypt_error() {
        let provider: Arc<dyn CryptoProvider> = Arc::new(RustCryptoProvider::new());
        let signer = RsaKeySigner::new(provider, vec![0x30, 0x00]);
        assert!(matches!(
            signer.sign(b"tbs"),
            Err(Error::DecryptError(_))
        ));
    }
}
