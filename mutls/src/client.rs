//! Client configuration.

use std::fmt;
use std::sync::Arc;

use mutls_crypto::CryptoProvider;
use mutls_crypto_rustcrypto::RustCryptoProvider;

use crate::signer::{HandshakeSigner, RsaKeySigner};
use crate::verifier::CertificateVerifier;

/// Configuration errors reported by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No certificate verifier was configured
    MissingVerifier,

    /// Neither a private key nor a custom signer was configured
    MissingSigner,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVerifier => {
                write!(f, "a certificate verifier must be configured")
            },
            ConfigError::MissingSigner => {
                write!(f, "a client private key or handshake signer must be configured")
            },
        }
    }
}

impl std::error::Error for ConfigError {}

/// Per-connection client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Crypto provider shared by the connection and the default signer
    pub provider: Arc<dyn CryptoProvider>,

    /// PEM trust anchors, handed opaquely to the verifier
    pub ca_bundle: Vec<u8>,

    /// Client certificate chain (DER, leaf first; may be empty)
    pub client_certificates: Vec<Vec<u8>>,

    /// External chain verifier
    pub verifier: Arc<dyn CertificateVerifier>,

    /// External or in-process handshake signer
    pub signer: Arc<dyn HandshakeSigner>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("ca_bundle_len", &self.ca_bundle.len())
            .field("client_certificates", &self.client_certificates.len())
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for client configuration.
#[derive(Default)]
pub struct ClientConfigBuilder {
    provider: Option<Arc<dyn CryptoProvider>>,
    ca_bundle: Vec<u8>,
    client_certificates: Vec<Vec<u8>>,
    client_private_key: Option<Vec<u8>>,
    verifier: Option<Arc<dyn CertificateVerifier>>,
    signer: Option<Arc<dyn HandshakeSigner>>,
}

impl fmt::Debug for ClientConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfigBuilder").finish_non_exhaustive()
    }
}

impl ClientConfigBuilder {
    /// Use a specific crypto provider (default: the RustCrypto-backed
    /// one).
    pub fn with_provider(mut self, provider: Arc<dyn CryptoProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the PEM CA bundle handed to the verifier.
    pub fn with_ca_bundle(mut self, ca_bundle: Vec<u8>) -> Self {
        self.ca_bundle = ca_bundle;
        self
    }

    /// Set the client certificate chain (DER, leaf first).
    pub fn with_client_certificate_chain(mut self, chain: Vec<Vec<u8>>) -> Self {
        self.client_certificates = chain;
        self
    }

    /// Set the client's RSA private key (DER, PKCS#8 or PKCS#1); the
    /// default in-process signer will use it.
    pub fn with_client_private_key(mut self, key_der: Vec<u8>) -> Self {
        self.client_private_key = Some(key_der);
        self
    }

    /// Set the certificate verifier.
    pub fn with_verifier(mut self, verifier: Arc<dyn CertificateVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Use a custom handshake signer instead of the in-process default
    /// (e.g. an HSM-backed one).
    pub fn with_signer(mut self, signer: Arc<dyn HandshakeSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(RustCryptoProvider::default()));

        let verifier = self.verifier.ok_or(ConfigError::MissingVerifier)?;

        let signer = match (self.signer, self.client_private_key) {
            (Some(signer), _) => signer,
            (None, Some(key_der)) => Arc::new(RsaKeySigner::new(provider.clone(), key_der)),
            (None, None) => return Err(ConfigError::MissingSigner),
        };

        Ok(ClientConfig {
            provider,
            ca_bundle: self.ca_bundle,
            client_certificates: self.client_certificates,
            verifier,
            signer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::NoVerification;
    use mutls_crypto::SignatureAlgorithm;

    struct NullSigner;
    impl HandshakeSigner for NullSigner {
        fn sign(&self, _tbs: &[u8]) -> mutls_core::Result<(SignatureAlgorithm, Vec<u8>)> {
            Ok((SignatureAlgorithm::RsaPkcs1Sha256, Vec::new()))
        }
    }

    #[test]
    fn test_builder_requires_verifier() {
        let result = ClientConfig::builder()
            .with_client_private_key(vec![0x30])
            .build();
        assert_eq!(result.err(), Some(ConfigError::MissingVerifier));
    }

    #[test]
    fn test_builder_requires_signer_or_key() {
        let result = ClientConfig::builder()
            .with_verifier(Arc::new(NoVerification))
            .build();
        assert_eq!(result.err(), Some(ConfigError::MissingSigner));
    }

    #[test]
    fn test_private_key_yields_default_signer() {
        let config = ClientConfig::builder()
            .with_verifier(Arc::new(NoVerification))
            .with_client_private_key(vec![0x30])
            .with_ca_bundle(b"-----BEGIN CERTIFICATE-----".to_vec())
            .build()
            .unwrap();
        assert_eq!(config.ca_bundle, b"-----BEGIN CERTIFICATE-----");
        assert!(config.client_certificates.is_empty());
    }

    #[test]
    fn test_custom_signer_wins_over_key() {
        let config = ClientConfig::builder()
            .with_verifier(Arc::new(NoVerification))
            .with_signer(Arc::new(NullSigner))
            .build()
            .unwrap();
        let (algorithm, signature) = config.signer.sign(b"x").unwrap();
        assert_eq!(algorithm, SignatureAlgorithm::RsaPkcs1Sha256);
        assert!(signature.is_empty());
    }
}
