//! The external certificate verification capability.

use mutls_core::Result;

/// Verifies the server's certificate chain.
///
/// The connection suspends while the verifier runs; implementations may
/// take as long as they need (the blocking stream adapter calls them
/// inline, embedders driving [`mutls_core::Connection`] directly may
/// complete them asynchronously).
pub trait CertificateVerifier: Send + Sync {
    /// Verify `chain` (leaf first, opaque DER) against `ca_bundle`, the
    /// caller-supplied PEM trust anchors.
    ///
    /// Returning any error rejects the handshake with `bad_certificate`.
    fn verify_chain(&self, ca_bundle: &[u8], chain: &[Vec<u8>]) -> Result<()>;
}

/// A verifier that accepts every chain.
///
/// For tests and closed environments only: the connection is encrypted
/// but the peer is NOT authenticated. Production deployments must supply
/// a real X.509 verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVerification;

impl CertificateVerifier for NoVerification {
    fn verify_chain(&self, _ca_bundle: &[u8], chain: &[Vec<u8>]) -> Result<()> {
        log::warn!(
            "accepting {}-certificate chain without verification",
            chain.len()
        );
        Ok(())
    }
}
