//! RSA PKCS#1 v1.5 signature implementation using the `rsa` crate.

use mutls_crypto::signature::SigningKey;
use mutls_crypto::{Error, Result, Signature, SignatureAlgorithm};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Create a signature scheme instance for the specified algorithm.
pub fn create_signature(algorithm: SignatureAlgorithm) -> Result<Box<dyn Signature>> {
    Ok(Box::new(RsaPkcs1Signature { algorithm }))
}

/// RSA PKCS#1 v1.5 signatures over SHA-2 digests.
struct RsaPkcs1Signature {
    algorithm: SignatureAlgorithm,
}

impl RsaPkcs1Signature {
    fn padding_and_digest(&self, message: &[u8]) -> (Pkcs1v15Sign, Vec<u8>) {
        match self.algorithm {
            SignatureAlgorithm::RsaPkcs1Sha256 => (
                Pkcs1v15Sign::new::<Sha256>(),
                Sha256::digest(message).to_vec(),
            ),
            SignatureAlgorithm::RsaPkcs1Sha384 => (
                Pkcs1v15Sign::new::<Sha384>(),
                Sha384::digest(message).to_vec(),
            ),
            SignatureAlgorithm::RsaPkcs1Sha512 => (
                Pkcs1v15Sign::new::<Sha512>(),
                Sha512::digest(message).to_vec(),
            ),
        }
    }
}

fn load_private_key(der: &[u8]) -> Result<RsaPrivateKey> {
    // Accept both PKCS#8 and bare PKCS#1 encodings
    RsaPrivateKey::from_pkcs8_der(der)
        .or_else(|_| RsaPrivateKey::from_pkcs1_der(der))
        .map_err(|_| Error::InvalidPrivateKey)
}

impl Signature for RsaPkcs1Signature {
    fn sign(&self, key: &SigningKey, message: &[u8]) -> Result<Vec<u8>> {
        let private_key = load_private_key(key.as_der())?;
        let (padding, digest) = self.padding_and_digest(message);
        private_key
            .sign(padding, &digest)
            .map_err(|_| Error::SigningFailed)
    }

    fn verify(&self, spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
        let public_key =
            RsaPublicKey::from_public_key_der(spki_der).map_err(|_| Error::InvalidPublicKey)?;
        let (padding, digest) = self.padding_and_digest(message);
        public_key
            .verify(padding, &digest, signature)
            .map_err(|_| Error::SignatureVerificationFailed)
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }
}
