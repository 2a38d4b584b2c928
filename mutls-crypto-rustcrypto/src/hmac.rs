//! HMAC implementations using the `hmac` crate.

use hmac::{Hmac as HmacImpl, Mac};
use mutls_crypto::{Error, HashAlgorithm, Hmac, Result};
use sha1::Sha1;
use sha2::Sha256;

/// Create an HMAC instance keyed with `key`.
pub fn create_hmac(algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
    match algorithm {
        HashAlgorithm::Sha1 => {
            let mac =
                HmacImpl::<Sha1>::new_from_slice(key).map_err(|_| Error::InvalidKeyLength)?;
            Ok(Box::new(Sha1Hmac { mac }))
        },
        HashAlgorithm::Sha256 => {
            let mac =
                HmacImpl::<Sha256>::new_from_slice(key).map_err(|_| Error::InvalidKeyLength)?;
            Ok(Box::new(Sha256Hmac { mac }))
        },
    }
}

/// HMAC-SHA1 (RFC 2104), the record MAC of the CBC/SHA cipher suites.
struct Sha1Hmac {
    mac: HmacImpl<Sha1>,
}

impl Hmac for Sha1Hmac {
    fn update(&mut self, data: &[u8]) {
        self.mac.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.mac.finalize().into_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        20
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha1
    }
}

/// HMAC-SHA256 (RFC 2104), the PRF building block.
struct Sha256Hmac {
    mac: HmacImpl<Sha256>,
}

impl Hmac for Sha256Hmac {
    fn update(&mut self, data: &[u8]) {
        self.mac.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.mac.finalize().into_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }
}
