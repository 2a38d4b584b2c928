//! CSPRNG implementation using OS entropy.

use mutls_crypto::{Error, Random, Result};
use rand::rngs::OsRng;
use rand::RngCore;

/// Random number generator backed by the operating system's entropy
/// source (`getrandom` and friends).
#[derive(Debug, Default)]
pub struct OsRandom;

impl Random for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|_| Error::RandomGenerationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_produces_different_outputs() {
        let rng = OsRandom;
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        rng.fill(&mut a).unwrap();
        rng.fill(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_length() {
        let rng = OsRandom;
        assert_eq!(rng.generate(48).unwrap().len(), 48);
        assert_eq!(rng.generate(0).unwrap().len(), 0);
    }
}
