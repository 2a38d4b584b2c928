//! TLS 1.2 PRF (Pseudorandom Function) - RFC 5246 Section 5
//!
//! PRF(secret, label, seed) = P_SHA256(secret, label + seed)
//!
//! Where P_hash is defined as:
//! P_hash(secret, seed) = HMAC_hash(secret, A(1) + seed) +
//!                         HMAC_hash(secret, A(2) + seed) + ...
//!
//! A(0) = seed
//! A(i) = HMAC_hash(secret, A(i-1))
//!
//! The cipher suite's PRF hash is SHA-256; the output is truncated to the
//! requested length, which makes every shorter output a prefix of every
//! longer one.

use mutls_crypto::{CryptoProvider, HashAlgorithm};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Size of the master secret in bytes.
pub const MASTER_SECRET_SIZE: usize = 48;

/// Size of Finished verify_data in bytes.
pub const VERIFY_DATA_SIZE: usize = 12;

/// Compute the TLS 1.2 PRF.
///
/// # Arguments
/// * `provider` - Crypto provider for HMAC operations
/// * `secret` - The secret key material
/// * `label` - ASCII label (e.g. "master secret", "key expansion")
/// * `seed` - Seed data
/// * `output_len` - Desired output length in bytes
pub fn prf(
    provider: &dyn CryptoProvider,
    secret: &[u8],
    label: &[u8],
    seed: &[u8],
    output_len: usize,
) -> Result<Vec<u8>> {
    let mut label_seed = Vec::with_capacity(label.len() + seed.len());
    label_seed.extend_from_slice(label);
    label_seed.extend_from_slice(seed);

    let mut output = Vec::with_capacity(output_len);

    // A(0) = label + seed
    let mut a = label_seed.clone();

    while output.len() < output_len {
        // A(i) = HMAC_hash(secret, A(i-1))
        a = hmac(provider, secret, &[&a])?;

        // HMAC_hash(secret, A(i) + label_seed)
        let chunk = hmac(provider, secret, &[&a, &label_seed])?;

        let remaining = output_len - output.len();
        if remaining >= chunk.len() {
            output.extend_from_slice(&chunk);
        } else {
            output.extend_from_slice(&chunk[..remaining]);
        }
    }

    Ok(output)
}

fn hmac(provider: &dyn CryptoProvider, key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>> {
    let mut mac = provider.hmac(HashAlgorithm::Sha256, key)?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize())
}

/// Compute the master secret from the pre-master secret.
///
/// master_secret = PRF(pre_master_secret, "master secret",
///                     ClientHello.random + ServerHello.random)[0..48]
pub fn master_secret(
    provider: &dyn CryptoProvider,
    pre_master_secret: &[u8],
    client_random: &[u8; 32],
    server_random: &[u8; 32],
) -> Result<Zeroizing<Vec<u8>>> {
    if pre_master_secret.len() != MASTER_SECRET_SIZE {
        return Err(Error::Internal(format!(
            "pre-master secret must be 48 bytes, got {}",
            pre_master_secret.len()
        )));
    }

    let mut seed = Vec::with_capacity(64);
    seed.extend_from_slice(client_random);
    seed.extend_from_slice(server_random);

    prf(
        provider,
        pre_master_secret,
        b"master secret",
        &seed,
        MASTER_SECRET_SIZE,
    )
    .map(Zeroizing::new)
}

/// Expand the master secret into the key block.
///
/// key_block = PRF(master_secret, "key expansion",
///                 server_random + client_random)
///
/// Note the seed order is reversed relative to the master secret
/// derivation.
pub fn key_block(
    provider: &dyn CryptoProvider,
    master_secret: &[u8],
    server_random: &[u8; 32],
    client_random: &[u8; 32],
    key_block_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    if master_secret.len() != MASTER_SECRET_SIZE {
        return Err(Error::Internal(format!(
            "master secret must be 48 bytes, got {}",
            master_secret.len()
        )));
    }

    let mut seed = Vec::with_capacity(64);
    seed.extend_from_slice(server_random);
    seed.extend_from_slice(client_random);

    prf(
        provider,
        master_secret,
        b"key expansion",
        &seed,
        key_block_len,
    )
    .map(Zeroizing::new)
}

/// Compute Finished verify_data.
///
/// verify_data = PRF(master_secret, finished_label,
///                   Hash(handshake_messages))[0..12]
///
/// `finished_label` is "client finished" or "server finished";
/// `transcript_hash` is the SHA-256 digest of the transcript at the
/// appropriate point.
pub fn verify_data(
    provider: &dyn CryptoProvider,
    master_secret: &[u8],
    finished_label: &[u8],
    transcript_hash: &[u8],
) -> Result<Vec<u8>> {
    prf(
        provider,
        master_secret,
        finished_label,
        transcript_hash,
        VERIFY_DATA_SIZE,
    )
}
