//! # mutls - Minimal Mutually-Authenticated TLS 1.2 Client
//!
//! A small TLS 1.2 client that performs a mutually-authenticated
//! handshake with RSA key transport and speaks exactly one cipher suite,
//! `TLS_RSA_WITH_AES_128_CBC_SHA`. X.509 chain verification and handshake
//! signing are pluggable capabilities supplied by the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::io::{Read, Write};
//! use std::net::TcpStream;
//! use std::sync::Arc;
//!
//! use mutls::{ClientConfig, NoVerification, TlsStream};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::builder()
//!     .with_client_certificate_chain(vec![/* DER certificates */])
//!     .with_client_private_key(vec![/* DER key */])
//!     // Production deployments plug in a real chain verifier here
//!     .with_verifier(Arc::new(NoVerification))
//!     .build()?;
//!
//! let tcp = TcpStream::connect("example.com:443")?;
//! let mut tls = TlsStream::connect(config, tcp)?;
//!
//! tls.write_all(b"GET / HTTP/1.0\r\n\r\n")?;
//! let mut response = Vec::new();
//! tls.read_to_end(&mut response)?;
//! # Ok(())
//! # }
//! ```
//!
//! The protocol engine itself lives in [`mutls_core`] and is sans-I/O;
//! this crate supplies the blocking stream adapter and the default
//! in-process RSA signer.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unused_qualifications
)]
#![forbid(unsafe_code)]

pub mod client;
pub mod signer;
pub mod stream;
pub mod verifier;

pub use client::{ClientConfig, ClientConfigBuilder, ConfigError};
pub use mutls_core::{Error, Result};
pub use signer::{HandshakeSigner, RsaKeySigner};
pub use stream::TlsStream;
pub use verifier::{CertificateVerifier, NoVerification};

// Re-export the layers underneath for embedders that drive the
// connection themselves
pub use mutls_core as core;
pub use mutls_crypto as crypto;
