//! # mutls Core
//!
//! Core protocol engine for mutls: a minimal TLS 1.2 client that performs
//! a mutually-authenticated handshake with RSA key transport and then
//! exchanges application data under `TLS_RSA_WITH_AES_128_CBC_SHA`.
//!
//! The engine is sans-I/O: it consumes transport bytes, produces transport
//! bytes, and surfaces everything else as events. The two external
//! collaborators (the X.509 chain verifier and the handshake signer) are
//! invoked through events as well; their results come back through
//! callbacks on the [`Connection`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          Public API (mutls)             │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │       mutls-core (this crate)           │
//! │  ┌──────────────────────────────────┐   │
//! │  │   Connection (event pump)        │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Handshake State Machine        │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Record Layer + Record Crypto   │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Key Schedule (TLS 1.2 PRF)     │   │
//! │  └──────────────────────────────────┘   │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │     mutls-crypto (trait interface)      │
//! └─────────────────────────────────────────┘
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]
#![forbid(unsafe_code)]

// Re-export crypto interface
pub use mutls_crypto;

// Core modules
pub mod alert;
pub mod connection;
pub mod error;
pub mod handshake;
pub mod messages;
pub mod prf;
pub mod protocol;
pub mod record;
pub mod record_protection;
pub mod transcript;

// Re-exports
pub use connection::{Connection, Event};
pub use error::{Error, Result};
pub use protocol::{CipherSuite, ContentType, HandshakeType, ProtocolVersion};
