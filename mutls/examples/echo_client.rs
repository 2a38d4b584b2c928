//! Mutually-authenticated TLS 1.2 echo client.
//!
//! Connects to a server that requires client certificates, sends one
//! line, and prints whatever comes back.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example echo_client -- <host> <port> <client-cert.der> <client-key.der>
//! ```
//!
//! The certificate and key are DER files. Chain verification uses the
//! accept-all verifier, so this example is for lab setups only.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::{env, fs, process};

use mutls::{ClientConfig, NoVerification, TlsStream};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        eprintln!(
            "usage: {} <host> <port> <client-cert.der> <client-key.der>",
            args[0]
        );
        process::exit(2);
    }

    let host = &args[1];
    let port: u16 = args[2].parse().expect("port must be a number");
    let certificate = fs::read(&args[3]).expect("cannot read client certificate");
    let private_key = fs::read(&args[4]).expect("cannot read client key");

    let config = ClientConfig::builder()
        .with_client_certificate_chain(vec![certificate])
        .with_client_private_key(private_key)
        .with_verifier(Arc::new(NoVerification))
        .build()
        .expect("invalid configuration");

    println!("Connecting to {}:{}...", host, port);
    let tcp = TcpStream::connect((host.as_str(), port)).expect("TCP connect failed");

    let mut tls = TlsStream::connect(config, tcp).expect("TLS handshake failed");
    println!("✓ Handshake complete");

    tls.write_all(b"hello over mutual TLS\n")
        .expect("write failed");

    let mut reply = [0u8; 4096];
    let n = tls.read(&mut reply).expect("read failed");
    println!("Received {} bytes: {:?}", n, String::from_utf8_lossy(&reply[..n]));

    tls.close().expect("close failed");
}
