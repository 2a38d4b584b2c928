//! Blocking TLS stream over any `Read + Write` transport.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use mutls_core::connection::{Connection, Event};
use mutls_core::Error;

use crate::client::ClientConfig;

/// How much transport data to ask for per read.
const READ_CHUNK: usize = 16 * 1024;

/// A blocking TLS 1.2 client stream.
///
/// [`connect`](Self::connect) drives the handshake to completion,
/// servicing the verifier and signer inline; afterwards the stream
/// behaves like any `Read + Write` byte stream. Dropping the stream
/// without [`close`](Self::close) skips the close_notify exchange.
pub struct TlsStream<S> {
    transport: S,
    conn: Connection,
    config: ClientConfig,
    /// Decrypted application bytes not yet handed to the caller
    incoming: VecDeque<u8>,
    peer_closed: bool,
}

impl<S> std::fmt::Debug for TlsStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsStream")
            .field("established", &self.conn.is_established())
            .field("peer_closed", &self.peer_closed)
            .finish_non_exhaustive()
    }
}

fn to_io(error: Error) -> io::Error {
    let kind = match error {
        Error::Closed => io::ErrorKind::UnexpectedEof,
        Error::NotReady => io::ErrorKind::WouldBlock,
        _ => io::ErrorKind::InvalidData,
    };
    io::Error::new(kind, error)
}

impl<S: Read + Write> TlsStream<S> {
    /// Connect: run the handshake over `transport` and return the
    /// established stream.
    ///
    /// Fails with the underlying protocol error if the handshake is
    /// rejected by either side.
    pub fn connect(config: ClientConfig, transport: S) -> io::Result<Self> {
        let conn = Connection::new(
            config.provider.clone(),
            config.client_certificates.clone(),
        )
        .map_err(to_io)?;

        let mut stream = Self {
            transport,
            conn,
            config,
            incoming: VecDeque::new(),
            peer_closed: false,
        };

        while !stream.conn.is_established() {
            stream.service_events().map_err(to_io)?;
            stream.flush_transport()?;
            if stream.conn.is_established() {
                break;
            }
            if stream.peer_closed || stream.conn.is_closed() {
                return Err(to_io(Error::Closed));
            }
            if !stream.pump_transport()? {
                return Err(to_io(Error::Closed));
            }
        }
        stream.service_events().map_err(to_io)?;
        stream.flush_transport()?;

        log::debug!("TLS connection established");
        Ok(stream)
    }

    /// Close the stream gracefully, sending close_notify.
    pub fn close(&mut self) -> io::Result<()> {
        self.conn.close();
        self.flush_transport()
    }

    /// Access the transport underneath.
    pub fn get_ref(&self) -> &S {
        &self.transport
    }

    /// Service pending connection events, answering capability requests
    /// with the configured verifier and signer.
    fn service_events(&mut self) -> mutls_core::Result<()> {
        while let Some(event) = self.conn.poll_event() {
            match event {
                Event::Connected => {},
                Event::ApplicationData(data) => self.incoming.extend(data),
                Event::Closed => self.peer_closed = true,
                Event::VerifyCertificates(chain) => {
                    match self
                        .config
                        .verifier
                        .verify_chain(&self.config.ca_bundle, &chain)
                    {
                        Ok(()) => self.conn.server_certificates_verified()?,
                        Err(e) => {
                            log::warn!("certificate verifier rejected the chain: {}", e);
                            self.conn.server_certificates_rejected()?;
                        },
                    }
                },
                Event::SignHandshake(tbs) => match self.config.signer.sign(&tbs) {
                    Ok((algorithm, signature)) => {
                        self.conn.handshake_messages_signed(algorithm, signature)?
                    },
                    Err(e) => {
                        log::warn!("handshake signer failed: {}", e);
                        self.conn.handshake_signing_failed()?;
                    },
                },
            }
        }
        Ok(())
    }

    /// Write everything the connection has queued to the transport.
    fn flush_transport(&mut self) -> io::Result<()> {
        if self.conn.has_transport_output() {
            let out = self.conn.take_transport_output();
            self.transport.write_all(&out)?;
            self.transport.flush()?;
        }
        Ok(())
    }

    /// Read one transport chunk into the connection. Returns false on
    /// transport EOF.
    fn pump_transport(&mut self) -> io::Result<bool> {
        let mut buf = [0u8; READ_CHUNK];
        let n = self.transport.read(&mut buf)?;
        if n == 0 {
            return Ok(false);
        }

        // Flush before propagating: a failure queues its fatal alert,
        // which must still reach the peer
        let result = self.conn.read_transport(&buf[..n]);
        self.service_events().map_err(to_io)?;
        self.flush_transport()?;
        result.map_err(to_io)?;
        Ok(true)
    }
}

impl<S: Read + Write> Read for TlsStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.incoming.is_empty() {
            if self.peer_closed || self.conn.is_closed() {
                return Ok(0); // clean EOF
            }
            if !self.pump_transport()? {
                return Ok(0);
            }
        }

        let n = buf.len().min(self.incoming.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.incoming.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}

impl<S: Read + Write> Write for TlsStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.conn.write(buf).map_err(to_io)?;
        self.flush_transport()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_transport()?;
        self.transport.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::NoVerification;
    use std::sync::Arc;

    use std::sync::Mutex;

    /// A transport that replays a script and records what was written.
    struct ScriptedTransport {
        incoming: io::Cursor<Vec<u8>>,
        written: Arc<Mutex<Vec<u8>>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<u8>) -> (Self, Arc<Mutex<Vec<u8>>>) {
            let written = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    incoming: io::Cursor::new(script),
                    written: written.clone(),
                },
                written,
            )
        }
    }

    impl Read for ScriptedTransport {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.incoming.read(buf)
        }
    }

    impl Write for ScriptedTransport {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn test_config() -> ClientConfig {
        ClientConfig::builder()
            .with_verifier(Arc::new(NoVerification))
            .with_client_private_key(vec![0x30, 0x00])
            .build()
            .unwrap()
    }

    #[test]
    fn test_connect_fails_cleanly_on_transport_eof() {
        let (transport, _) = ScriptedTransport::new(Vec::new());

        let result = TlsStream::connect(test_config(), transport);
        let err = result.err().expect("EOF during handshake must fail");
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_client_hello_is_flushed_before_first_read() {
        let (transport, written) = ScriptedTransport::new(Vec::new());

        // The handshake cannot complete, but the ClientHello record must
        // have reached the transport first
        let _ = TlsStream::connect(test_config(), transport);

        let written = written.lock().unwrap();
        assert!(written.len() > 5);
        assert_eq!(written[0], 22); // handshake record
        assert_eq!(&written[1..3], &[0x03, 0x03]);
        assert_eq!(written[5], 1); // ClientHello
    }

    #[test]
    fn test_protocol_error_is_surfaced() {
        // A record with version 0x0301 kills the handshake immediately
        let (transport, written) = ScriptedTransport::new(vec![22, 0x03, 0x01, 0x00, 0x02, 0, 0]);

        let err = TlsStream::connect(test_config(), transport)
            .err()
            .expect("bad version must fail");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        // A fatal protocol_version alert went out
        let written = written.lock().unwrap();
        let alert = &written[written.len() - 7..];
        assert_eq!(&alert[..2], &[21, 0x03]);
        assert_eq!(&alert[5..], &[2, 70]);
    }
}
