//! The connection: transport bytes in, transport bytes out, events out.
//!
//! A [`Connection`] owns the receive buffer, the fragment staging buffer,
//! the handshake state machine, and the optional record ciphers. It is
//! sans-I/O: the embedder moves bytes between the transport and
//! [`read_transport`](Connection::read_transport) /
//! [`take_transport_output`](Connection::take_transport_output), drains
//! [`poll_event`](Connection::poll_event), and answers the two capability
//! events ([`Event::VerifyCertificates`], [`Event::SignHandshake`]) by
//! calling back in.
//!
//! While the state machine is suspended on a capability, transport bytes
//! keep accumulating but no record is decoded, so no handler can run out
//! of order. Any error from inside the machine is fatal: a matching alert
//! is emitted if possible and the connection refuses further traffic.

use std::collections::VecDeque;
use std::sync::Arc;

use mutls_crypto::{CryptoProvider, SignatureAlgorithm};

use crate::alert::Alert;
use crate::error::{Error, Result};
use crate::handshake::ClientHandshake;
use crate::protocol::ContentType;
use crate::record::{
    self, FragmentDispatcher, ProtocolMessage, RecordDeframer, MAX_FRAGMENT_SIZE,
};
use crate::record_protection::{RecordDecryptor, RecordEncryptor};

/// Events surfaced to the embedder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The handshake completed; application data may flow
    Connected,

    /// Decrypted application payload from the peer
    ApplicationData(Vec<u8>),

    /// Invoke the external verifier on this certificate chain, then call
    /// [`Connection::server_certificates_verified`] or
    /// [`Connection::server_certificates_rejected`]
    VerifyCertificates(Vec<Vec<u8>>),

    /// Invoke the external signer on these transcript bytes, then call
    /// [`Connection::handshake_messages_signed`] or
    /// [`Connection::handshake_signing_failed`]
    SignHandshake(Vec<u8>),

    /// The peer sent close_notify or the connection was closed locally
    Closed,
}

/// Mutable capabilities handed to the state machine: record emission,
/// cipher installation, event delivery.
pub(crate) struct Effects<'a> {
    pub(crate) provider: &'a dyn CryptoProvider,
    pub(crate) write_cipher: &'a mut Option<RecordEncryptor>,
    pub(crate) read_cipher: &'a mut Option<RecordDecryptor>,
    pub(crate) transport_out: &'a mut Vec<u8>,
    pub(crate) events: &'a mut VecDeque<Event>,
}

impl Effects<'_> {
    /// Protect (if a write cipher is installed) and frame one record.
    pub(crate) fn send_record(&mut self, content_type: ContentType, payload: &[u8]) -> Result<()> {
        let protected;
        let payload = match self.write_cipher.as_mut() {
            Some(cipher) => {
                protected = cipher.encrypt(self.provider, content_type, payload)?;
                &protected[..]
            },
            None => payload,
        };
        record::write_record(self.transport_out, content_type, payload)
    }
}

macro_rules! effects {
    ($conn:expr) => {
        Effects {
            provider: $conn.provider.as_ref(),
            write_cipher: &mut $conn.write_cipher,
            read_cipher: &mut $conn.read_cipher,
            transport_out: &mut $conn.transport_out,
            events: &mut $conn.events,
        }
    };
}

/// A mutually-authenticated TLS 1.2 client connection.
pub struct Connection {
    provider: Arc<dyn CryptoProvider>,
    records: RecordDeframer,
    fragments: FragmentDispatcher,
    handshake: ClientHandshake,
    read_cipher: Option<RecordDecryptor>,
    write_cipher: Option<RecordEncryptor>,
    transport_out: Vec<u8>,
    events: VecDeque<Event>,
    closed: bool,
    failed: Option<Error>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.handshake.state())
            .field("closed", &self.closed)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Create a connection and start the handshake.
    ///
    /// The ClientHello is queued immediately; flush it with
    /// [`take_transport_output`](Self::take_transport_output).
    ///
    /// `client_certificates` is the chain sent in response to the
    /// server's CertificateRequest; it may be empty.
    pub fn new(
        provider: Arc<dyn CryptoProvider>,
        client_certificates: Vec<Vec<u8>>,
    ) -> Result<Self> {
        let mut conn = Self {
            provider,
            records: RecordDeframer::new(),
            fragments: FragmentDispatcher::new(),
            handshake: ClientHandshake::new(client_certificates),
            read_cipher: None,
            write_cipher: None,
            transport_out: Vec::new(),
            events: VecDeque::new(),
            closed: false,
            failed: None,
        };
        let mut fx = effects!(conn);
        conn.handshake.start(&mut fx)?;
        Ok(conn)
    }

    /// Feed bytes received from the transport.
    ///
    /// Decodes and dispatches as many complete records as the current
    /// state allows. Any error is fatal to the connection.
    pub fn read_transport(&mut self, data: &[u8]) -> Result<()> {
        self.check_open()?;
        self.records.push(data);
        self.drive()
    }

    /// Write application data.
    ///
    /// Fails with [`Error::NotReady`] before the handshake completes;
    /// that error does not poison the connection. Writes larger than one
    /// record are split into maximal fragments.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.check_open()?;
        if !self.handshake.is_established() {
            return Err(Error::NotReady);
        }

        for chunk in data.chunks(MAX_FRAGMENT_SIZE) {
            let mut fx = effects!(self);
            if let Err(e) = fx.send_record(ContentType::ApplicationData, chunk) {
                return Err(self.fail(e));
            }
        }
        Ok(())
    }

    /// External verifier callback: the server chain verified.
    ///
    /// Resumes record processing. Late or duplicate callbacks are
    /// dropped.
    pub fn server_certificates_verified(&mut self) -> Result<()> {
        if self.closed || self.failed.is_some() {
            log::warn!("verifier callback after connection end ignored");
            return Ok(());
        }
        let mut fx = effects!(self);
        match self.handshake.certificates_verified(&mut fx) {
            Ok(()) => self.drive(),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// External verifier callback: the server chain was rejected.
    pub fn server_certificates_rejected(&mut self) -> Result<()> {
        if self.closed || self.failed.is_some() || !self.handshake.expects_verifier_result() {
            log::warn!("late verifier rejection ignored");
            return Ok(());
        }
        Err(self.fail(Error::BadCertificate(
            "external verifier rejected the server chain".into(),
        )))
    }

    /// External signer callback: the transcript signature is ready.
    ///
    /// Emits CertificateVerify, ChangeCipherSpec, and Finished, then
    /// resumes record processing. Late or duplicate callbacks are
    /// dropped.
    pub fn handshake_messages_signed(
        &mut self,
        algorithm: SignatureAlgorithm,
        signature: Vec<u8>,
    ) -> Result<()> {
        if self.closed || self.failed.is_some() {
            log::warn!("signer callback after connection end ignored");
            return Ok(());
        }
        let mut fx = effects!(self);
        match self
            .handshake
            .handshake_messages_signed(&mut fx, algorithm, signature)
        {
            Ok(()) => self.drive(),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// External signer callback: signing failed.
    pub fn handshake_signing_failed(&mut self) -> Result<()> {
        if self.closed || self.failed.is_some() || !self.handshake.expects_signer_result() {
            log::warn!("late signer failure ignored");
            return Ok(());
        }
        Err(self.fail(Error::DecryptError("handshake signer failed".into())))
    }

    /// Close the connection gracefully, sending close_notify.
    pub fn close(&mut self) {
        if self.closed || self.failed.is_some() {
            return;
        }
        let mut fx = effects!(self);
        let _ = fx.send_record(ContentType::Alert, &Alert::close_notify().encode());
        self.closed = true;
        self.events.push_back(Event::Closed);
    }

    /// Take the bytes queued for the transport.
    pub fn take_transport_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.transport_out)
    }

    /// Whether bytes are queued for the transport.
    pub fn has_transport_output(&self) -> bool {
        !self.transport_out.is_empty()
    }

    /// Pop the next pending event.
    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Whether the handshake has completed.
    pub fn is_established(&self) -> bool {
        self.handshake.is_established()
    }

    /// Whether the connection has been closed (gracefully or not).
    pub fn is_closed(&self) -> bool {
        self.closed || self.failed.is_some()
    }

    fn check_open(&self) -> Result<()> {
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(())
    }

    fn drive(&mut self) -> Result<()> {
        match self.process() {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Decode and dispatch until input runs dry, the state suspends, or
    /// the connection ends.
    fn process(&mut self) -> Result<()> {
        loop {
            if self.closed || self.handshake.is_suspended() {
                return Ok(());
            }

            // Drain staged messages before decoding further records
            if let Some(message) = self.fragments.next_message()? {
                self.dispatch(message)?;
                continue;
            }

            let Some((header, payload)) = self.records.next_record()? else {
                return Ok(());
            };
            log::trace!(
                "record {:?}, {} payload bytes",
                header.content_type,
                payload.len()
            );

            let fragment = match self.read_cipher.as_mut() {
                Some(cipher) => {
                    cipher.decrypt(self.provider.as_ref(), header.content_type, &payload)?
                },
                None => payload,
            };
            self.fragments.push(header.content_type, &fragment)?;
        }
    }

    fn dispatch(&mut self, message: ProtocolMessage) -> Result<()> {
        match message {
            ProtocolMessage::ChangeCipherSpec => {
                let mut fx = effects!(self);
                self.handshake.handle_change_cipher_spec(&mut fx)
            },
            ProtocolMessage::Handshake(raw) => {
                let mut fx = effects!(self);
                self.handshake.handle_handshake_message(&mut fx, &raw)
            },
            ProtocolMessage::ApplicationData(data) => {
                let mut fx = effects!(self);
                self.handshake.handle_application_data(&mut fx, data)
            },
            ProtocolMessage::Alert(alert) => self.handle_alert(alert),
        }
    }

    fn handle_alert(&mut self, alert: Alert) -> Result<()> {
        if alert.is_close_notify() {
            log::debug!("peer sent close_notify");
            let mut fx = effects!(self);
            let _ = fx.send_record(ContentType::Alert, &Alert::close_notify().encode());
            self.closed = true;
            self.events.push_back(Event::Closed);
            return Ok(());
        }

        if alert.is_fatal() {
            return Err(Error::AlertReceived(alert.description));
        }

        log::warn!("ignoring warning alert {:?}", alert.description);
        Ok(())
    }

    /// Record the fatal error, attempt a matching alert, and poison the
    /// connection. Returns the error for propagation.
    fn fail(&mut self, error: Error) -> Error {
        if self.failed.is_none() {
            log::warn!("connection failed: {}", error);
            match error {
                // The peer already ended the conversation
                Error::AlertReceived(_) | Error::Closed => {},
                _ => {
                    let alert = Alert::fatal(error.alert_description());
                    let mut fx = effects!(self);
                    let _ = fx.send_record(ContentType::Alert, &alert.encode());
                },
            }
            self.failed = Some(error.clone());
            self.events.push_back(Event::Closed);
        }
        error
    }
}
