//! Client handshake state machine.
//!
//! The machine is hierarchical: a `Handshake` node owns the per-connection
//! handshake context and has one leaf per protocol step; `Established` is
//! a terminal leaf outside the handshake subtree.
//!
//! ```text
//! (root)
//! ├── Handshake                        owns HandshakeContext
//! │   ├── ServerHello                  enter: send ClientHello
//! │   ├── ServerCertificate
//! │   ├── CertificateRequest
//! │   ├── ServerHelloDone              sends Certificate + ClientKeyExchange
//! │   ├── VerifyServerCertificate      suspended: waits for the verifier
//! │   ├── CertificateVerify            suspended: waits for the signer
//! │   ├── ChangeCipherSpec             waits for the server's CCS
//! │   └── ServerFinished               verifies server verify_data
//! └── Established                      application data flows
//! ```
//!
//! `transition(next)` computes the lowest common ancestor of the current
//! and target states, runs `exit` hooks from the current state up to (but
//! not including) the LCA, then `enter` hooks down to the target. The two
//! suspension states have no message handlers; the connection stops
//! feeding records while one of them is current.
//!
//! Transcript rule: every handshake message sent or received is appended
//! before its handler runs, except HelloRequest (never appended) and the
//! inbound Finished (already consumed for verify_data computation).

use mutls_crypto::SignatureAlgorithm;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::connection::{Effects, Event};
use crate::error::{Error, Result};
use crate::messages::{
    Certificate, CertificateRequest, CertificateVerify, ClientHello, ClientKeyExchange, Finished,
    HandshakeMessage, ServerHello, ServerHelloDone,
};
use crate::prf;
use crate::protocol::{CipherSuite, ContentType, HandshakeType, COMPRESSION_NULL};
use crate::record_protection::{KeyBlock, RecordDecryptor, RecordEncryptor};
use crate::transcript::Transcript;

/// Pre-master secret size: two version octets plus 46 random octets.
const PRE_MASTER_SECRET_SIZE: usize = 48;

/// States of the connection, as nodes of the state tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateId {
    /// Interior node owning the handshake context
    Handshake,

    /// Waiting for ServerHello (the initial state)
    ServerHello,

    /// Waiting for the server Certificate
    ServerCertificate,

    /// Waiting for CertificateRequest
    CertificateRequest,

    /// Waiting for ServerHelloDone
    ServerHelloDone,

    /// Suspended on the external certificate verifier
    VerifyServerCertificate,

    /// Suspended on the external handshake signer
    CertificateVerify,

    /// Waiting for the server's ChangeCipherSpec
    ChangeCipherSpec,

    /// Waiting for the server Finished
    ServerFinished,

    /// Handshake complete, application data flows
    Established,
}

impl StateId {
    /// Parent node in the state tree; `None` for children of the root.
    pub const fn parent(self) -> Option<StateId> {
        match self {
            StateId::Handshake | StateId::Established => None,
            _ => Some(StateId::Handshake),
        }
    }
}

/// Lowest common ancestor of two states, considering proper ancestors
/// only. `None` means the virtual root.
fn lowest_common_ancestor(a: StateId, b: StateId) -> Option<StateId> {
    let mut ancestors_of_a = Vec::new();
    let mut cursor = a.parent();
    while let Some(id) = cursor {
        ancestors_of_a.push(id);
        cursor = id.parent();
    }

    let mut cursor = b.parent();
    while let Some(id) = cursor {
        if ancestors_of_a.contains(&id) {
            return Some(id);
        }
        cursor = id.parent();
    }
    None
}

/// Per-connection handshake state, owned by the `Handshake` node.
#[derive(Default)]
struct HandshakeContext {
    transcript: Transcript,
    client_random: [u8; 32],
    server_random: Option<[u8; 32]>,
    session_id: Vec<u8>,
    pre_master_secret: Zeroizing<Vec<u8>>,
    server_public_key: Option<Vec<u8>>,
    server_certificates: Vec<Vec<u8>>,
    master_secret: Option<Zeroizing<Vec<u8>>>,
    /// Server-write keys parked between key derivation and the server CCS
    pending_read_keys: Option<(Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>)>,
}

/// The client handshake state machine.
pub struct ClientHandshake {
    state: StateId,
    ctx: HandshakeContext,
    client_certificates: Vec<Vec<u8>>,
    #[cfg(test)]
    hook_trace: Vec<(&'static str, StateId)>,
}

impl std::fmt::Debug for ClientHandshake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandshake")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ClientHandshake {
    /// Create the machine in its initial state. No hooks run until
    /// [`start`](Self::start).
    pub(crate) fn new(client_certificates: Vec<Vec<u8>>) -> Self {
        Self {
            state: StateId::ServerHello,
            ctx: HandshakeContext::default(),
            client_certificates,
            #[cfg(test)]
            hook_trace: Vec::new(),
        }
    }

    /// The current state.
    pub fn state(&self) -> StateId {
        self.state
    }

    /// Whether the connection is established.
    pub fn is_established(&self) -> bool {
        self.state == StateId::Established
    }

    /// Whether the machine is suspended on an external capability. While
    /// suspended, no records may be delivered.
    pub fn is_suspended(&self) -> bool {
        matches!(
            self.state,
            StateId::VerifyServerCertificate | StateId::CertificateVerify
        )
    }

    /// Enter the initial state: fires the `Handshake` and `ServerHello`
    /// enter hooks, which generate the secrets and send ClientHello.
    pub(crate) fn start(&mut self, fx: &mut Effects<'_>) -> Result<()> {
        self.on_enter(fx, StateId::Handshake)?;
        self.on_enter(fx, StateId::ServerHello)
    }

    /// Deliver one complete handshake message (header included).
    pub(crate) fn handle_handshake_message(
        &mut self,
        fx: &mut Effects<'_>,
        raw: &[u8],
    ) -> Result<()> {
        let message = HandshakeMessage::decode(raw)?;

        if message.msg_type == HandshakeType::HelloRequest {
            log::debug!("ignoring HelloRequest in state {:?}", self.state);
            return Ok(());
        }

        // The inbound Finished is consumed for verify_data and never
        // hashed; everything else lands in the transcript first
        if message.msg_type != HandshakeType::Finished {
            self.ctx.transcript.append(raw);
        }

        match (self.state, message.msg_type) {
            (StateId::ServerHello, HandshakeType::ServerHello) => {
                self.on_server_hello(fx, &message.body)
            },
            (StateId::ServerCertificate, HandshakeType::Certificate) => {
                self.on_server_certificate(fx, &message.body)
            },
            (StateId::CertificateRequest, HandshakeType::CertificateRequest) => {
                self.on_certificate_request(fx, &message.body)
            },
            (StateId::ServerHelloDone, HandshakeType::ServerHelloDone) => {
                self.on_server_hello_done(fx, &message.body)
            },
            (StateId::ServerFinished, HandshakeType::Finished) => {
                self.on_server_finished(fx, &message.body)
            },
            (state, msg_type) => Err(Error::UnexpectedMessage(format!(
                "{:?} in state {:?}",
                msg_type, state
            ))),
        }
    }

    /// Deliver the peer's ChangeCipherSpec.
    pub(crate) fn handle_change_cipher_spec(&mut self, fx: &mut Effects<'_>) -> Result<()> {
        if self.state != StateId::ChangeCipherSpec {
            return Err(Error::UnexpectedMessage(format!(
                "ChangeCipherSpec in state {:?}",
                self.state
            )));
        }

        let (enc_key, mac_key) = self
            .ctx
            .pending_read_keys
            .take()
            .ok_or_else(|| Error::Internal("read keys missing at ChangeCipherSpec".into()))?;
        *fx.read_cipher = Some(RecordDecryptor::new(enc_key, mac_key));

        self.transition(fx, StateId::ServerFinished)
    }

    /// Deliver inbound application data.
    pub(crate) fn handle_application_data(
        &mut self,
        fx: &mut Effects<'_>,
        data: Vec<u8>,
    ) -> Result<()> {
        if self.state != StateId::Established {
            return Err(Error::UnexpectedMessage(format!(
                "application data in state {:?}",
                self.state
            )));
        }
        fx.events.push_back(Event::ApplicationData(data));
        Ok(())
    }

    /// External verifier callback: the server chain checked out.
    ///
    /// A callback arriving in any other state (cancellation, duplicate
    /// delivery) is dropped.
    pub(crate) fn certificates_verified(&mut self, fx: &mut Effects<'_>) -> Result<()> {
        if self.state != StateId::VerifyServerCertificate {
            log::warn!("late verifier callback ignored in state {:?}", self.state);
            return Ok(());
        }
        self.transition(fx, StateId::CertificateVerify)
    }

    /// External signer callback: the transcript signature is ready.
    ///
    /// Emits CertificateVerify, switches the write direction to the
    /// freshly derived keys, and sends the client Finished.
    pub(crate) fn handshake_messages_signed(
        &mut self,
        fx: &mut Effects<'_>,
        algorithm: SignatureAlgorithm,
        signature: Vec<u8>,
    ) -> Result<()> {
        if self.state != StateId::CertificateVerify {
            log::warn!("late signer callback ignored in state {:?}", self.state);
            return Ok(());
        }

        let verify = CertificateVerify::new(algorithm, signature);
        let body = verify.encode()?;
        self.send_handshake(fx, HandshakeType::CertificateVerify, body)?;

        self.change_cipher_spec(fx)?;

        let verify_data = {
            let master = self
                .ctx
                .master_secret
                .as_ref()
                .ok_or_else(|| Error::Internal("master secret missing at Finished".into()))?;
            let digest = self.ctx.transcript.digest(fx.provider)?;
            prf::verify_data(fx.provider, master, b"client finished", &digest)?
        };
        let body = Finished::new(verify_data).encode()?;
        self.send_handshake(fx, HandshakeType::Finished, body)?;

        self.transition(fx, StateId::ChangeCipherSpec)
    }

    /// Whether a verifier result would currently be consumed.
    pub(crate) fn expects_verifier_result(&self) -> bool {
        self.state == StateId::VerifyServerCertificate
    }

    /// Whether a signer result would currently be consumed.
    pub(crate) fn expects_signer_result(&self) -> bool {
        self.state == StateId::CertificateVerify
    }

    fn on_server_hello(&mut self, fx: &mut Effects<'_>, body: &[u8]) -> Result<()> {
        let hello = ServerHello::decode(body)?;

        if hello.cipher_suite != CipherSuite::RsaWithAes128CbcSha.to_u16() {
            return Err(Error::HandshakeFailure(format!(
                "server selected cipher suite 0x{:04X}",
                hello.cipher_suite
            )));
        }
        if hello.compression_method != COMPRESSION_NULL {
            return Err(Error::HandshakeFailure(format!(
                "server selected compression method {}",
                hello.compression_method
            )));
        }

        self.ctx.server_random = Some(hello.random);
        self.ctx.session_id = hello.session_id;

        self.transition(fx, StateId::ServerCertificate)
    }

    fn on_server_certificate(&mut self, fx: &mut Effects<'_>, body: &[u8]) -> Result<()> {
        let certificate = Certificate::decode(body)?;
        let leaf = certificate
            .leaf()
            .ok_or_else(|| Error::BadCertificate("server sent an empty chain".into()))?;

        let spki = fx
            .provider
            .key_transport()
            .public_key_from_certificate(leaf)
            .map_err(|e| Error::BadCertificate(format!("server public key: {}", e)))?;

        self.ctx.server_public_key = Some(spki);
        self.ctx.server_certificates = certificate.certificate_list;

        self.transition(fx, StateId::CertificateRequest)
    }

    fn on_certificate_request(&mut self, fx: &mut Effects<'_>, body: &[u8]) -> Result<()> {
        // Parsed for validity; this client always answers with its
        // configured chain
        CertificateRequest::decode(body)?;
        self.transition(fx, StateId::ServerHelloDone)
    }

    fn on_server_hello_done(&mut self, fx: &mut Effects<'_>, body: &[u8]) -> Result<()> {
        ServerHelloDone::decode(body)?;

        let chain = Certificate::new(self.client_certificates.clone());
        let body = chain.encode()?;
        self.send_handshake(fx, HandshakeType::Certificate, body)?;

        let encrypted = {
            let spki = self
                .ctx
                .server_public_key
                .as_ref()
                .ok_or_else(|| Error::Internal("server public key missing".into()))?;
            fx.provider
                .key_transport()
                .encrypt(spki, &self.ctx.pre_master_secret)
                .map_err(|e| Error::BadCertificate(format!("server public key: {}", e)))?
        };
        let body = ClientKeyExchange::new(encrypted).encode()?;
        self.send_handshake(fx, HandshakeType::ClientKeyExchange, body)?;

        self.transition(fx, StateId::VerifyServerCertificate)
    }

    fn on_server_finished(&mut self, fx: &mut Effects<'_>, body: &[u8]) -> Result<()> {
        let finished = Finished::decode(body)?;

        let expected = {
            let master = self
                .ctx
                .master_secret
                .as_ref()
                .ok_or_else(|| Error::Internal("master secret missing at Finished".into()))?;
            let digest = self.ctx.transcript.digest(fx.provider)?;
            prf::verify_data(fx.provider, master, b"server finished", &digest)?
        };

        if !bool::from(expected.ct_eq(&finished.verify_data)) {
            return Err(Error::DecryptError(
                "server Finished verify_data mismatch".into(),
            ));
        }

        self.transition(fx, StateId::Established)
    }

    /// Derive keys, send ChangeCipherSpec, and switch the write direction.
    ///
    /// The server-write keys are parked until the server's own CCS
    /// arrives; no cleartext record may follow on either side of its
    /// boundary.
    fn change_cipher_spec(&mut self, fx: &mut Effects<'_>) -> Result<()> {
        let server_random = self
            .ctx
            .server_random
            .ok_or_else(|| Error::Internal("server random missing at key derivation".into()))?;

        let master = prf::master_secret(
            fx.provider,
            &self.ctx.pre_master_secret,
            &self.ctx.client_random,
            &server_random,
        )?;
        let block = prf::key_block(
            fx.provider,
            &master,
            &server_random,
            &self.ctx.client_random,
            CipherSuite::RsaWithAes128CbcSha.key_block_size(),
        )?;
        self.ctx.master_secret = Some(master);

        let keys = KeyBlock::partition(&block)?;

        fx.send_record(ContentType::ChangeCipherSpec, &[0x01])?;
        *fx.write_cipher = Some(RecordEncryptor::new(
            keys.client_write_key,
            keys.client_write_mac_key,
            &keys.iv_seed,
        )?);
        self.ctx.pending_read_keys = Some((keys.server_write_key, keys.server_write_mac_key));

        Ok(())
    }

    /// Encode a handshake message, append it to the transcript, and send
    /// it under the current write protection.
    fn send_handshake(
        &mut self,
        fx: &mut Effects<'_>,
        msg_type: HandshakeType,
        body: Vec<u8>,
    ) -> Result<()> {
        let message = HandshakeMessage::new(msg_type, body).encode()?;
        self.ctx.transcript.append(&message);
        fx.send_record(ContentType::Handshake, &message)
    }

    /// Move to `next`, firing exit hooks up to the lowest common ancestor
    /// and enter hooks down from it.
    fn transition(&mut self, fx: &mut Effects<'_>, next: StateId) -> Result<()> {
        let lca = lowest_common_ancestor(self.state, next);
        log::debug!("handshake state {:?} -> {:?}", self.state, next);

        let mut cursor = Some(self.state);
        while cursor != lca {
            match cursor {
                Some(id) => {
                    self.on_exit(fx, id)?;
                    cursor = id.parent();
                },
                None => break,
            }
        }

        let mut path = Vec::new();
        let mut cursor = Some(next);
        while cursor != lca {
            match cursor {
                Some(id) => {
                    path.push(id);
                    cursor = id.parent();
                },
                None => break,
            }
        }

        self.state = next;
        for id in path.iter().rev() {
            self.on_enter(fx, *id)?;
        }
        Ok(())
    }

    fn on_enter(&mut self, fx: &mut Effects<'_>, id: StateId) -> Result<()> {
        #[cfg(test)]
        self.hook_trace.push(("enter", id));

        match id {
            StateId::Handshake => {
                fx.provider.random().fill(&mut self.ctx.client_random)?;

                let mut pre_master = Zeroizing::new(vec![0u8; PRE_MASTER_SECRET_SIZE]);
                pre_master[0] = 0x03;
                pre_master[1] = 0x03;
                fx.provider.random().fill(&mut pre_master[2..])?;
                self.ctx.pre_master_secret = pre_master;
                Ok(())
            },
            StateId::ServerHello => {
                let hello = ClientHello::new(self.ctx.client_random);
                let body = hello.encode()?;
                self.send_handshake(fx, HandshakeType::ClientHello, body)
            },
            StateId::VerifyServerCertificate => {
                fx.events
                    .push_back(Event::VerifyCertificates(self.ctx.server_certificates.clone()));
                Ok(())
            },
            StateId::CertificateVerify => {
                fx.events
                    .push_back(Event::SignHandshake(self.ctx.transcript.bytes().to_vec()));
                Ok(())
            },
            StateId::Established => {
                fx.events.push_back(Event::Connected);
                Ok(())
            },
            _ => Ok(()),
        }
    }

    fn on_exit(&mut self, _fx: &mut Effects<'_>, id: StateId) -> Result<()> {
        #[cfg(test)]
        self.hook_trace.push(("exit", id));

        if id == StateId::Handshake {
            // The transcript and the secrets have served their purpose;
            // only the installed record keys survive
            self.ctx.transcript.clear();
            self.ctx.pre_master_secret = Zeroizing::new(Vec::new());
            self.ctx.master_secret = None;
            self.ctx.server_certificates.clear();
            self.ctx.server_public_key = None;
        }
        Ok(())
    }
}
