//! Shared test harness: a scripted TLS 1.2 server driven from test code.
//!
//! The server side reuses the crate's own codecs, PRF, and record
//! protection, holds a real RSA key behind a synthetic certificate, and
//! mirrors the client's transcript so both Finished values can be
//! computed and checked for real.

#![allow(dead_code)]

use mutls_core::messages::{
    Certificate, CertificateRequest, ClientHello, ClientKeyExchange, HandshakeMessage,
    ServerHello, ServerHelloDone,
};
use mutls_core::prf;
use mutls_core::protocol::{ContentType, HandshakeType, ProtocolVersion};
use mutls_core::record::{self, FragmentDispatcher, ProtocolMessage, RecordDeframer};
use mutls_core::record_protection::{KeyBlock, RecordDecryptor, RecordEncryptor};
use mutls_crypto::signature::SigningKey;
use mutls_crypto::{CryptoProvider, HashAlgorithm, SignatureAlgorithm};
use mutls_crypto_rustcrypto::RustCryptoProvider;
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};

/// Encode one DER tag-length-value element.
pub fn tlv(tag: u8, contents: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = contents.len();
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xFF {
        out.push(0x81);
        out.push(len as u8);
    } else {
        out.push(0x82);
        out.push((len >> 8) as u8);
        out.push(len as u8);
    }
    out.extend_from_slice(contents);
    out
}

/// Build a structurally valid v3 certificate around the given SPKI TLV.
pub fn certificate_with_spki(spki: &[u8]) -> Vec<u8> {
    let mut tbs = Vec::new();
    tbs.extend(tlv(0xA0, &tlv(0x02, &[2])));
    tbs.extend(tlv(0x02, &[1])); // serialNumber
    tbs.extend(tlv(0x30, &[])); // signature
    tbs.extend(tlv(0x30, &[])); // issuer
    tbs.extend(tlv(0x30, &[])); // validity
    tbs.extend(tlv(0x30, &[])); // subject
    tbs.extend_from_slice(spki);

    let mut cert = tlv(0x30, &tbs);
    cert.extend(tlv(0x30, &[]));
    cert.extend(tlv(0x03, &[0x00, 0xAA]));
    tlv(0x30, &cert)
}

/// An RSA identity: private key plus a synthetic certificate carrying it.
pub struct Identity {
    pub private_key: RsaPrivateKey,
    pub key_der: Vec<u8>,
    pub spki: Vec<u8>,
    pub certificate: Vec<u8>,
}

impl Identity {
    pub fn generate() -> Self {
        let private_key = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        let key_der = private_key.to_pkcs8_der().unwrap().as_bytes().to_vec();
        let spki = private_key
            .to_public_key()
            .to_public_key_der()
            .unwrap()
            .as_bytes()
            .to_vec();
        let certificate = certificate_with_spki(&spki);
        Self {
            private_key,
            key_der,
            spki,
            certificate,
        }
    }

    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from_der(self.key_der.clone())
    }
}

/// Frame one handshake message into a record of its own.
pub fn handshake_record(msg_type: HandshakeType, body: Vec<u8>) -> (Vec<u8>, Vec<u8>) {
    let message = HandshakeMessage::new(msg_type, body).encode().unwrap();
    let mut wire = Vec::new();
    record::write_record(&mut wire, ContentType::Handshake, &message).unwrap();
    (wire, message)
}

/// The scripted server.
pub struct ScriptedServer {
    pub provider: RustCryptoProvider,
    pub identity: Identity,
    pub server_random: [u8; 32],
    pub transcript: Vec<u8>,
    pub client_random: Option<[u8; 32]>,
    pub master_secret: Option<Vec<u8>>,
    pub keys: Option<KeyBlock>,
    records: RecordDeframer,
    fragments: FragmentDispatcher,
    read_cipher: Option<RecordDecryptor>,
    write_cipher: Option<RecordEncryptor>,
}

impl ScriptedServer {
    pub fn new() -> Self {
        Self {
            provider: RustCryptoProvider::new(),
            identity: Identity::generate(),
            server_random: [0x5C; 32],
            transcript: Vec::new(),
            client_random: None,
            master_secret: None,
            keys: None,
            records: RecordDeframer::new(),
            fragments: FragmentDispatcher::new(),
            read_cipher: None,
            write_cipher: None,
        }
    }

    /// Decode everything the client wrote, decrypting once the client's
    /// ChangeCipherSpec has passed.
    pub fn read_client(&mut self, wire: &[u8]) -> Vec<ProtocolMessage> {
        self.records.push(wire);
        let mut messages = Vec::new();
        loop {
            if let Some(message) = self.fragments.next_message().unwrap() {
                // Everything after the client's CCS arrives under the
                // client-write keys
                if message == ProtocolMessage::ChangeCipherSpec {
                    let keys = self.keys.as_ref().unwrap();
                    self.read_cipher = Some(RecordDecryptor::new(
                        keys.client_write_key.clone(),
                        keys.client_write_mac_key.clone(),
                    ));
                }
                messages.push(message);
                continue;
            }
            let Some((header, payload)) = self.records.next_record().unwrap() else {
                break;
            };
            let fragment = match self.read_cipher.as_mut() {
                Some(cipher) => cipher
                    .decrypt(&self.provider, header.content_type, &payload)
                    .unwrap(),
                None => payload,
            };
            self.fragments.push(header.content_type, &fragment).unwrap();
        }
        messages
    }

    /// Consume the ClientHello and remember its random.
    pub fn accept_client_hello(&mut self, messages: &[ProtocolMessage]) {
        let raw = match &messages[0] {
            ProtocolMessage::Handshake(raw) => raw,
            other => panic!("expected ClientHello, got {:?}", other),
        };
        let message = HandshakeMessage::decode(raw).unwrap();
        assert_eq!(message.msg_type, HandshakeType::ClientHello);
        let hello = ClientHello::decode(&message.body).unwrap();
        self.client_random = Some(hello.random);
        self.transcript.extend_from_slice(raw);
    }

    /// The server's first flight, one record per message.
    pub fn first_flight(&mut self) -> Vec<u8> {
        let mut wire = Vec::new();

        let hello = ServerHello::new(self.server_random, 0x002F);
        for (msg_type, body) in [
            (HandshakeType::ServerHello, hello.encode().unwrap()),
            (
                HandshakeType::Certificate,
                Certificate::new(vec![self.identity.certificate.clone()])
                    .encode()
                    .unwrap(),
            ),
            (
                HandshakeType::CertificateRequest,
                CertificateRequest::new(vec![0x01], vec![0x0401])
                    .encode()
                    .unwrap(),
            ),
            (
                HandshakeType::ServerHelloDone,
                ServerHelloDone::new().encode().unwrap(),
            ),
        ] {
            let (record, message) = handshake_record(msg_type, body);
            wire.extend_from_slice(&record);
            self.transcript.extend_from_slice(&message);
        }
        wire
    }

    /// Consume the client Certificate and ClientKeyExchange, recover the
    /// pre-master secret, and derive keys.
    pub fn accept_certificate_and_key_exchange(
        &mut self,
        messages: &[ProtocolMessage],
    ) -> Certificate {
        let mut iter = messages.iter();

        let raw = match iter.next() {
            Some(ProtocolMessage::Handshake(raw)) => raw,
            other => panic!("expected client Certificate, got {:?}", other),
        };
        let message = HandshakeMessage::decode(raw).unwrap();
        assert_eq!(message.msg_type, HandshakeType::Certificate);
        let client_chain = Certificate::decode(&message.body).unwrap();
        self.transcript.extend_from_slice(raw);

        let raw = match iter.next() {
            Some(ProtocolMessage::Handshake(raw)) => raw,
            other => panic!("expected ClientKeyExchange, got {:?}", other),
        };
        let message = HandshakeMessage::decode(raw).unwrap();
        assert_eq!(message.msg_type, HandshakeType::ClientKeyExchange);
        let key_exchange = ClientKeyExchange::decode(&message.body).unwrap();
        self.transcript.extend_from_slice(raw);

        let pre_master = self
            .identity
            .private_key
            .decrypt(Pkcs1v15Encrypt, &key_exchange.encrypted_pre_master_secret)
            .unwrap();
        assert_eq!(pre_master.len(), 48);
        assert_eq!(&pre_master[..2], &[0x03, 0x03]);

        let client_random = self.client_random.unwrap();
        let master = prf::master_secret(
            &self.provider,
            &pre_master,
            &client_random,
            &self.server_random,
        )
        .unwrap();
        let block = prf::key_block(
            &self.provider,
            &master,
            &self.server_random,
            &client_random,
            88,
        )
        .unwrap();
        self.keys = Some(KeyBlock::partition(&block).unwrap());
        self.master_secret = Some(master.to_vec());

        client_chain
    }

    /// Consume CertificateVerify, the client CCS, and the encrypted
    /// client Finished; check the signature and verify_data.
    pub fn accept_certificate_verify_and_finished(
        &mut self,
        messages: &[ProtocolMessage],
        client_spki: &[u8],
    ) {
        let mut iter = messages.iter();

        let raw = match iter.next() {
            Some(ProtocolMessage::Handshake(raw)) => raw.clone(),
            other => panic!("expected CertificateVerify, got {:?}", other),
        };
        let message = HandshakeMessage::decode(&raw).unwrap();
        assert_eq!(message.msg_type, HandshakeType::CertificateVerify);
        let verify =
            mutls_core::messages::CertificateVerify::decode(&message.body).unwrap();
        assert_eq!(verify.algorithm, SignatureAlgorithm::RsaPkcs1Sha256);

        // The signature covers the transcript up to (not including) the
        // CertificateVerify itself
        self.provider
            .signature(SignatureAlgorithm::RsaPkcs1Sha256)
            .unwrap()
            .verify(client_spki, &self.transcript, &verify.signature)
            .unwrap();
        self.transcript.extend_from_slice(&raw);

        match iter.next() {
            Some(ProtocolMessage::ChangeCipherSpec) => {},
            other => panic!("expected ChangeCipherSpec, got {:?}", other),
        }

        let raw = match iter.next() {
            Some(ProtocolMessage::Handshake(raw)) => raw.clone(),
            other => panic!("expected client Finished, got {:?}", other),
        };
        let message = HandshakeMessage::decode(&raw).unwrap();
        assert_eq!(message.msg_type, HandshakeType::Finished);

        let expected = prf::verify_data(
            &self.provider,
            self.master_secret.as_ref().unwrap(),
            b"client finished",
            &self.transcript_digest(),
        )
        .unwrap();
        assert_eq!(message.body, expected, "client verify_data mismatch");

        // The client's Finished joins the transcript the server Finished
        // is computed over
        self.transcript.extend_from_slice(&raw);
    }

    /// The server's ChangeCipherSpec plus encrypted Finished.
    pub fn final_flight(&mut self) -> Vec<u8> {
        let verify_data = prf::verify_data(
            &self.provider,
            self.master_secret.as_ref().unwrap(),
            b"server finished",
            &self.transcript_digest(),
        )
        .unwrap();
        self.final_flight_with_verify_data(verify_data)
    }

    /// Same as [`final_flight`], with caller-controlled verify_data.
    pub fn final_flight_with_verify_data(&mut self, verify_data: Vec<u8>) -> Vec<u8> {
        let keys = self.keys.as_ref().unwrap();
        let mut encryptor = RecordEncryptor::new(
            keys.server_write_key.clone(),
            keys.server_write_mac_key.clone(),
            &keys.iv_seed,
        )
        .unwrap();

        let mut wire = Vec::new();
        record::write_record(&mut wire, ContentType::ChangeCipherSpec, &[0x01]).unwrap();

        let message = HandshakeMessage::new(HandshakeType::Finished, verify_data)
            .encode()
            .unwrap();
        let protected = encryptor
            .encrypt(&self.provider, ContentType::Handshake, &message)
            .unwrap();
        record::write_record(&mut wire, ContentType::Handshake, &protected).unwrap();

        self.write_cipher = Some(encryptor);
        wire
    }

    /// Encrypt application data from the server side.
    pub fn application_record(&mut self, payload: &[u8]) -> Vec<u8> {
        self.protected_record(ContentType::ApplicationData, payload)
    }

    /// Encrypt a close_notify alert from the server side.
    pub fn close_notify_record(&mut self) -> Vec<u8> {
        let alert = mutls_core::alert::Alert::close_notify().encode();
        self.protected_record(ContentType::Alert, &alert)
    }

    fn protected_record(&mut self, content_type: ContentType, payload: &[u8]) -> Vec<u8> {
        let protected = self
            .write_cipher
            .as_mut()
            .unwrap()
            .encrypt(&self.provider, content_type, payload)
            .unwrap();
        let mut wire = Vec::new();
        record::write_record(&mut wire, content_type, &protected).unwrap();
        wire
    }

    fn transcript_digest(&self) -> Vec<u8> {
        let mut hash = self.provider.hash(HashAlgorithm::Sha256).unwrap();
        hash.update(&self.transcript);
        hash.finalize()
    }
}

/// A record header with a chosen version octet pair, for failure tests.
pub fn raw_record(content_type: u8, version: u16, payload: &[u8]) -> Vec<u8> {
    let mut wire = vec![content_type];
    wire.extend_from_slice(&version.to_be_bytes());
    wire.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    wire.extend_from_slice(payload);
    wire
}

/// Assert the last bytes queued for the transport are the given fatal
/// alert.
pub fn assert_fatal_alert(wire: &[u8], description: u8) {
    assert!(wire.len() >= 7, "no alert record in output");
    let alert = &wire[wire.len() - 7..];
    assert_eq!(alert[0], ContentType::Alert.to_u8());
    assert_eq!(&alert[1..3], &ProtocolVersion::Tls12.to_u16().to_be_bytes());
    assert_eq!(&alert[3..5], &[0x00, 0x02]);
    assert_eq!(alert[5], 2, "alert level must be fatal");
    assert_eq!(alert[6], description);
}
