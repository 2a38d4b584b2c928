//! TLS protocol constants and types.

/// TLS protocol version.
///
/// This client speaks TLS 1.2 only; the other versions exist so that a
/// peer's version octets can be named in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ProtocolVersion {
    /// TLS 1.0 (RFC 2246) - Legacy, not supported
    Tls10 = 0x0301,

    /// TLS 1.1 (RFC 4346) - Legacy, not supported
    Tls11 = 0x0302,

    /// TLS 1.2 (RFC 5246)
    Tls12 = 0x0303,

    /// TLS 1.3 (RFC 8446) - Not supported
    Tls13 = 0x0304,
}

impl ProtocolVersion {
    /// Create from wire format (u16 big-endian).
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0301 => Some(ProtocolVersion::Tls10),
            0x0302 => Some(ProtocolVersion::Tls11),
            0x0303 => Some(ProtocolVersion::Tls12),
            0x0304 => Some(ProtocolVersion::Tls13),
            _ => None,
        }
    }

    /// Convert to wire format (u16 big-endian).
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Get the protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            ProtocolVersion::Tls10 => "TLS 1.0",
            ProtocolVersion::Tls11 => "TLS 1.1",
            ProtocolVersion::Tls12 => "TLS 1.2",
            ProtocolVersion::Tls13 => "TLS 1.3",
        }
    }
}

/// TLS content type (RFC 5246 Section 6.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContentType {
    /// Change cipher spec (20)
    ChangeCipherSpec = 20,

    /// Alert (21)
    Alert = 21,

    /// Handshake (22)
    Handshake = 22,

    /// Application data (23)
    ApplicationData = 23,
}

impl ContentType {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            20 => Some(ContentType::ChangeCipherSpec),
            21 => Some(ContentType::Alert),
            22 => Some(ContentType::Handshake),
            23 => Some(ContentType::ApplicationData),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Handshake message type (RFC 5246 Section 7.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandshakeType {
    /// HelloRequest (0) - ignored by this client
    HelloRequest = 0,

    /// ClientHello (1)
    ClientHello = 1,

    /// ServerHello (2)
    ServerHello = 2,

    /// Certificate (11)
    Certificate = 11,

    /// CertificateRequest (13)
    CertificateRequest = 13,

    /// ServerHelloDone (14)
    ServerHelloDone = 14,

    /// CertificateVerify (15)
    CertificateVerify = 15,

    /// ClientKeyExchange (16)
    ClientKeyExchange = 16,

    /// Finished (20)
    Finished = 20,
}

impl HandshakeType {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(HandshakeType::HelloRequest),
            1 => Some(HandshakeType::ClientHello),
            2 => Some(HandshakeType::ServerHello),
            11 => Some(HandshakeType::Certificate),
            13 => Some(HandshakeType::CertificateRequest),
            14 => Some(HandshakeType::ServerHelloDone),
            15 => Some(HandshakeType::CertificateVerify),
            16 => Some(HandshakeType::ClientKeyExchange),
            20 => Some(HandshakeType::Finished),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// TLS 1.2 cipher suite.
///
/// This client negotiates exactly one suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CipherSuite {
    /// TLS_RSA_WITH_AES_128_CBC_SHA (0x002F) - RFC 5246
    RsaWithAes128CbcSha = 0x002F,
}

impl CipherSuite {
    /// Create from wire format (u16 big-endian).
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x002F => Some(CipherSuite::RsaWithAes128CbcSha),
            _ => None,
        }
    }

    /// Convert to wire format (u16 big-endian).
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Get the cipher suite name.
    pub const fn name(self) -> &'static str {
        match self {
            CipherSuite::RsaWithAes128CbcSha => "TLS_RSA_WITH_AES_128_CBC_SHA",
        }
    }

    /// Record MAC key size in bytes (HMAC-SHA1).
    pub const fn mac_key_size(self) -> usize {
        20
    }

    /// Encryption key size in bytes (AES-128).
    pub const fn enc_key_size(self) -> usize {
        16
    }

    /// Cipher block and IV size in bytes.
    pub const fn block_size(self) -> usize {
        16
    }

    /// Length of the PRF key-block expansion: two MAC keys, two encryption
    /// keys, and the 16-byte IV seed that follows them.
    pub const fn key_block_size(self) -> usize {
        2 * self.mac_key_size() + 2 * self.enc_key_size() + self.block_size()
    }
}

/// The single compression method this client offers (null).
pub const COMPRESSION_NULL: u8 = 0x00;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_version() {
        assert_eq!(
            ProtocolVersion::from_u16(0x0303),
            Some(ProtocolVersion::Tls12)
        );
        assert_eq!(ProtocolVersion::Tls12.to_u16(), 0x0303);
        assert_eq!(ProtocolVersion::Tls12.name(), "TLS 1.2");
        assert_eq!(ProtocolVersion::from_u16(0x0305), None);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(ContentType::from_u8(22), Some(ContentType::Handshake));
        assert_eq!(ContentType::Handshake.to_u8(), 22);
        assert_eq!(ContentType::from_u8(24), None);
    }

    #[test]
    fn test_handshake_type() {
        assert_eq!(HandshakeType::from_u8(1), Some(HandshakeType::ClientHello));
        assert_eq!(HandshakeType::ClientHello.to_u8(), 1);
        assert_eq!(HandshakeType::from_u8(12), None);
    }

    #[test]
    fn test_cipher_suite() {
        assert_eq!(
            CipherSuite::from_u16(0x002F),
            Some(CipherSuite::RsaWithAes128CbcSha)
        );
        assert_eq!(CipherSuite::RsaWithAes128CbcSha.to_u16(), 0x002F);
        assert_eq!(CipherSuite::from_u16(0x0035), None);
    }

    #[test]
    fn test_key_block_size() {
        // 20 + 20 + 16 + 16 keys, then 16 bytes of IV seed
        assert_eq!(CipherSuite::RsaWithAes128CbcSha.key_block_size(), 88);
    }
}
