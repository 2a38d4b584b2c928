//! Error types for the mutls core.

use core::fmt;

/// Result type for mutls operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur in the mutls core.
///
/// Every variant except [`Error::NotReady`] is fatal to the connection:
/// the connection attempts to emit a matching fatal alert and then refuses
/// all further traffic. `NotReady` only rejects the offending call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Record header or ServerHello carried a version other than 0x0303
    ProtocolVersion,

    /// Wrong message for the current handshake state, unsolicited
    /// ChangeCipherSpec/ApplicationData, or an unknown content type
    UnexpectedMessage(String),

    /// Malformed length field or truncated message
    DecodeError(String),

    /// MAC mismatch or padding anomaly on record decryption
    BadRecordMac,

    /// Server selected a cipher suite or compression method we did not
    /// offer
    HandshakeFailure(String),

    /// The external verifier rejected the server certificate chain, or a
    /// certificate was unusable
    BadCertificate(String),

    /// Server Finished verify_data mismatch, or signer failure
    DecryptError(String),

    /// Fatal alert received from the peer
    AlertReceived(AlertDescription),

    /// Sequence number overflow, PRF invariant violation, provider failure
    Internal(String),

    /// Application write before the connection is established
    NotReady,

    /// Peer close_notify observed, local close, or transport closed
    Closed,
}

impl Error {
    /// The alert description a fatal error maps to on the wire.
    pub const fn alert_description(&self) -> AlertDescription {
        match self {
            Error::ProtocolVersion => AlertDescription::ProtocolVersion,
            Error::UnexpectedMessage(_) => AlertDescription::UnexpectedMessage,
            Error::DecodeError(_) => AlertDescription::DecodeError,
            Error::BadRecordMac => AlertDescription::BadRecordMac,
            Error::HandshakeFailure(_) => AlertDescription::HandshakeFailure,
            Error::BadCertificate(_) => AlertDescription::BadCertificate,
            Error::DecryptError(_) => AlertDescription::DecryptError,
            Error::AlertReceived(_) => AlertDescription::CloseNotify,
            Error::Internal(_) => AlertDescription::InternalError,
            Error::NotReady => AlertDescription::InternalError,
            Error::Closed => AlertDescription::CloseNotify,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ProtocolVersion => write!(f, "Unsupported protocol version"),
            Error::UnexpectedMessage(msg) => write!(f, "Unexpected message: {}", msg),
            Error::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            Error::BadRecordMac => write!(f, "Bad record MAC"),
            Error::HandshakeFailure(msg) => write!(f, "Handshake failure: {}", msg),
            Error::BadCertificate(msg) => write!(f, "Bad certificate: {}", msg),
            Error::DecryptError(msg) => write!(f, "Decrypt error: {}", msg),
            Error::AlertReceived(desc) => write!(f, "Fatal alert received: {:?}", desc),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
            Error::NotReady => write!(f, "Connection is not established"),
            Error::Closed => write!(f, "Connection is closed"),
        }
    }
}

impl std::error::Error for Error {}

impl From<mutls_crypto::Error> for Error {
    fn from(e: mutls_crypto::Error) -> Self {
        Error::Internal(format!("crypto provider: {}", e))
    }
}

/// TLS alert descriptions (RFC 5246 Section 7.2).
///
/// Only the descriptions this profile can produce or meaningfully react to
/// are carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlertDescription {
    /// Close notify
    CloseNotify = 0,

    /// Unexpected message
    UnexpectedMessage = 10,

    /// Bad record MAC
    BadRecordMac = 20,

    /// Record overflow
    RecordOverflow = 22,

    /// Handshake failure
    HandshakeFailure = 40,

    /// Bad certificate
    BadCertificate = 42,

    /// Decode error
    DecodeError = 50,

    /// Decrypt error
    DecryptError = 51,

    /// Protocol version
    ProtocolVersion = 70,

    /// Internal error
    InternalError = 80,

    /// User canceled
    UserCanceled = 90,
}

impl AlertDescription {
    /// Convert from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AlertDescription::CloseNotify),
            10 => Some(AlertDescription::UnexpectedMessage),
            20 => Some(AlertDescription::BadRecordMac),
            22 => Some(AlertDescription::RecordOverflow),
            40 => Some(AlertDescription::HandshakeFailure),
            42 => Some(AlertDescription::BadCertificate),
            50 => Some(AlertDescription::DecodeError),
            51 => Some(AlertDescription::DecryptError),
            70 => Some(AlertDescription::ProtocolVersion),
            80 => Some(AlertDescription::InternalError),
            90 => Some(AlertDescription::UserCanceled),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_description_conversion() {
        assert_eq!(
            AlertDescription::from_u8(0),
            Some(AlertDescription::CloseNotify)
        );
        assert_eq!(
            AlertDescription::from_u8(20),
            Some(AlertDescription::BadRecordMac)
        );
        assert_eq!(AlertDescription::from_u8(255), None);

        assert_eq!(AlertDescription::CloseNotify.to_u8(), 0);
        assert_eq!(AlertDescription::DecryptError.to_u8(), 51);
    }

    #[test]
    fn test_error_to_alert_mapping() {
        assert_eq!(
            Error::BadRecordMac.alert_description(),
            AlertDescription::BadRecordMac
        );
        assert_eq!(
            Error::ProtocolVersion.alert_description(),
            AlertDescription::ProtocolVersion
        );
        assert_eq!(
            Error::DecryptError("verify_data mismatch".into()).alert_description(),
            AlertDescription::DecryptError
        );
        assert_eq!(
            Error::Internal("overflow".into()).alert_description(),
            AlertDescription::InternalError
        );
    }
}
