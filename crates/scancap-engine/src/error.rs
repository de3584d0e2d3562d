//! Engine error types.

use std::io;

use scancap_core::{CapabilityId, RangeError};
use scancap_protocol::codes;
use scancap_transport::TransportError;
use thiserror::Error;

/// Result type for negotiation calls.
pub type NegotiationResultOf<T> = Result<T, NegotiationError>;

/// Why a negotiation attempt failed.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// No device is attached.
    #[error("no device attached")]
    BadSource,

    /// The capability is absent from a non-empty registry.
    #[error("capability {0} is not supported by the attached device")]
    CapNotSupported(CapabilityId),

    /// The device answered with a malformed range.
    #[error("invalid range: {0}")]
    InvalidRange(#[from] RangeError),

    /// A symbolic name matched neither the name table nor the device.
    #[error("unknown capability name: {0}")]
    UnknownName(String),

    /// The device or driver refused the request.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl NegotiationError {
    /// The status code recorded in history for this error.
    ///
    /// Transport errors keep the native condition code verbatim.
    pub fn code(&self) -> i32 {
        match self {
            Self::BadSource => codes::BAD_SOURCE,
            Self::CapNotSupported(_) | Self::UnknownName(_) => codes::CAP_NOT_SUPPORTED,
            Self::InvalidRange(_) => codes::INVALID_RANGE,
            Self::Transport(err) => i32::from(err.code().raw()),
        }
    }
}

/// Errors loading an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use scancap_core::names::ICAP_BITDEPTH;
    use scancap_transport::ConditionCode;

    #[test]
    fn codes_are_distinct_and_native_codes_pass_through() {
        assert_eq!(NegotiationError::BadSource.code(), -1001);
        assert_eq!(NegotiationError::CapNotSupported(ICAP_BITDEPTH).code(), -1002);
        assert_eq!(
            NegotiationError::from(RangeError::MinGreaterThanMax).code(),
            -1003
        );
        let native = TransportError::new(ConditionCode(0x8042), "vendor");
        assert_eq!(NegotiationError::from(native).code(), 0x8042);
    }

    #[test]
    fn display() {
        let err = NegotiationError::CapNotSupported(ICAP_BITDEPTH);
        assert!(err.to_string().contains("ICAP_BITDEPTH"));
        assert_eq!(NegotiationError::BadSource.to_string(), "no device attached");
    }
}
