//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while decoding messages or exporting records.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Native code is not one of the get-style messages.
    #[error("unknown get message code: {0:#06x}")]
    UnknownGetMessage(u16),

    /// Native code is not one of the set-style messages.
    #[error("unknown set message code: {0:#06x}")]
    UnknownSetMessage(u16),

    /// Failed to serialize records to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
