//! Error types for device transport calls.
//!
//! A transport failure always carries the device's native condition code
//! unchanged, so higher layers can map it to device-specific meaning.

use std::fmt;
use thiserror::Error;

/// A native condition code reported by the device or its driver.
///
/// Codes outside the well-known set are preserved as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConditionCode(pub u16);

impl ConditionCode {
    pub const SUCCESS: Self = Self(0);
    /// Unspecified failure.
    pub const BUMMER: Self = Self(1);
    pub const LOW_MEMORY: Self = Self(2);
    pub const NO_DS: Self = Self(3);
    pub const MAX_CONNECTIONS: Self = Self(4);
    pub const OPERATION_ERROR: Self = Self(5);
    pub const BAD_CAP: Self = Self(6);
    pub const BAD_PROTOCOL: Self = Self(9);
    pub const BAD_VALUE: Self = Self(10);
    pub const SEQ_ERROR: Self = Self(11);
    pub const BAD_DEST: Self = Self(12);
    pub const CAP_UNSUPPORTED: Self = Self(13);
    pub const CAP_BAD_OPERATION: Self = Self(14);
    pub const CAP_SEQ_ERROR: Self = Self(15);
    pub const DENIED: Self = Self(16);
    pub const PAPER_JAM: Self = Self(20);
    pub const PAPER_DOUBLE_FEED: Self = Self(21);
    pub const CHECK_DEVICE_ONLINE: Self = Self(23);

    /// Returns the raw code.
    pub fn raw(self) -> u16 {
        self.0
    }

    /// Returns a short name for well-known codes.
    pub fn as_str(self) -> &'static str {
        match self.0 {
            0 => "success",
            1 => "bummer",
            2 => "low_memory",
            3 => "no_ds",
            4 => "max_connections",
            5 => "operation_error",
            6 => "bad_cap",
            9 => "bad_protocol",
            10 => "bad_value",
            11 => "seq_error",
            12 => "bad_dest",
            13 => "cap_unsupported",
            14 => "cap_bad_operation",
            15 => "cap_seq_error",
            16 => "denied",
            20 => "paper_jam",
            21 => "paper_double_feed",
            23 => "check_device_online",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.0)
    }
}

/// A failed call across the device boundary.
#[derive(Debug, Error)]
pub struct TransportError {
    code: ConditionCode,
    message: String,
    /// Product name of the device that failed, if known.
    device: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    /// Creates a new transport error with the given code and message.
    pub fn new(code: ConditionCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            device: None,
            source: None,
        }
    }

    /// Creates an error for a capability the device does not know.
    pub fn cap_unsupported(message: impl Into<String>) -> Self {
        Self::new(ConditionCode::CAP_UNSUPPORTED, message)
    }

    /// Creates an error for an operation the capability does not allow.
    pub fn bad_operation(message: impl Into<String>) -> Self {
        Self::new(ConditionCode::CAP_BAD_OPERATION, message)
    }

    /// Creates an error for a value the device rejected.
    pub fn bad_value(message: impl Into<String>) -> Self {
        Self::new(ConditionCode::BAD_VALUE, message)
    }

    /// Creates an unspecified device failure.
    pub fn bummer(message: impl Into<String>) -> Self {
        Self::new(ConditionCode::BUMMER, message)
    }

    /// Sets the device name for this error.
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the native condition code.
    pub fn code(&self) -> ConditionCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the device name, if set.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref device) = self.device {
            write!(f, "[{}] ", device)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;
