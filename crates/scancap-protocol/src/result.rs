//! Negotiation result records.
//!
//! Every negotiation attempt produces one [`NegotiationResult`]. For
//! regular get/set attempts, `error_code` is 0 on success, the native
//! condition code for device failures, or one of the negative crate
//! codes in [`codes`]. Value-support tests reuse the field as a boolean
//! (1 = supported, 0 = not supported); such records carry
//! [`ResultKind::SupportTest`] so readers can tell the two apart.

use chrono::{DateTime, Utc};
use scancap_core::CapabilityId;
use serde::{Deserialize, Serialize};

use crate::error::ProtocolResult;
use crate::operation::OperationDescriptor;

/// Crate-level result codes. Negative so they never collide with native
/// condition codes.
pub mod codes {
    /// The operation succeeded.
    pub const SUCCESS: i32 = 0;
    /// No device is attached.
    pub const BAD_SOURCE: i32 = -1001;
    /// The capability is absent from a non-empty registry.
    pub const CAP_NOT_SUPPORTED: i32 = -1002;
    /// A range result was malformed.
    pub const INVALID_RANGE: i32 = -1003;
    /// Support test outcome: the value is supported.
    pub const VALUE_SUPPORTED: i32 = 1;
    /// Support test outcome: the value is not supported.
    pub const VALUE_NOT_SUPPORTED: i32 = 0;
}

/// What the `error_code` of a record means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// A get or set attempt; `error_code` is a status code.
    Negotiation,
    /// A value-support test; `error_code` is 1 (supported) or 0.
    SupportTest,
}

/// Outcome of one negotiation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationResult {
    /// The capability that was negotiated.
    pub capability: CapabilityId,
    /// The operation that was attempted.
    pub operation: OperationDescriptor,
    /// Whether the attempt succeeded (for support tests: whether the
    /// value is supported).
    pub success: bool,
    /// Status code; see the module docs.
    pub error_code: i32,
    /// How to read `error_code`.
    pub kind: ResultKind,
    /// When the attempt finished.
    pub recorded_at: DateTime<Utc>,
}

impl NegotiationResult {
    /// A successful get or set attempt.
    pub fn succeeded(capability: CapabilityId, operation: impl Into<OperationDescriptor>) -> Self {
        Self {
            capability,
            operation: operation.into(),
            success: true,
            error_code: codes::SUCCESS,
            kind: ResultKind::Negotiation,
            recorded_at: Utc::now(),
        }
    }

    /// A failed get or set attempt.
    pub fn failed(
        capability: CapabilityId,
        operation: impl Into<OperationDescriptor>,
        error_code: i32,
    ) -> Self {
        Self {
            capability,
            operation: operation.into(),
            success: false,
            error_code,
            kind: ResultKind::Negotiation,
            recorded_at: Utc::now(),
        }
    }

    /// The outcome of a value-support test.
    pub fn support_test(
        capability: CapabilityId,
        operation: impl Into<OperationDescriptor>,
        supported: bool,
    ) -> Self {
        Self {
            capability,
            operation: operation.into(),
            success: supported,
            error_code: if supported {
                codes::VALUE_SUPPORTED
            } else {
                codes::VALUE_NOT_SUPPORTED
            },
            kind: ResultKind::SupportTest,
            recorded_at: Utc::now(),
        }
    }

    /// Builder: override the timestamp.
    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }

    /// Returns true if this is a value-support test record.
    pub fn is_support_test(&self) -> bool {
        self.kind == ResultKind::SupportTest
    }
}

/// Exports records as a pretty-printed JSON array.
pub fn results_to_json(results: &[NegotiationResult]) -> ProtocolResult<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Parses records exported by [`results_to_json`].
pub fn results_from_json(json: &str) -> ProtocolResult<Vec<NegotiationResult>> {
    Ok(serde_json::from_str(json)?)
}
