//! Negotiation messages, operation descriptors and result records.
//!
//! # Overview
//!
//! A negotiation is one request against one capability:
//!
//! - a [`GetOperation`] carries a [`GetMessage`] (GET, GETCURRENT,
//!   GETDEFAULT, GETHELP, GETLABELENUM)
//! - a [`SetOperation`] carries a [`SetMessage`] (SET, RESET, RESETALL,
//!   SETCONSTRAINT)
//!
//! Both may carry container-type and data-type hints for the device.
//! Each attempt is summarized by a [`NegotiationResult`].
//!
//! # Example
//!
//! ```rust
//! use scancap_core::names::ICAP_PIXELTYPE;
//! use scancap_protocol::{GetOperation, NegotiationResult, results_to_json};
//!
//! let record = NegotiationResult::succeeded(ICAP_PIXELTYPE, GetOperation::get());
//! let json = results_to_json(&[record]).unwrap();
//! assert!(json.contains("\"capability\": 257"));
//! ```

mod error;
mod message;
mod operation;
mod result;

pub use error::{ProtocolError, ProtocolResult};
pub use message::{ContainerVariant, GetMessage, SetMessage};
pub use operation::{
    GetOperation, OperationBuilder, OperationDescriptor, OperationKind, SetOperation,
};
pub use result::{NegotiationResult, ResultKind, codes, results_from_json, results_to_json};
