//! Device transport boundary.
//!
//! - [`CapabilityTransport`] - the trait every device driver wrapper implements
//! - [`TransportError`] - failures carrying the native condition code
//! - [`ErrorTransport`] - a transport that always fails
//! - [`ScriptedTransport`] - an in-memory transport that records every call
//!
//! # Example
//!
//! ```
//! use scancap_core::{ContainerType, DataType, Value, names::ICAP_PIXELTYPE};
//! use scancap_protocol::GetMessage;
//! use scancap_transport::{
//!     CapabilityTransport, DeviceIdentity, DeviceScript, ScriptedCapability, ScriptedTransport,
//! };
//!
//! let mut transport = ScriptedTransport::new().with_device(
//!     DeviceScript::new("Flatbed").with_capability(
//!         ScriptedCapability::new(ICAP_PIXELTYPE, DataType::UInt16).with_answer(
//!             GetMessage::Get,
//!             ContainerType::Enumeration,
//!             [Value::Integer(0), Value::Integer(2)],
//!         ),
//!     ),
//! );
//!
//! let device = DeviceIdentity::new(1, "Flatbed");
//! let values = transport
//!     .query_values(&device, ICAP_PIXELTYPE, GetMessage::Get, None, None)
//!     .unwrap();
//! assert_eq!(values.len(), 2);
//! assert_eq!(transport.value_queries(ICAP_PIXELTYPE), 1);
//! ```

pub mod error;
pub mod scripted;
pub mod transport;

pub use error::{ConditionCode, TransportError, TransportResult};
pub use scripted::{DeviceScript, ScriptedCapability, ScriptedTransport, TransportCall};
pub use transport::{CapabilityMetadata, CapabilityTransport, DeviceIdentity, ErrorTransport};
