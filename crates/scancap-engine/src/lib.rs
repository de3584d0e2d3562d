//! Capability negotiation engine.
//!
//! This crate ties the device transport to the per-device negotiation
//! state:
//!
//! - [`CapabilityRegistry`] - what the attached device supports
//! - [`ValueCache`] - cached GET answers, minus an exclusion set
//! - [`ErrorHistory`] - bounded record of every negotiation attempt
//! - [`NegotiationEngine`] - the session object callers talk to
//!
//! # Example
//!
//! ```
//! use scancap_core::{ContainerType, DataType, Value, names::ICAP_CONTRAST};
//! use scancap_engine::NegotiationEngine;
//! use scancap_protocol::{GetMessage, GetOperation};
//! use scancap_transport::{DeviceIdentity, DeviceScript, ScriptedCapability, ScriptedTransport};
//!
//! let transport = ScriptedTransport::new().with_device(
//!     DeviceScript::new("Flatbed").with_capability(
//!         ScriptedCapability::new(ICAP_CONTRAST, DataType::Int16).with_answer(
//!             GetMessage::Get,
//!             ContainerType::Range,
//!             [0, 100, 25, 50, 50].map(Value::Integer),
//!         ),
//!     ),
//! );
//!
//! let mut engine = NegotiationEngine::new(transport);
//! engine.attach(DeviceIdentity::new(1, "Flatbed"));
//!
//! let steps = engine
//!     .get_values(ICAP_CONTRAST, GetOperation::get().with_expand_range(true))
//!     .unwrap();
//! assert_eq!(steps.len(), 5);
//! assert!(engine.is_value_supported(&Value::Integer(75), ICAP_CONTRAST));
//! ```

mod cache;
mod config;
mod engine;
mod error;
mod history;
mod registry;

pub use cache::ValueCache;
pub use config::{DEFAULT_CACHE_EXCLUSIONS, DEFAULT_HISTORY_CAPACITY, EngineConfig};
pub use engine::NegotiationEngine;
pub use error::{ConfigError, NegotiationError, NegotiationResultOf};
pub use history::ErrorHistory;
pub use registry::{CapabilityDescriptor, CapabilityRegistry};
