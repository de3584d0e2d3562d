//! Core types: capability ids, values, ranges, tracing

pub mod capability;
pub mod names;
pub mod range;
pub mod tracing;
pub mod value;

pub use capability::{CUSTOM_BASE, CapabilityId, ContainerType, DataType, SupportedOperations};
pub use range::{
    RANGE_EPSILON, RANGE_TUPLE_LEN, RangeDescriptor, RangeDomain, RangeError, ValueRange,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use value::{Frame, Value};
