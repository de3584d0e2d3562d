//! CapabilityTransport trait definition.
//!
//! This module defines the [`CapabilityTransport`] trait, the narrow
//! boundary between the negotiation engine and the device driver stack.
//! Every method is one blocking round trip to the device.

use std::fmt;

use scancap_core::{CapabilityId, ContainerType, DataType, SupportedOperations, Value};
use scancap_protocol::{GetMessage, SetMessage};
use serde::{Deserialize, Serialize};

use crate::error::{TransportError, TransportResult};

/// Identity of an attached device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Identifier assigned by the source manager.
    pub id: u32,
    /// Product name reported by the device.
    pub product_name: String,
    /// Manufacturer, if reported.
    #[serde(default)]
    pub manufacturer: Option<String>,
}

impl DeviceIdentity {
    /// Creates a new identity with the given id and product name.
    pub fn new(id: u32, product_name: impl Into<String>) -> Self {
        Self {
            id,
            product_name: product_name.into(),
            manufacturer: None,
        }
    }

    /// Builder method to set the manufacturer.
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.manufacturer {
            Some(ref maker) => write!(f, "{} {} (#{})", maker, self.product_name, self.id),
            None => write!(f, "{} (#{})", self.product_name, self.id),
        }
    }
}

/// Per-capability metadata reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityMetadata {
    pub name: String,
    pub supported_operations: SupportedOperations,
    pub data_type: DataType,
}

impl CapabilityMetadata {
    pub fn new(
        name: impl Into<String>,
        supported_operations: SupportedOperations,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            supported_operations,
            data_type,
        }
    }
}

/// The device boundary consumed by the negotiation engine.
///
/// Implementations wrap a driver stack (or a script, in tests). Calls are
/// synchronous and the engine never issues two at once for one device.
///
/// # Errors
///
/// Every method returns a [`TransportError`] carrying the native condition
/// code when the device refuses or fails the request.
pub trait CapabilityTransport {
    /// Lists every capability id the device supports.
    fn enumerate_supported_capabilities(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>>;

    /// Lists the capability ids the device allows to be negotiated after
    /// acquisition has started.
    fn enumerate_extended_capabilities(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>>;

    /// Lists the extended-image-info items the device can report.
    fn enumerate_supported_ext_image_info(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>>;

    /// Queries the name, supported operations and data type of one capability.
    fn query_capability_metadata(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
    ) -> TransportResult<CapabilityMetadata>;

    /// Queries the container shape the device uses to answer `message`.
    fn query_container_type(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
        message: GetMessage,
    ) -> TransportResult<ContainerType>;

    /// Queries the raw values of a capability.
    ///
    /// Range-shaped answers come back in their flat
    /// `[min, max, step, default, current]` encoding.
    fn query_values(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
        message: GetMessage,
        container_hint: Option<ContainerType>,
        data_type_hint: Option<DataType>,
    ) -> TransportResult<Vec<Value>>;

    /// Sends values (or a reset) for a capability.
    fn set_values(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
        message: SetMessage,
        values: &[Value],
    ) -> TransportResult<()>;
}

impl<T: CapabilityTransport + ?Sized> CapabilityTransport for Box<T> {
    fn enumerate_supported_capabilities(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>> {
        (**self).enumerate_supported_capabilities(device)
    }

    fn enumerate_extended_capabilities(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>> {
        (**self).enumerate_extended_capabilities(device)
    }

    fn enumerate_supported_ext_image_info(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>> {
        (**self).enumerate_supported_ext_image_info(device)
    }

    fn query_capability_metadata(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
    ) -> TransportResult<CapabilityMetadata> {
        (**self).query_capability_metadata(device, id)
    }

    fn query_container_type(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
        message: GetMessage,
    ) -> TransportResult<ContainerType> {
        (**self).query_container_type(device, id, message)
    }

    fn query_values(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
        message: GetMessage,
        container_hint: Option<ContainerType>,
        data_type_hint: Option<DataType>,
    ) -> TransportResult<Vec<Value>> {
        (**self).query_values(device, id, message, container_hint, data_type_hint)
    }

    fn set_values(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
        message: SetMessage,
        values: &[Value],
    ) -> TransportResult<()> {
        (**self).set_values(device, id, message, values)
    }
}

/// A transport that always fails with the same condition.
///
/// Useful as a placeholder when the driver stack failed to load.
#[derive(Debug)]
pub struct ErrorTransport {
    error: TransportError,
}

impl ErrorTransport {
    /// Creates a new error transport.
    pub fn new(error: TransportError) -> Self {
        Self { error }
    }

    fn fail<T>(&self, device: &DeviceIdentity) -> TransportResult<T> {
        Err(TransportError::new(self.error.code(), self.error.message())
            .with_device(&device.product_name))
    }
}

impl CapabilityTransport for ErrorTransport {
    fn enumerate_supported_capabilities(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>> {
        self.fail(device)
    }

    fn enumerate_extended_capabilities(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>> {
        self.fail(device)
    }

    fn enumerate_supported_ext_image_info(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>> {
        self.fail(device)
    }

    fn query_capability_metadata(
        &mut self,
        device: &DeviceIdentity,
        _id: CapabilityId,
    ) -> TransportResult<CapabilityMetadata> {
        self.fail(device)
    }

    fn query_container_type(
        &mut self,
        device: &DeviceIdentity,
        _id: CapabilityId,
        _message: GetMessage,
    ) -> TransportResult<ContainerType> {
        self.fail(device)
    }

    fn query_values(
        &mut self,
        device: &DeviceIdentity,
        _id: CapabilityId,
        _message: GetMessage,
        _container_hint: Option<ContainerType>,
        _data_type_hint: Option<DataType>,
    ) -> TransportResult<Vec<Value>> {
        self.fail(device)
    }

    fn set_values(
        &mut self,
        device: &DeviceIdentity,
        _id: CapabilityId,
        _message: SetMessage,
        _values: &[Value],
    ) -> TransportResult<()> {
        self.fail(device)
    }
}
