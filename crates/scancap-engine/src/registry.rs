//! Per-device capability registry.
//!
//! [`CapabilityRegistry::attach`] performs the bulk enumeration round trip
//! once per device: supported ids, per-id metadata, extended ids and
//! extended-image-info items. Container types are filled in lazily, at most
//! once per capability and get variant.
//!
//! An empty registry (enumeration failed or the device reported nothing)
//! does not reject any capability id. Lookups then go straight to the
//! transport.

use std::collections::{BTreeMap, BTreeSet};

use scancap_core::names::{ext_image_info_data_type, ext_image_info_name};
use scancap_core::{CapabilityId, ContainerType, DataType, SupportedOperations};
use scancap_protocol::{ContainerVariant, GetMessage, SetMessage};
use scancap_transport::{CapabilityMetadata, CapabilityTransport, DeviceIdentity};
use tracing::{debug, warn};

/// What the registry knows about one capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub supported_operations: SupportedOperations,
    pub data_type: DataType,
    container_types: [Option<ContainerType>; ContainerVariant::COUNT],
}

impl CapabilityDescriptor {
    pub fn new(
        name: impl Into<String>,
        supported_operations: SupportedOperations,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            supported_operations,
            data_type,
            container_types: [None; ContainerVariant::COUNT],
        }
    }

    /// Descriptor for an extended-image-info item. These are read-only.
    pub fn ext_image_info(id: CapabilityId) -> Self {
        let name = ext_image_info_name(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("TWEI_{:04X}", id.raw()));
        let data_type = ext_image_info_data_type(id).unwrap_or(DataType::UInt32);
        Self::new(name, SupportedOperations::GET, data_type)
    }

    /// The container type already learned for `variant`, if any.
    pub fn container_type(&self, variant: ContainerVariant) -> Option<ContainerType> {
        self.container_types[variant.index()]
    }

    pub fn supports_get(&self, message: GetMessage) -> bool {
        self.supported_operations
            .contains(message.required_operation())
    }

    pub fn supports_set(&self, message: SetMessage) -> bool {
        self.supported_operations
            .contains(message.required_operation())
    }
}

impl From<CapabilityMetadata> for CapabilityDescriptor {
    fn from(meta: CapabilityMetadata) -> Self {
        Self::new(meta.name, meta.supported_operations, meta.data_type)
    }
}

/// Capabilities of the attached device.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    device: Option<DeviceIdentity>,
    capabilities: BTreeMap<CapabilityId, CapabilityDescriptor>,
    custom_ids: BTreeSet<CapabilityId>,
    extended_ids: BTreeSet<CapabilityId>,
    ext_image_info_ids: BTreeSet<CapabilityId>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any prior state with the capabilities of `device`.
    ///
    /// Returns false if the device reported no usable capabilities. The
    /// device stays attached in that case and the registry accepts any id.
    pub fn attach<T>(&mut self, transport: &mut T, device: DeviceIdentity) -> bool
    where
        T: CapabilityTransport + ?Sized,
    {
        self.detach();

        let supported = match transport.enumerate_supported_capabilities(&device) {
            Ok(ids) => ids,
            Err(err) => {
                warn!(device = %device, error = %err, "capability enumeration failed");
                self.device = Some(device);
                return false;
            }
        };

        for id in supported {
            match transport.query_capability_metadata(&device, id) {
                Ok(meta) => {
                    self.capabilities.insert(id, meta.into());
                }
                Err(err) => {
                    warn!(cap = %id, error = %err, "skipping capability without metadata");
                }
            }
        }

        if self.capabilities.is_empty() {
            warn!(device = %device, "device reported no capabilities");
            self.device = Some(device);
            return false;
        }

        match transport.enumerate_extended_capabilities(&device) {
            Ok(ids) => {
                self.extended_ids = ids
                    .into_iter()
                    .filter(|id| self.capabilities.contains_key(id))
                    .collect();
            }
            Err(err) => debug!(error = %err, "no extended capability list"),
        }

        match transport.enumerate_supported_ext_image_info(&device) {
            Ok(ids) => {
                for id in ids {
                    self.capabilities
                        .entry(id)
                        .or_insert_with(|| CapabilityDescriptor::ext_image_info(id));
                    self.ext_image_info_ids.insert(id);
                }
            }
            Err(err) => debug!(error = %err, "no extended image info list"),
        }

        self.custom_ids = self
            .capabilities
            .keys()
            .copied()
            .filter(|id| id.is_custom())
            .collect();

        debug!(
            device = %device,
            capabilities = self.capabilities.len(),
            custom = self.custom_ids.len(),
            extended = self.extended_ids.len(),
            ext_image_info = self.ext_image_info_ids.len(),
            "attached device"
        );
        self.device = Some(device);
        true
    }

    /// Forgets the device and everything learned about it.
    pub fn detach(&mut self) {
        if let Some(device) = self.device.take() {
            debug!(device = %device, "detached device");
        }
        self.capabilities.clear();
        self.custom_ids.clear();
        self.extended_ids.clear();
        self.ext_image_info_ids.clear();
    }

    pub fn device(&self) -> Option<&DeviceIdentity> {
        self.device.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.device.is_some()
    }

    /// True if the registry is empty or knows `id`.
    pub fn is_supported(&self, id: CapabilityId) -> bool {
        self.capabilities.is_empty() || self.capabilities.contains_key(&id)
    }

    /// True only if `id` has a descriptor.
    pub fn contains(&self, id: CapabilityId) -> bool {
        self.capabilities.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn descriptor(&self, id: CapabilityId) -> Option<&CapabilityDescriptor> {
        self.capabilities.get(&id)
    }

    /// Finds a capability by the name the device reported for it.
    pub fn find_by_name(&self, name: &str) -> Option<CapabilityId> {
        self.capabilities
            .iter()
            .find(|(_, descriptor)| descriptor.name == name)
            .map(|(id, _)| *id)
    }

    /// All known ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = CapabilityId> + '_ {
        self.capabilities.keys().copied()
    }

    pub fn custom_ids(&self) -> &BTreeSet<CapabilityId> {
        &self.custom_ids
    }

    pub fn extended_ids(&self) -> &BTreeSet<CapabilityId> {
        &self.extended_ids
    }

    pub fn extended_image_info_ids(&self) -> &BTreeSet<CapabilityId> {
        &self.ext_image_info_ids
    }

    /// Returns the container type the device uses for `variant`.
    ///
    /// A known slot is returned without a transport call. An unknown id in
    /// a non-empty registry, a missing device, or a failed query all yield
    /// [`ContainerType::Invalid`]; failures are not remembered.
    pub fn container_type<T>(
        &mut self,
        transport: &mut T,
        id: CapabilityId,
        variant: ContainerVariant,
    ) -> ContainerType
    where
        T: CapabilityTransport + ?Sized,
    {
        let Some(device) = self.device.as_ref() else {
            return ContainerType::Invalid;
        };

        if self.capabilities.is_empty() {
            return match transport.query_container_type(device, id, variant.message()) {
                Ok(container) => container,
                Err(err) => {
                    debug!(cap = %id, error = %err, "container type query failed");
                    ContainerType::Invalid
                }
            };
        }

        let Some(descriptor) = self.capabilities.get_mut(&id) else {
            return ContainerType::Invalid;
        };
        if let Some(known) = descriptor.container_types[variant.index()] {
            return known;
        }

        match transport.query_container_type(device, id, variant.message()) {
            Ok(container) => {
                debug!(cap = %id, ?variant, ?container, "learned container type");
                descriptor.container_types[variant.index()] = Some(container);
                container
            }
            Err(err) => {
                debug!(cap = %id, error = %err, "container type query failed");
                ContainerType::Invalid
            }
        }
    }
}
