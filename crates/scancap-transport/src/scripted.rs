//! In-memory transport driven by a script.
//!
//! [`ScriptedTransport`] answers from per-device [`DeviceScript`]s and logs
//! every call it receives, so callers can assert exactly how often the
//! device boundary was crossed. Sets update the scripted answers the way a
//! real device updates its state: SET replaces the current value, RESET
//! restores the default.

use std::collections::{BTreeMap, HashMap};

use scancap_core::{CapabilityId, ContainerType, DataType, SupportedOperations, Value};
use scancap_protocol::{GetMessage, SetMessage};
use tracing::trace;

use crate::error::{ConditionCode, TransportError, TransportResult};
use crate::transport::{CapabilityMetadata, CapabilityTransport, DeviceIdentity};

/// One call received by a [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    EnumerateSupported,
    EnumerateExtended,
    EnumerateExtImageInfo,
    Metadata(CapabilityId),
    ContainerType(CapabilityId, GetMessage),
    QueryValues(CapabilityId, GetMessage),
    SetValues(CapabilityId, SetMessage, Vec<Value>),
}

impl TransportCall {
    /// Returns the capability the call targeted, if any.
    pub fn capability(&self) -> Option<CapabilityId> {
        match self {
            Self::Metadata(id)
            | Self::ContainerType(id, _)
            | Self::QueryValues(id, _)
            | Self::SetValues(id, _, _) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Answer {
    container: ContainerType,
    values: Vec<Value>,
}

/// Scripted behavior of one capability.
#[derive(Debug, Clone)]
pub struct ScriptedCapability {
    id: CapabilityId,
    metadata: CapabilityMetadata,
    answers: HashMap<GetMessage, Answer>,
    failure: Option<ConditionCode>,
    metadata_failure: Option<ConditionCode>,
}

impl ScriptedCapability {
    /// Creates a capability supporting GET, GETCURRENT, GETDEFAULT, SET and
    /// RESET, named after the symbolic table when the id is known.
    pub fn new(id: CapabilityId, data_type: DataType) -> Self {
        let name = id
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("CAP_{:04X}", id.raw()));
        Self {
            id,
            metadata: CapabilityMetadata::new(
                name,
                SupportedOperations::GET
                    | SupportedOperations::GET_CURRENT
                    | SupportedOperations::GET_DEFAULT
                    | SupportedOperations::SET
                    | SupportedOperations::RESET,
                data_type,
            ),
            answers: HashMap::new(),
            failure: None,
            metadata_failure: None,
        }
    }

    /// Builder method to override the reported name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = name.into();
        self
    }

    /// Builder method to override the reported operations.
    pub fn with_operations(mut self, operations: SupportedOperations) -> Self {
        self.metadata.supported_operations = operations;
        self
    }

    /// Builder method to script the answer to one get message.
    pub fn with_answer(
        mut self,
        message: GetMessage,
        container: ContainerType,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.answers.insert(
            message,
            Answer {
                container,
                values: values.into_iter().collect(),
            },
        );
        self
    }

    /// Builder method to make every value query and set fail with `code`.
    pub fn with_failure(mut self, code: ConditionCode) -> Self {
        self.failure = Some(code);
        self
    }

    /// Builder method to make the metadata query fail with `code`.
    pub fn with_metadata_failure(mut self, code: ConditionCode) -> Self {
        self.metadata_failure = Some(code);
        self
    }

    pub fn id(&self) -> CapabilityId {
        self.id
    }

    /// Returns the values currently scripted for `message`.
    pub fn values(&self, message: GetMessage) -> Option<&[Value]> {
        self.answers.get(&message).map(|a| a.values.as_slice())
    }

    fn check_failure(&self) -> TransportResult<()> {
        match self.failure {
            Some(code) => Err(TransportError::new(
                code,
                format!("scripted failure for {}", self.id),
            )),
            None => Ok(()),
        }
    }

    fn answer(&self, message: GetMessage) -> TransportResult<&Answer> {
        self.answers.get(&message).ok_or_else(|| {
            TransportError::bad_operation(format!("{} does not answer {}", self.id, message))
        })
    }

    fn apply_reset(&mut self) {
        if let Some(default) = self.answers.get(&GetMessage::GetDefault).cloned() {
            self.answers.insert(GetMessage::GetCurrent, default);
        }
    }

    fn apply(&mut self, message: SetMessage, values: &[Value]) {
        match message {
            SetMessage::Set => {
                let container = self
                    .answers
                    .get(&GetMessage::GetCurrent)
                    .map(|a| a.container)
                    .unwrap_or(ContainerType::OneValue);
                self.answers.insert(
                    GetMessage::GetCurrent,
                    Answer {
                        container,
                        values: values.to_vec(),
                    },
                );
            }
            SetMessage::Reset | SetMessage::ResetAll => self.apply_reset(),
            SetMessage::SetConstraint => {
                if let Some(answer) = self.answers.get_mut(&GetMessage::Get) {
                    answer.values = values.to_vec();
                }
            }
        }
    }
}

/// Scripted contents of one device.
#[derive(Debug, Clone)]
pub struct DeviceScript {
    product_name: String,
    capabilities: BTreeMap<CapabilityId, ScriptedCapability>,
    extended: Vec<CapabilityId>,
    ext_image_info: Vec<CapabilityId>,
    enumeration_failure: Option<ConditionCode>,
}

impl DeviceScript {
    /// Creates an empty script for the device with this product name.
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            capabilities: BTreeMap::new(),
            extended: Vec::new(),
            ext_image_info: Vec::new(),
            enumeration_failure: None,
        }
    }

    /// Builder method to add a capability.
    pub fn with_capability(mut self, capability: ScriptedCapability) -> Self {
        self.capabilities.insert(capability.id, capability);
        self
    }

    /// Builder method to set the extended-capability list.
    pub fn with_extended(mut self, ids: impl IntoIterator<Item = CapabilityId>) -> Self {
        self.extended = ids.into_iter().collect();
        self
    }

    /// Builder method to set the supported extended-image-info list.
    pub fn with_ext_image_info(mut self, ids: impl IntoIterator<Item = CapabilityId>) -> Self {
        self.ext_image_info = ids.into_iter().collect();
        self
    }

    /// Builder method to make capability enumeration fail.
    pub fn with_enumeration_failure(mut self, code: ConditionCode) -> Self {
        self.enumeration_failure = Some(code);
        self
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Returns the scripted capability with this id.
    pub fn capability(&self, id: CapabilityId) -> Option<&ScriptedCapability> {
        self.capabilities.get(&id)
    }
}

/// A [`CapabilityTransport`] answering from in-memory scripts.
///
/// Devices are matched by product name.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    devices: HashMap<String, DeviceScript>,
    calls: Vec<TransportCall>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a device script.
    pub fn with_device(mut self, script: DeviceScript) -> Self {
        self.devices.insert(script.product_name.clone(), script);
        self
    }

    /// Returns the script for a device, reflecting any sets applied so far.
    pub fn device(&self, product_name: &str) -> Option<&DeviceScript> {
        self.devices.get(product_name)
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> &[TransportCall] {
        &self.calls
    }

    /// Number of calls matching `predicate`.
    pub fn count_where(&self, predicate: impl Fn(&TransportCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Number of value queries issued for `id`, across all messages.
    pub fn value_queries(&self, id: CapabilityId) -> usize {
        self.count_where(|call| matches!(call, TransportCall::QueryValues(c, _) if *c == id))
    }

    /// Number of calls of any kind that targeted `id`.
    pub fn calls_for(&self, id: CapabilityId) -> usize {
        self.count_where(|call| call.capability() == Some(id))
    }

    /// The most recent set call, if any.
    pub fn last_set(&self) -> Option<(CapabilityId, SetMessage, &[Value])> {
        self.calls.iter().rev().find_map(|call| match call {
            TransportCall::SetValues(id, message, values) => {
                Some((*id, *message, values.as_slice()))
            }
            _ => None,
        })
    }

    /// Forgets the recorded calls; scripts are kept.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: TransportCall) {
        trace!(?call, "scripted transport call");
        self.calls.push(call);
    }

    fn script(&self, device: &DeviceIdentity) -> TransportResult<&DeviceScript> {
        self.devices.get(&device.product_name).ok_or_else(|| {
            TransportError::new(ConditionCode::NO_DS, "no such device")
                .with_device(&device.product_name)
        })
    }

    fn script_mut(&mut self, device: &DeviceIdentity) -> TransportResult<&mut DeviceScript> {
        self.devices.get_mut(&device.product_name).ok_or_else(|| {
            TransportError::new(ConditionCode::NO_DS, "no such device")
                .with_device(&device.product_name)
        })
    }

    fn capability(
        &self,
        device: &DeviceIdentity,
        id: CapabilityId,
    ) -> TransportResult<&ScriptedCapability> {
        self.script(device)?.capabilities.get(&id).ok_or_else(|| {
            TransportError::cap_unsupported(format!("{} is not supported", id))
                .with_device(&device.product_name)
        })
    }
}

impl CapabilityTransport for ScriptedTransport {
    fn enumerate_supported_capabilities(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>> {
        self.record(TransportCall::EnumerateSupported);
        let script = self.script(device)?;
        if let Some(code) = script.enumeration_failure {
            return Err(TransportError::new(code, "enumeration failed")
                .with_device(&device.product_name));
        }
        Ok(script.capabilities.keys().copied().collect())
    }

    fn enumerate_extended_capabilities(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>> {
        self.record(TransportCall::EnumerateExtended);
        Ok(self.script(device)?.extended.clone())
    }

    fn enumerate_supported_ext_image_info(
        &mut self,
        device: &DeviceIdentity,
    ) -> TransportResult<Vec<CapabilityId>> {
        self.record(TransportCall::EnumerateExtImageInfo);
        Ok(self.script(device)?.ext_image_info.clone())
    }

    fn query_capability_metadata(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
    ) -> TransportResult<CapabilityMetadata> {
        self.record(TransportCall::Metadata(id));
        let capability = self.capability(device, id)?;
        if let Some(code) = capability.metadata_failure {
            return Err(TransportError::new(code, "metadata unavailable"));
        }
        Ok(capability.metadata.clone())
    }

    fn query_container_type(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
        message: GetMessage,
    ) -> TransportResult<ContainerType> {
        self.record(TransportCall::ContainerType(id, message));
        let capability = self.capability(device, id)?;
        Ok(capability.answer(message)?.container)
    }

    fn query_values(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
        message: GetMessage,
        _container_hint: Option<ContainerType>,
        _data_type_hint: Option<DataType>,
    ) -> TransportResult<Vec<Value>> {
        self.record(TransportCall::QueryValues(id, message));
        let capability = self.capability(device, id)?;
        capability.check_failure()?;
        Ok(capability.answer(message)?.values.clone())
    }

    fn set_values(
        &mut self,
        device: &DeviceIdentity,
        id: CapabilityId,
        message: SetMessage,
        values: &[Value],
    ) -> TransportResult<()> {
        self.record(TransportCall::SetValues(id, message, values.to_vec()));

        // reset-all is device-wide; the carrier id need not be scripted
        if message == SetMessage::ResetAll {
            for capability in self.script_mut(device)?.capabilities.values_mut() {
                capability.apply_reset();
            }
            return Ok(());
        }

        self.capability(device, id)?.check_failure()?;
        if let Some(capability) = self.script_mut(device)?.capabilities.get_mut(&id) {
            capability.apply(message, values);
        }
        Ok(())
    }
}
