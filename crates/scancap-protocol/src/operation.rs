//! Operation descriptors.
//!
//! A [`GetOperation`] or [`SetOperation`] describes one negotiation request:
//! the message to send plus optional container-type and data-type hints
//! for the device. Descriptors are immutable once built; use
//! [`OperationBuilder`] or the `with_*` methods (which return a new value)
//! to vary them.
//!
//! Get and set descriptors are distinct types, so a read entry point can
//! never be handed a write descriptor. [`OperationDescriptor`] joins them
//! for records that must hold either.

use scancap_core::{ContainerType, DataType};
use serde::{Deserialize, Serialize};

use crate::message::{GetMessage, SetMessage};

/// Describes a get-style request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOperation {
    message: GetMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    container_type: Option<ContainerType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_type: Option<DataType>,
    #[serde(default)]
    expand_range: bool,
}

impl GetOperation {
    /// Creates a descriptor with no hints and no range expansion.
    pub fn new(message: GetMessage) -> Self {
        Self {
            message,
            container_type: None,
            data_type: None,
            expand_range: false,
        }
    }

    /// Plain MSG_GET.
    pub fn get() -> Self {
        Self::new(GetMessage::Get)
    }

    /// MSG_GETCURRENT.
    pub fn current() -> Self {
        Self::new(GetMessage::GetCurrent)
    }

    /// MSG_GETDEFAULT.
    pub fn default_value() -> Self {
        Self::new(GetMessage::GetDefault)
    }

    /// Returns a copy that expands range results into explicit lists.
    #[must_use]
    pub fn with_expand_range(mut self, expand: bool) -> Self {
        self.expand_range = expand;
        self
    }

    /// Returns a copy with a container-type hint.
    #[must_use]
    pub fn with_container_type(mut self, container_type: ContainerType) -> Self {
        self.container_type = Some(container_type);
        self
    }

    /// Returns a copy with a data-type hint.
    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn message(&self) -> GetMessage {
        self.message
    }

    pub fn container_type(&self) -> Option<ContainerType> {
        self.container_type
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    pub fn expand_range(&self) -> bool {
        self.expand_range
    }
}

/// Describes a set-style request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOperation {
    message: SetMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    container_type: Option<ContainerType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_type: Option<DataType>,
}

impl SetOperation {
    /// Creates a descriptor with no hints.
    pub fn new(message: SetMessage) -> Self {
        Self {
            message,
            container_type: None,
            data_type: None,
        }
    }

    /// MSG_SET.
    pub fn set() -> Self {
        Self::new(SetMessage::Set)
    }

    /// MSG_RESET.
    pub fn reset() -> Self {
        Self::new(SetMessage::Reset)
    }

    /// MSG_RESETALL.
    pub fn reset_all() -> Self {
        Self::new(SetMessage::ResetAll)
    }

    /// MSG_SETCONSTRAINT.
    pub fn set_constraint() -> Self {
        Self::new(SetMessage::SetConstraint)
    }

    /// Returns a copy carrying a different message and the same hints.
    #[must_use]
    pub fn with_message(mut self, message: SetMessage) -> Self {
        self.message = message;
        self
    }

    /// Returns a copy with a container-type hint.
    #[must_use]
    pub fn with_container_type(mut self, container_type: ContainerType) -> Self {
        self.container_type = Some(container_type);
        self
    }

    /// Returns a copy with a data-type hint.
    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn message(&self) -> SetMessage {
        self.message
    }

    pub fn container_type(&self) -> Option<ContainerType> {
        self.container_type
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }
}

/// Whether a descriptor reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Get,
    Set,
}

/// Either kind of descriptor, as echoed in result records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationDescriptor {
    Get(GetOperation),
    Set(SetOperation),
}

impl OperationDescriptor {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Get(_) => OperationKind::Get,
            Self::Set(_) => OperationKind::Set,
        }
    }

    /// Native MSG_* code of the message.
    pub fn message_code(&self) -> u16 {
        match self {
            Self::Get(op) => op.message().code(),
            Self::Set(op) => op.message().code(),
        }
    }

    pub fn container_type_override(&self) -> Option<ContainerType> {
        match self {
            Self::Get(op) => op.container_type(),
            Self::Set(op) => op.container_type(),
        }
    }

    pub fn data_type_override(&self) -> Option<DataType> {
        match self {
            Self::Get(op) => op.data_type(),
            Self::Set(op) => op.data_type(),
        }
    }

    /// Range expansion flag; always false for set descriptors.
    pub fn expand_range(&self) -> bool {
        match self {
            Self::Get(op) => op.expand_range(),
            Self::Set(_) => false,
        }
    }
}

impl From<GetOperation> for OperationDescriptor {
    fn from(op: GetOperation) -> Self {
        Self::Get(op)
    }
}

impl From<SetOperation> for OperationDescriptor {
    fn from(op: SetOperation) -> Self {
        Self::Set(op)
    }
}

/// Collects hints, then produces a get or set descriptor.
///
/// ```
/// use scancap_core::{ContainerType, DataType};
/// use scancap_protocol::{GetMessage, OperationBuilder};
///
/// let op = OperationBuilder::new()
///     .with_container_type(ContainerType::Range)
///     .with_data_type(DataType::Fix32)
///     .with_expand_range(true)
///     .get(GetMessage::Get);
/// assert!(op.expand_range());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationBuilder {
    container_type: Option<ContainerType>,
    data_type: Option<DataType>,
    expand_range: bool,
}

impl OperationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set container-type hint.
    pub fn with_container_type(mut self, container_type: ContainerType) -> Self {
        self.container_type = Some(container_type);
        self
    }

    /// Builder: set data-type hint.
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Builder: expand range results (get descriptors only).
    pub fn with_expand_range(mut self, expand: bool) -> Self {
        self.expand_range = expand;
        self
    }

    /// Builds a get descriptor.
    pub fn get(self, message: GetMessage) -> GetOperation {
        GetOperation {
            message,
            container_type: self.container_type,
            data_type: self.data_type,
            expand_range: self.expand_range,
        }
    }

    /// Builds a set descriptor. The range expansion flag does not apply.
    pub fn set(self, message: SetMessage) -> SetOperation {
        SetOperation {
            message,
            container_type: self.container_type,
            data_type: self.data_type,
        }
    }
}
