//! Get-style and set-style negotiation messages.

use std::fmt;

use scancap_core::SupportedOperations;
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// A read request for a capability's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GetMessage {
    /// All values the device will accept, plus the current one.
    Get,
    GetCurrent,
    GetDefault,
    GetHelp,
    GetLabelEnum,
}

impl GetMessage {
    /// Returns the native MSG_* code.
    pub fn code(self) -> u16 {
        match self {
            Self::Get => 0x0001,
            Self::GetCurrent => 0x0002,
            Self::GetDefault => 0x0003,
            Self::GetHelp => 0x0009,
            Self::GetLabelEnum => 0x000b,
        }
    }

    /// Decodes a native MSG_* code.
    pub fn from_code(code: u16) -> ProtocolResult<Self> {
        match code {
            0x0001 => Ok(Self::Get),
            0x0002 => Ok(Self::GetCurrent),
            0x0003 => Ok(Self::GetDefault),
            0x0009 => Ok(Self::GetHelp),
            0x000b => Ok(Self::GetLabelEnum),
            other => Err(ProtocolError::UnknownGetMessage(other)),
        }
    }

    /// The query-support bit a device reports for this message.
    pub fn required_operation(self) -> SupportedOperations {
        match self {
            Self::Get => SupportedOperations::GET,
            Self::GetCurrent => SupportedOperations::GET_CURRENT,
            Self::GetDefault => SupportedOperations::GET_DEFAULT,
            Self::GetHelp => SupportedOperations::GET_HELP,
            Self::GetLabelEnum => SupportedOperations::GET_LABEL_ENUM,
        }
    }

    /// The container-type cache slot for this message, if it has one.
    pub fn container_variant(self) -> Option<ContainerVariant> {
        match self {
            Self::Get => Some(ContainerVariant::Get),
            Self::GetCurrent => Some(ContainerVariant::GetCurrent),
            Self::GetDefault => Some(ContainerVariant::GetDefault),
            Self::GetHelp | Self::GetLabelEnum => None,
        }
    }
}

impl fmt::Display for GetMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "MSG_GET",
            Self::GetCurrent => "MSG_GETCURRENT",
            Self::GetDefault => "MSG_GETDEFAULT",
            Self::GetHelp => "MSG_GETHELP",
            Self::GetLabelEnum => "MSG_GETLABELENUM",
        })
    }
}

/// A write request for a capability's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetMessage {
    Set,
    /// Restore the capability's power-on default.
    Reset,
    /// Restore every capability's power-on default.
    ResetAll,
    SetConstraint,
}

impl SetMessage {
    /// Returns the native MSG_* code.
    pub fn code(self) -> u16 {
        match self {
            Self::Set => 0x0006,
            Self::Reset => 0x0007,
            Self::SetConstraint => 0x000c,
            Self::ResetAll => 0x0a01,
        }
    }

    /// Decodes a native MSG_* code.
    pub fn from_code(code: u16) -> ProtocolResult<Self> {
        match code {
            0x0006 => Ok(Self::Set),
            0x0007 => Ok(Self::Reset),
            0x000c => Ok(Self::SetConstraint),
            0x0a01 => Ok(Self::ResetAll),
            other => Err(ProtocolError::UnknownSetMessage(other)),
        }
    }

    /// The query-support bit a device reports for this message. Reset-all
    /// is a device-wide request and shares the reset bit.
    pub fn required_operation(self) -> SupportedOperations {
        match self {
            Self::Set => SupportedOperations::SET,
            Self::Reset | Self::ResetAll => SupportedOperations::RESET,
            Self::SetConstraint => SupportedOperations::SET_CONSTRAINT,
        }
    }
}

impl fmt::Display for SetMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Set => "MSG_SET",
            Self::Reset => "MSG_RESET",
            Self::ResetAll => "MSG_RESETALL",
            Self::SetConstraint => "MSG_SETCONSTRAINT",
        })
    }
}

/// The three get variants whose container type is cached per capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerVariant {
    Get,
    GetCurrent,
    GetDefault,
}

impl ContainerVariant {
    /// Number of variants, i.e. slots in a per-capability cache.
    pub const COUNT: usize = 3;

    /// Slot index in a per-capability cache.
    pub fn index(self) -> usize {
        match self {
            Self::Get => 0,
            Self::GetCurrent => 1,
            Self::GetDefault => 2,
        }
    }

    /// The message used to ask the device about this variant.
    pub fn message(self) -> GetMessage {
        match self {
            Self::Get => GetMessage::Get,
            Self::GetCurrent => GetMessage::GetCurrent,
            Self::GetDefault => GetMessage::GetDefault,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_message_codes() {
        for msg in [
            GetMessage::Get,
            GetMessage::GetCurrent,
            GetMessage::GetDefault,
            GetMessage::GetHelp,
            GetMessage::GetLabelEnum,
        ] {
            assert_eq!(GetMessage::from_code(msg.code()).unwrap(), msg);
        }
        assert!(matches!(
            GetMessage::from_code(0x0006),
            Err(ProtocolError::UnknownGetMessage(0x0006))
        ));
    }

    #[test]
    fn set_message_codes() {
        assert_eq!(SetMessage::ResetAll.code(), 0x0a01);
        assert_eq!(SetMessage::from_code(0x0007).unwrap(), SetMessage::Reset);
        assert!(SetMessage::from_code(0x0001).is_err());
    }

    #[test]
    fn container_variants() {
        assert_eq!(
            GetMessage::GetDefault.container_variant(),
            Some(ContainerVariant::GetDefault)
        );
        assert_eq!(GetMessage::GetHelp.container_variant(), None);
        assert_eq!(ContainerVariant::GetCurrent.index(), 1);
        assert_eq!(ContainerVariant::Get.message(), GetMessage::Get);
    }

    #[test]
    fn display_uses_native_names() {
        assert_eq!(GetMessage::GetCurrent.to_string(), "MSG_GETCURRENT");
        assert_eq!(SetMessage::SetConstraint.to_string(), "MSG_SETCONSTRAINT");
    }

    #[test]
    fn required_operations() {
        assert_eq!(
            GetMessage::GetLabelEnum.required_operation(),
            SupportedOperations::GET_LABEL_ENUM
        );
        assert_eq!(
            SetMessage::ResetAll.required_operation(),
            SupportedOperations::RESET
        );
    }
}
