//! Capability identifiers, data types, container shapes and the
//! supported-operations bitmask.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::names;

/// First vendor-defined capability id. Ids at or above this are custom.
pub const CUSTOM_BASE: u16 = 0x8000;

/// Numeric identifier of a device capability.
///
/// Serializes as its raw number. Deserializes from either a number or a
/// symbolic name from the [`names`] table (`"ICAP_XRESOLUTION"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CapabilityId(u16);

impl CapabilityId {
    /// Creates an id from its raw value.
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns true for vendor-defined ids (`>= CUSTOM_BASE`).
    pub const fn is_custom(self) -> bool {
        self.0 >= CUSTOM_BASE
    }

    /// Returns the id shifted by `offset`, or `None` on overflow.
    pub fn checked_offset(self, offset: u16) -> Option<Self> {
        self.0.checked_add(offset).map(Self)
    }

    /// Returns the symbolic name of this id, if it is a known standard id.
    pub fn name(self) -> Option<&'static str> {
        names::name_of(self)
    }
}

impl From<u16> for CapabilityId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({:#06x})", name, self.0),
            None => write!(f, "{:#06x}", self.0),
        }
    }
}

impl<'de> Deserialize<'de> for CapabilityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de;

        struct IdOrName;

        impl de::Visitor<'_> for IdOrName {
            type Value = CapabilityId;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a capability id number or a symbolic capability name")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<CapabilityId, E> {
                u16::try_from(value)
                    .map(CapabilityId)
                    .map_err(|_| E::custom(format!("capability id out of range: {value}")))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<CapabilityId, E> {
                u16::try_from(value)
                    .map(CapabilityId)
                    .map_err(|_| E::custom(format!("capability id out of range: {value}")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<CapabilityId, E> {
                names::id_from_name(value)
                    .ok_or_else(|| E::custom(format!("unknown capability name: {value}")))
            }
        }

        deserializer.deserialize_any(IdOrName)
    }
}

/// Declared item type of a capability (TWTY_* codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    UInt8,
    UInt16,
    UInt32,
    Bool,
    /// Fixed-point 16.16 value, exposed as a float.
    Fix32,
    Frame,
    Str32,
    Str64,
    Str128,
    Str255,
    Str1024,
    Uni512,
}

impl DataType {
    /// Returns the native TWTY_* code.
    pub fn code(self) -> u16 {
        match self {
            Self::Int8 => 0x0000,
            Self::Int16 => 0x0001,
            Self::Int32 => 0x0002,
            Self::UInt8 => 0x0003,
            Self::UInt16 => 0x0004,
            Self::UInt32 => 0x0005,
            Self::Bool => 0x0006,
            Self::Fix32 => 0x0007,
            Self::Frame => 0x0008,
            Self::Str32 => 0x0009,
            Self::Str64 => 0x000a,
            Self::Str128 => 0x000b,
            Self::Str255 => 0x000c,
            Self::Str1024 => 0x000d,
            Self::Uni512 => 0x000e,
        }
    }

    /// Decodes a native TWTY_* code.
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0x0000 => Self::Int8,
            0x0001 => Self::Int16,
            0x0002 => Self::Int32,
            0x0003 => Self::UInt8,
            0x0004 => Self::UInt16,
            0x0005 => Self::UInt32,
            0x0006 => Self::Bool,
            0x0007 => Self::Fix32,
            0x0008 => Self::Frame,
            0x0009 => Self::Str32,
            0x000a => Self::Str64,
            0x000b => Self::Str128,
            0x000c => Self::Str255,
            0x000d => Self::Str1024,
            0x000e => Self::Uni512,
            _ => return None,
        })
    }

    /// Returns true for the integer item types.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::UInt8 | Self::UInt16 | Self::UInt32
        )
    }

    /// Returns true for the string item types.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            Self::Str32 | Self::Str64 | Self::Str128 | Self::Str255 | Self::Str1024 | Self::Uni512
        )
    }
}

/// Shape of a capability's value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    OneValue,
    Enumeration,
    Array,
    Range,
    /// The capability is unknown or the device refused to report a shape.
    Invalid,
    /// Let the device pick its preferred shape.
    #[default]
    Default,
}

impl ContainerType {
    /// Returns the native TWON_* code. `Invalid` and `Default` have no
    /// native counterpart and map to 0.
    pub fn code(self) -> u16 {
        match self {
            Self::Array => 0x0003,
            Self::Enumeration => 0x0004,
            Self::OneValue => 0x0005,
            Self::Range => 0x0006,
            Self::Invalid | Self::Default => 0x0000,
        }
    }

    /// Decodes a native TWON_* code.
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0x0003 => Self::Array,
            0x0004 => Self::Enumeration,
            0x0005 => Self::OneValue,
            0x0006 => Self::Range,
            _ => return None,
        })
    }
}

bitflags! {
    /// Operations a device reports as supported for a capability (TWQC_* bits).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SupportedOperations: u32 {
        const GET = 0x0001;
        const SET = 0x0002;
        const GET_DEFAULT = 0x0004;
        const GET_CURRENT = 0x0008;
        const RESET = 0x0010;
        const SET_CONSTRAINT = 0x0020;
        const CONSTRAINABLE = 0x0040;
        const GET_HELP = 0x0100;
        const GET_LABEL = 0x0200;
        const GET_LABEL_ENUM = 0x0400;
    }
}
