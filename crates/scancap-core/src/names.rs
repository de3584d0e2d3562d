//! Symbolic capability names.
//!
//! One table maps every standard capability id to its conventional
//! name. Extended-image-info items share the table at a synthetic id
//! (`TWEI id + EXT_IMAGE_INFO_NAME_OFFSET`) so they never collide with
//! capability ids.

use crate::capability::{CapabilityId, DataType};

/// Offset added to an extended-image-info id to find its name entry.
pub const EXT_IMAGE_INFO_NAME_OFFSET: u16 = 1000;

macro_rules! capability_table {
    ($($name:ident = $value:expr),* $(,)?) => {
        $(
            pub const $name: CapabilityId = CapabilityId::new($value);
        )*

        const CAPABILITIES: &[(CapabilityId, &str)] = &[
            $(($name, stringify!($name)),)*
        ];
    };
}

macro_rules! ext_image_info_table {
    ($($name:ident = $value:expr => $dt:ident),* $(,)?) => {
        $(
            pub const $name: CapabilityId = CapabilityId::new($value);
        )*

        const EXT_IMAGE_INFO: &[(CapabilityId, &str, DataType)] = &[
            $((
                CapabilityId::new($value + EXT_IMAGE_INFO_NAME_OFFSET),
                stringify!($name),
                DataType::$dt,
            ),)*
        ];
    };
}

capability_table! {
    CAP_XFERCOUNT = 0x0001,
    ICAP_COMPRESSION = 0x0100,
    ICAP_PIXELTYPE = 0x0101,
    ICAP_UNITS = 0x0102,
    ICAP_XFERMECH = 0x0103,
    CAP_AUTHOR = 0x1000,
    CAP_CAPTION = 0x1001,
    CAP_FEEDERENABLED = 0x1002,
    CAP_FEEDERLOADED = 0x1003,
    CAP_TIMEDATE = 0x1004,
    CAP_SUPPORTEDCAPS = 0x1005,
    CAP_EXTENDEDCAPS = 0x1006,
    CAP_AUTOFEED = 0x1007,
    CAP_CLEARPAGE = 0x1008,
    CAP_FEEDPAGE = 0x1009,
    CAP_REWINDPAGE = 0x100a,
    CAP_INDICATORS = 0x100b,
    CAP_PAPERDETECTABLE = 0x100d,
    CAP_UICONTROLLABLE = 0x100e,
    CAP_DEVICEONLINE = 0x100f,
    CAP_AUTOSCAN = 0x1010,
    CAP_THUMBNAILSENABLED = 0x1011,
    CAP_DUPLEX = 0x1012,
    CAP_DUPLEXENABLED = 0x1013,
    CAP_ENABLEDSUIDSONLY = 0x1014,
    CAP_CUSTOMDSDATA = 0x1015,
    CAP_ENDORSER = 0x1016,
    CAP_JOBCONTROL = 0x1017,
    CAP_ALARMS = 0x1018,
    CAP_ALARMVOLUME = 0x1019,
    CAP_AUTOMATICCAPTURE = 0x101a,
    CAP_TIMEBEFOREFIRSTCAPTURE = 0x101b,
    CAP_TIMEBETWEENCAPTURES = 0x101c,
    CAP_MAXBATCHBUFFERS = 0x101e,
    CAP_DEVICETIMEDATE = 0x101f,
    CAP_POWERSUPPLY = 0x1020,
    CAP_CAMERAPREVIEWUI = 0x1021,
    CAP_DEVICEEVENT = 0x1022,
    CAP_SERIALNUMBER = 0x1024,
    CAP_PRINTER = 0x1026,
    CAP_PRINTERENABLED = 0x1027,
    CAP_PRINTERINDEX = 0x1028,
    CAP_PRINTERMODE = 0x1029,
    CAP_PRINTERSTRING = 0x102a,
    CAP_PRINTERSUFFIX = 0x102b,
    CAP_LANGUAGE = 0x102c,
    CAP_FEEDERALIGNMENT = 0x102d,
    CAP_FEEDERORDER = 0x102e,
    CAP_REACQUIREALLOWED = 0x1030,
    CAP_BATTERYMINUTES = 0x1032,
    CAP_BATTERYPERCENTAGE = 0x1033,
    ICAP_AUTOBRIGHT = 0x1100,
    ICAP_BRIGHTNESS = 0x1101,
    ICAP_CONTRAST = 0x1103,
    ICAP_CUSTHALFTONE = 0x1104,
    ICAP_EXPOSURETIME = 0x1105,
    ICAP_FILTER = 0x1106,
    ICAP_FLASHUSED = 0x1107,
    ICAP_GAMMA = 0x1108,
    ICAP_HALFTONES = 0x1109,
    ICAP_HIGHLIGHT = 0x110a,
    ICAP_IMAGEFILEFORMAT = 0x110c,
    ICAP_LAMPSTATE = 0x110d,
    ICAP_LIGHTSOURCE = 0x110e,
    ICAP_ORIENTATION = 0x1110,
    ICAP_PHYSICALWIDTH = 0x1111,
    ICAP_PHYSICALHEIGHT = 0x1112,
    ICAP_SHADOW = 0x1113,
    ICAP_FRAMES = 0x1114,
    ICAP_XNATIVERESOLUTION = 0x1116,
    ICAP_YNATIVERESOLUTION = 0x1117,
    ICAP_XRESOLUTION = 0x1118,
    ICAP_YRESOLUTION = 0x1119,
    ICAP_MAXFRAMES = 0x111a,
    ICAP_TILES = 0x111b,
    ICAP_BITORDER = 0x111c,
    ICAP_CCITTKFACTOR = 0x111d,
    ICAP_LIGHTPATH = 0x111e,
    ICAP_PIXELFLAVOR = 0x111f,
    ICAP_PLANARCHUNKY = 0x1120,
    ICAP_ROTATION = 0x1121,
    ICAP_SUPPORTEDSIZES = 0x1122,
    ICAP_THRESHOLD = 0x1123,
    ICAP_XSCALING = 0x1124,
    ICAP_YSCALING = 0x1125,
    ICAP_BITORDERCODES = 0x1126,
    ICAP_PIXELFLAVORCODES = 0x1127,
    ICAP_JPEGPIXELTYPE = 0x1128,
    ICAP_TIMEFILL = 0x112a,
    ICAP_BITDEPTH = 0x112b,
    ICAP_BITDEPTHREDUCTION = 0x112c,
    ICAP_UNDEFINEDIMAGESIZE = 0x112d,
    ICAP_IMAGEDATASET = 0x112e,
    ICAP_EXTIMAGEINFO = 0x112f,
    ICAP_MINIMUMHEIGHT = 0x1130,
    ICAP_MINIMUMWIDTH = 0x1131,
    ICAP_AUTODISCARDBLANKPAGES = 0x1134,
    ICAP_FLIPROTATION = 0x1136,
    ICAP_BARCODEDETECTIONENABLED = 0x1137,
    ICAP_SUPPORTEDBARCODETYPES = 0x1138,
    ICAP_BARCODEMAXSEARCHPRIORITIES = 0x1139,
    ICAP_BARCODESEARCHPRIORITIES = 0x113a,
    ICAP_BARCODESEARCHMODE = 0x113b,
    ICAP_BARCODEMAXRETRIES = 0x113c,
    ICAP_BARCODETIMEOUT = 0x113d,
    ICAP_ZOOMFACTOR = 0x113e,
    ICAP_PATCHCODEDETECTIONENABLED = 0x113f,
    ICAP_SUPPORTEDPATCHCODETYPES = 0x1140,
    ICAP_AUTOMATICBORDERDETECTION = 0x1150,
    ICAP_AUTOMATICDESKEW = 0x1151,
    ICAP_AUTOMATICROTATE = 0x1152,
    ICAP_JPEGQUALITY = 0x1153,
    ICAP_FEEDERTYPE = 0x1154,
    ICAP_ICCPROFILE = 0x1155,
    ICAP_AUTOSIZE = 0x1156,
}

ext_image_info_table! {
    TWEI_BARCODEX = 0x1200 => UInt32,
    TWEI_BARCODEY = 0x1201 => UInt32,
    TWEI_BARCODETEXT = 0x1202 => Str255,
    TWEI_BARCODETYPE = 0x1203 => UInt32,
    TWEI_DESHADETOP = 0x1204 => UInt32,
    TWEI_DESHADELEFT = 0x1205 => UInt32,
    TWEI_DESHADEHEIGHT = 0x1206 => UInt32,
    TWEI_DESHADEWIDTH = 0x1207 => UInt32,
    TWEI_DESHADESIZE = 0x1208 => UInt32,
    TWEI_SPECKLESREMOVED = 0x1209 => UInt32,
}

/// Returns the symbolic name stored at `id`.
///
/// Extended-image-info names live at their synthetic id; use
/// [`ext_image_info_name`] to look them up by their raw TWEI id.
pub fn name_of(id: CapabilityId) -> Option<&'static str> {
    CAPABILITIES
        .iter()
        .find(|(cap, _)| *cap == id)
        .map(|(_, name)| *name)
        .or_else(|| {
            EXT_IMAGE_INFO
                .iter()
                .find(|(synthetic, _, _)| *synthetic == id)
                .map(|(_, name, _)| *name)
        })
}

/// Looks up a capability id by symbolic name (case-sensitive).
pub fn id_from_name(name: &str) -> Option<CapabilityId> {
    CAPABILITIES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(cap, _)| *cap)
}

/// Returns the name of an extended-image-info item by its raw TWEI id.
pub fn ext_image_info_name(id: CapabilityId) -> Option<&'static str> {
    let synthetic = id.checked_offset(EXT_IMAGE_INFO_NAME_OFFSET)?;
    EXT_IMAGE_INFO
        .iter()
        .find(|(s, _, _)| *s == synthetic)
        .map(|(_, name, _)| *name)
}

/// Returns the item type of an extended-image-info item by its raw TWEI id.
pub fn ext_image_info_data_type(id: CapabilityId) -> Option<DataType> {
    let synthetic = id.checked_offset(EXT_IMAGE_INFO_NAME_OFFSET)?;
    EXT_IMAGE_INFO
        .iter()
        .find(|(s, _, _)| *s == synthetic)
        .map(|(_, _, dt)| *dt)
}

/// Iterates over every standard capability in the table.
pub fn standard_capabilities() -> impl Iterator<Item = (CapabilityId, &'static str)> {
    CAPABILITIES.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id_and_name() {
        assert_eq!(name_of(ICAP_PIXELTYPE), Some("ICAP_PIXELTYPE"));
        assert_eq!(id_from_name("CAP_DEVICEONLINE"), Some(CAP_DEVICEONLINE));
        assert_eq!(id_from_name("cap_deviceonline"), None);
        assert_eq!(name_of(CapabilityId::new(0x8001)), None);
    }

    #[test]
    fn ext_image_info_uses_synthetic_offset() {
        assert_eq!(ext_image_info_name(TWEI_BARCODETEXT), Some("TWEI_BARCODETEXT"));
        assert_eq!(
            name_of(CapabilityId::new(0x1202 + EXT_IMAGE_INFO_NAME_OFFSET)),
            Some("TWEI_BARCODETEXT")
        );
        // the raw TWEI id itself is not a named capability
        assert_eq!(name_of(TWEI_BARCODETEXT), None);
        assert_eq!(ext_image_info_data_type(TWEI_BARCODETEXT), Some(DataType::Str255));
        assert_eq!(ext_image_info_name(CapabilityId::new(0xffff)), None);
    }

    #[test]
    fn table_has_unique_ids_and_names() {
        let all: Vec<_> = standard_capabilities().collect();
        for (i, (id, name)) in all.iter().enumerate() {
            for (other_id, other_name) in &all[i + 1..] {
                assert_ne!(id, other_id, "duplicate id for {name}");
                assert_ne!(name, other_name);
            }
            assert!(!id.is_custom());
        }
    }
}
