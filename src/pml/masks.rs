//! Names for the bit masks and small enumerations found in detail regions.
//!
//! Masks render as the names of the bits they contain, largest composite
//! first; bits with no name are dropped from the label.

use strum::{FromRepr, IntoStaticStr};

use super::consts::UNKNOWN_OPERATION as UNKNOWN;

fn named_bits(mut mask: u32, names: &[(u32, &'static str)], separator: &str) -> String {
    let mut parts = Vec::new();
    for &(bits, name) in names {
        if mask & bits == bits {
            parts.push(name);
            mask &= !bits;
        }
    }
    parts.join(separator)
}

/// Expands GENERIC_READ/WRITE/EXECUTE/ALL into the object-specific rights.
fn apply_generic_mapping(mut mask: u32, mapping: [u32; 4]) -> u32 {
    const GENERIC: [u32; 4] = [0x8000_0000, 0x4000_0000, 0x2000_0000, 0x1000_0000];
    for (generic, specific) in GENERIC.into_iter().zip(mapping) {
        if mask & generic != 0 {
            mask |= specific;
        }
    }
    mask
}

const FILE_ACCESS: &[(u32, &str)] = &[
    (0x1f01ff, "All Access"),
    (0x1201bf, "Generic Read/Write/Execute"),
    (0x12019f, "Generic Read/Write"),
    (0x1200a9, "Generic Read/Execute"),
    (0x1201b6, "Generic Write/Execute"),
    (0x120089, "Generic Read"),
    (0x120116, "Generic Write"),
    (0x1200a0, "Generic Execute"),
    (0x1, "Read Data/List Directory"),
    (0x2, "Write Data/Add File"),
    (0x4, "Append Data/Add Subdirectory/Create Pipe Instance"),
    (0x8, "Read EA"),
    (0x10, "Write EA"),
    (0x20, "Execute/Traverse"),
    (0x40, "Delete Child"),
    (0x80, "Read Attributes"),
    (0x100, "Write Attributes"),
    (0x10000, "Delete"),
    (0x20000, "Read Control"),
    (0x40000, "Write DAC"),
    (0x80000, "Write Owner"),
    (0x100000, "Synchronize"),
    (0x1000000, "Access System Security"),
    (0x2000000, "Maximum Allowed"),
];

const REGISTRY_ACCESS: &[(u32, &str)] = &[
    (0xf003f, "All Access"),
    (0x2001f, "Read/Write"),
    (0x20019, "Read"),
    (0x20006, "Write"),
    (0x1, "Query Value"),
    (0x2, "Set Value"),
    (0x4, "Create Sub Key"),
    (0x8, "Enumerate Sub Keys"),
    (0x10, "Notify"),
    (0x20, "Create Link"),
    (0x300, "WOW64_Res"),
    (0x200, "WOW64_32Key"),
    (0x100, "WOW64_64Key"),
    (0x10000, "Delete"),
    (0x20000, "Read Control"),
    (0x40000, "Write DAC"),
    (0x80000, "Write Owner"),
    (0x100000, "Synchronize"),
    (0x1000000, "Access System Security"),
    (0x2000000, "Maximum Allowed"),
];

/// Access rights bit asking the object manager for the maximum it can grant.
pub const MAXIMUM_ALLOWED: u32 = 0x0200_0000;

fn access_or_raw(mask: u32, names: &[(u32, &'static str)]) -> String {
    let text = named_bits(mask, names, ", ");
    if text.is_empty() {
        format!("None 0x{mask:x}")
    } else {
        text
    }
}

pub fn file_access_mask(mask: u32) -> String {
    let mask = apply_generic_mapping(mask, [0x120089, 0x120116, 0x1200a0, 0x1f01ff]);
    access_or_raw(mask, FILE_ACCESS)
}

pub fn registry_access_mask(mask: u32) -> String {
    let mask = apply_generic_mapping(mask, [0x20019, 0x20006, 0x20019, 0xf003f]);
    access_or_raw(mask, REGISTRY_ACCESS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, IntoStaticStr)]
#[repr(u32)]
pub enum CreateDisposition {
    Supersede = 0,
    Open = 1,
    Create = 2,
    OpenIf = 3,
    Overwrite = 4,
    OverwriteIf = 5,
}

impl CreateDisposition {
    /// Dispositions that may create the file, and so report an allocation size.
    pub fn may_create(self) -> bool {
        matches!(
            self,
            Self::Supersede | Self::Create | Self::OpenIf | Self::OverwriteIf
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, IntoStaticStr)]
#[repr(u32)]
pub enum OpenResult {
    Superseded = 0,
    Opened = 1,
    Created = 2,
    Overwritten = 3,
    Exists = 4,
    DoesNotExist = 5,
}

const CREATE_OPTIONS: &[(u32, &str)] = &[
    (0x1, "Directory"),
    (0x2, "Write Through"),
    (0x4, "Sequential Access"),
    (0x8, "No Buffering"),
    (0x10, "Synchronous IO Alert"),
    (0x20, "Synchronous IO Non-Alert"),
    (0x40, "Non-Directory File"),
    (0x80, "Create Tree Connection"),
    (0x100, "Complete If Oplocked"),
    (0x200, "No EA Knowledge"),
    (0x400, "Open for Recovery"),
    (0x800, "Random Access"),
    (0x1000, "Delete On Close"),
    (0x2000, "Open By ID"),
    (0x4000, "Open For Backup"),
    (0x8000, "No Compression"),
    (0x10000, "Open Requiring Oplock"),
    (0x20000, "Disallow Exclusive"),
    (0x100000, "Reserve OpFilter"),
    (0x200000, "Open Reparse Point"),
    (0x400000, "Open No Recall"),
    (0x800000, "Open For Free Space Query"),
];

pub fn create_options(mask: u32) -> String {
    named_bits(mask, CREATE_OPTIONS, ", ")
}

const FILE_ATTRIBUTES: &[(u32, &str)] = &[
    (0x1, "R"),
    (0x2, "H"),
    (0x4, "S"),
    (0x10, "D"),
    (0x20, "A"),
    (0x40, "DV"),
    (0x80, "N"),
    (0x100, "T"),
    (0x200, "SF"),
    (0x400, "RP"),
    (0x800, "C"),
    (0x1000, "O"),
    (0x2000, "NCI"),
    (0x4000, "E"),
    (0x10000, "V"),
];

pub fn file_attributes(mask: u32) -> String {
    if mask == 0 {
        return "n/a".to_owned();
    }
    named_bits(mask, FILE_ATTRIBUTES, "")
}

pub fn share_mode(mask: u32) -> String {
    if mask == 0 {
        return "None".to_owned();
    }
    named_bits(mask, &[(0x1, "Read"), (0x2, "Write"), (0x4, "Delete")], ", ")
}

const IO_FLAGS: &[(u32, &str)] = &[
    (0x1, "Non-cached"),
    (0x2, "Paging I/O"),
    (0x4, "Synchronous"),
    (0x40, "Synchronous Paging I/O"),
    (0x40_0000, "Write Through"),
];

/// Splits the packed flags/priority word of a read or write request.
///
/// A priority of 0 means no hint was given and yields `None`; values with
/// no name render in hex.
pub fn io_flags_and_priority(raw: u32) -> (String, Option<String>) {
    let flags = named_bits(raw & 0x00e0_00ff, IO_FLAGS, ", ");
    let priority = match (raw >> 17) & 0x7 {
        0 => None,
        1 => Some("Very Low".to_owned()),
        2 => Some("Low".to_owned()),
        3 => Some("Normal".to_owned()),
        4 => Some("High".to_owned()),
        5 => Some("Critical".to_owned()),
        other => Some(format!("0x{other:x}")),
    };
    (flags, priority)
}

const NOTIFY_FILTER: &[(u32, &str)] = &[
    (0x1, "FILE_NOTIFY_CHANGE_FILE_NAME"),
    (0x2, "FILE_NOTIFY_CHANGE_DIR_NAME"),
    (0x4, "FILE_NOTIFY_CHANGE_ATTRIBUTES"),
    (0x8, "FILE_NOTIFY_CHANGE_SIZE"),
    (0x10, "FILE_NOTIFY_CHANGE_LAST_WRITE"),
    (0x20, "FILE_NOTIFY_CHANGE_LAST_ACCESS"),
    (0x40, "FILE_NOTIFY_CHANGE_CREATION"),
    (0x80, "FILE_NOTIFY_CHANGE_EA"),
    (0x100, "FILE_NOTIFY_CHANGE_SECURITY"),
    (0x200, "FILE_NOTIFY_CHANGE_STREAM_NAME"),
    (0x400, "FILE_NOTIFY_CHANGE_STREAM_SIZE"),
    (0x800, "FILE_NOTIFY_CHANGE_STREAM_WRITE"),
];

pub fn notify_filter(mask: u32) -> String {
    named_bits(mask, NOTIFY_FILTER, ", ")
}

pub fn sync_type(value: u32) -> &'static str {
    match value {
        0 => "SyncTypeOther",
        1 => "SyncTypeCreateSection",
        _ => UNKNOWN,
    }
}

pub fn page_protection(value: u32) -> String {
    let mut text = match value & 0xff {
        0x02 => "PAGE_READONLY".to_owned(),
        0x04 => "PAGE_READWRITE".to_owned(),
        0x08 => "PAGE_WRITECOPY".to_owned(),
        0x10 => "PAGE_EXECUTE".to_owned(),
        0x20 => "PAGE_EXECUTE_READ".to_owned(),
        0x40 => "PAGE_EXECUTE_READWRITE".to_owned(),
        _ => format!("0x{value:x}"),
    };
    if value & 0x200 != 0 {
        text.push_str("|PAGE_NOCACHE");
    }
    text
}

pub fn file_information_class(value: u32) -> String {
    let name = match value {
        1 => "FileDirectoryInformation",
        2 => "FileFullDirectoryInformation",
        3 => "FileBothDirectoryInformation",
        12 => "FileNamesInformation",
        37 => "FileIdBothDirectoryInformation",
        38 => "FileIdFullDirectoryInformation",
        60 => "FileIdExtdDirectoryInformation",
        63 => "FileIdExtdBothDirectoryInformation",
        _ => return value.to_string(),
    };
    name.to_owned()
}

pub fn registry_key_disposition(value: u32) -> &'static str {
    match value {
        1 => "REG_CREATED_NEW_KEY",
        2 => "REG_OPENED_EXISTING_KEY",
        _ => UNKNOWN,
    }
}
