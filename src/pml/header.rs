//! PML file header.

use super::bytes::ByteReader;
use super::error::{FormatError, Result};

pub const SIGNATURE: &[u8; 4] = b"PML_";
pub const HEADER_SIZE: usize = 0x3a8;
pub const SUPPORTED_VERSIONS: &[u32] = &[9];

/// Fixed-size header found at the start of every capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: [u8; 4],
    pub version: u32,
    /// Addresses in this capture are 8 bytes wide.
    pub is_64bit: bool,
    pub computer_name: String,
    pub system_root: String,
    pub number_of_events: u32,
    pub events_offset: u64,
    pub events_offsets_array_offset: u64,
    pub process_table_offset: u64,
    pub strings_table_offset: u64,
    pub unknown_table_offset: u64,
    pub windows_major_number: u32,
    pub windows_minor_number: u32,
    pub windows_build_number: u32,
    pub windows_build_number_after_decimal_point: u32,
    pub service_pack_name: String,
    pub number_of_logical_processors: u32,
    pub ram_memory_size: u64,
    pub header_size: u64,
    pub hosts_and_ports_tables_offset: u64,
}

impl FileHeader {
    /// Parses and validates the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let raw = data.get(..HEADER_SIZE).ok_or(FormatError::Truncated {
            what: "header",
            offset: 0,
        })?;
        let header = Self::read(&mut ByteReader::new(raw)).ok_or(FormatError::Truncated {
            what: "header",
            offset: 0,
        })?;
        header.validate()?;
        Ok(header)
    }

    fn read(r: &mut ByteReader<'_>) -> Option<Self> {
        let signature: [u8; 4] = r.array().ok()?;
        let version = r.u32().ok()?;
        let is_64bit = r.u32().ok()? != 0;
        let computer_name = r.utf16(0x20).ok()?;
        let system_root = r.utf16(0x208).ok()?;
        let number_of_events = r.u32().ok()?;
        r.skip(8).ok()?;
        let events_offset = r.u64().ok()?;
        let events_offsets_array_offset = r.u64().ok()?;
        let process_table_offset = r.u64().ok()?;
        let strings_table_offset = r.u64().ok()?;
        let unknown_table_offset = r.u64().ok()?;
        r.skip(12).ok()?;
        let windows_major_number = r.u32().ok()?;
        let windows_minor_number = r.u32().ok()?;
        let windows_build_number = r.u32().ok()?;
        let windows_build_number_after_decimal_point = r.u32().ok()?;
        let service_pack_name = r.utf16(0x32).ok()?;
        r.skip(0xd6).ok()?;
        let number_of_logical_processors = r.u32().ok()?;
        let ram_memory_size = r.u64().ok()?;
        let header_size = r.u64().ok()?;
        let hosts_and_ports_tables_offset = r.u64().ok()?;

        Some(Self {
            signature,
            version,
            is_64bit,
            computer_name,
            system_root,
            number_of_events,
            events_offset,
            events_offsets_array_offset,
            process_table_offset,
            strings_table_offset,
            unknown_table_offset,
            windows_major_number,
            windows_minor_number,
            windows_build_number,
            windows_build_number_after_decimal_point,
            service_pack_name,
            number_of_logical_processors,
            ram_memory_size,
            header_size,
            hosts_and_ports_tables_offset,
        })
    }

    fn validate(&self) -> std::result::Result<(), FormatError> {
        if &self.signature != SIGNATURE {
            return Err(FormatError::BadSignature(self.signature));
        }
        if !SUPPORTED_VERSIONS.contains(&self.version) {
            return Err(FormatError::UnsupportedVersion(self.version));
        }
        if self.events_offset != self.header_size {
            return Err(FormatError::EventsOffsetMismatch {
                events_offset: self.events_offset,
                header_size: self.header_size,
            });
        }
        let regions = [
            ("event offsets array", self.events_offsets_array_offset),
            ("process table", self.process_table_offset),
            ("strings table", self.strings_table_offset),
            ("unknown table", self.unknown_table_offset),
            ("hosts and ports tables", self.hosts_and_ports_tables_offset),
        ];
        if let Some(&(region, _)) = regions.iter().find(|(_, offset)| *offset == 0) {
            return Err(FormatError::NotClosedCleanly { region });
        }
        Ok(())
    }

    pub fn pointer_size(&self) -> usize {
        if self.is_64bit { 8 } else { 4 }
    }
}
