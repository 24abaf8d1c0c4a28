//! [`PmlReader`]: one opened capture with its tables loaded.
//!
//! Opening validates the header and loads the string, process, host, port
//! and event offset tables. Events are decoded on demand; each decode is a
//! pure function of the immutable capture bytes and those tables, so a
//! reader can be shared between threads and any index decoded any number
//! of times.

use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use memmap2::Mmap;
use serde::Serialize;

use super::error::{Error, Result};
use super::event::{DecodeOptions, DecodeTables, Event, decode_event};
use super::header::FileHeader;
use super::model::Process;
use super::tables::{
    EventOffsetIndex, HostTable, PortTable, ProcessTable, StringTable, parse_hosts_and_ports,
};

/// What to decode for each event. Both default to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Materialize the return addresses of each event.
    pub stacktrace: bool,
    /// Decode the operation-specific detail map and category.
    pub details: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            stacktrace: true,
            details: true,
        }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stacktrace(mut self, enabled: bool) -> Self {
        self.stacktrace = enabled;
        self
    }

    pub fn details(mut self, enabled: bool) -> Self {
        self.details = enabled;
        self
    }
}

enum Source {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Source {
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Mapped(map) => map.as_ref(),
            Self::Owned(data) => data.as_slice(),
        }
    }
}

/// The machine a capture was recorded on, as Process Monitor's System
/// Details dialog shows it. Serializes in dialog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemDetails {
    #[serde(rename = "Computer Name")]
    pub computer_name: String,
    #[serde(rename = "Operating System")]
    pub operating_system: String,
    #[serde(rename = "System Root")]
    pub system_root: String,
    #[serde(rename = "Logical Processors")]
    pub logical_processors: u32,
    #[serde(rename = "Memory (RAM)")]
    pub memory: String,
    #[serde(rename = "System Type")]
    pub system_type: String,
}

impl SystemDetails {
    fn from_header(header: &FileHeader) -> Self {
        Self {
            computer_name: header.computer_name.clone(),
            operating_system: operating_system(header),
            system_root: header.system_root.clone(),
            logical_processors: header.number_of_logical_processors,
            memory: memory_size(header.ram_memory_size),
            system_type: if header.is_64bit { "64-bit" } else { "32-bit" }.to_owned(),
        }
    }

    /// `(label, value)` pairs in dialog order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Computer Name", self.computer_name.clone()),
            ("Operating System", self.operating_system.clone()),
            ("System Root", self.system_root.clone()),
            ("Logical Processors", self.logical_processors.to_string()),
            ("Memory (RAM)", self.memory.clone()),
            ("System Type", self.system_type.clone()),
        ]
    }
}

fn operating_system(header: &FileHeader) -> String {
    let mut name = match (header.windows_major_number, header.windows_minor_number) {
        (6, 0) => "Windows Vista".to_owned(),
        (6, 1) => "Windows 7".to_owned(),
        (6, 2) => "Windows 8".to_owned(),
        (6, 3) => "Windows 8.1".to_owned(),
        (10, 0) => "Windows 10".to_owned(),
        (major, minor) => format!("Windows {major}.{minor}"),
    };
    if !header.service_pack_name.is_empty() {
        name.push_str(", ");
        name.push_str(&header.service_pack_name);
    }
    format!(
        "{name} (build {}.{})",
        header.windows_build_number, header.windows_build_number_after_decimal_point
    )
}

/// Gigabytes truncated to two decimals.
fn memory_size(bytes: u64) -> String {
    let gigabytes = bytes as f64 / (1024.0 * 1024.0 * 1024.0);
    format!("{:?} GB", (gigabytes * 100.0).floor() / 100.0)
}

/// An opened PML capture.
pub struct PmlReader {
    source: Source,
    header: FileHeader,
    strings: StringTable,
    processes: ProcessTable,
    hosts: HostTable,
    ports: PortTable,
    offsets: EventOffsetIndex,
    options: ReaderOptions,
}

impl PmlReader {
    /// Memory-maps the capture at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // SAFETY: the mapping is only read; the file must not shrink while mapped.
        let map = unsafe { Mmap::map(&file) }?;
        debug!("mapped {} ({} bytes)", path.display(), map.len());
        Self::load(Source::Mapped(map))
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::load(Source::Owned(data))
    }

    /// Reads the whole of `reader` into memory.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    fn load(source: Source) -> Result<Self> {
        let data = source.bytes();
        let header = FileHeader::parse(data)?;
        debug!(
            "PML v{} {}-bit capture of {} with {} events",
            header.version,
            if header.is_64bit { 64 } else { 32 },
            header.computer_name,
            header.number_of_events
        );

        let strings = StringTable::parse(data, header.strings_table_offset)?;
        let processes = ProcessTable::parse(
            data,
            header.process_table_offset,
            header.is_64bit,
            &strings,
        )?;
        let (hosts, ports) = parse_hosts_and_ports(data, header.hosts_and_ports_tables_offset)?;
        let offsets = EventOffsetIndex::parse(
            data,
            header.events_offsets_array_offset,
            header.number_of_events,
        )?;
        debug!(
            "loaded {} strings, {} processes, {} hosts, {} ports",
            strings.len(),
            processes.len(),
            hosts.len(),
            ports.len()
        );

        Ok(Self {
            source,
            header,
            strings,
            processes,
            hosts,
            ports,
            offsets,
            options: ReaderOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn event_offsets(&self) -> &EventOffsetIndex {
        &self.offsets
    }

    /// Number of events, as declared by the header.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the event whose envelope starts at absolute `offset`.
    pub fn event_at_offset(&self, offset: u64) -> Result<Event> {
        let tables = DecodeTables {
            is_64bit: self.header.is_64bit,
            processes: &self.processes,
            hosts: &self.hosts,
            ports: &self.ports,
        };
        let options = DecodeOptions {
            stacktrace: self.options.stacktrace,
            details: self.options.details,
        };
        Ok(decode_event(self.source.bytes(), offset, &tables, options)?)
    }

    pub fn get(&self, index: usize) -> Result<Event> {
        let offset = self.offsets.get(index).ok_or(Error::OutOfRange {
            index,
            len: self.len(),
        })?;
        self.event_at_offset(offset)
    }

    /// Decodes events `range.start..range.end`; the whole range must lie
    /// inside the capture.
    pub fn slice(&self, range: Range<usize>) -> Result<Vec<Event>> {
        let len = self.len();
        if range.start > range.end || range.end > len {
            return Err(Error::OutOfRange {
                index: range.end.max(range.start),
                len,
            });
        }
        range.map(|index| self.get(index)).collect()
    }

    /// All events in index order.
    pub fn iter(&self) -> Events<'_> {
        Events {
            reader: self,
            range: 0..self.len(),
        }
    }

    /// All processes, ordered by process index.
    pub fn processes(&self) -> impl Iterator<Item = &Arc<Process>> {
        self.processes.iter()
    }

    pub fn system_details(&self) -> SystemDetails {
        SystemDetails::from_header(&self.header)
    }
}

impl<'r> IntoIterator for &'r PmlReader {
    type Item = Result<Event>;
    type IntoIter = Events<'r>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy, restartable iteration over a reader's events.
pub struct Events<'r> {
    reader: &'r PmlReader,
    range: Range<usize>,
}

impl Iterator for Events<'_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|index| self.reader.get(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.range.nth(n).map(|index| self.reader.get(index))
    }
}

impl DoubleEndedIterator for Events<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(|index| self.reader.get(index))
    }
}

impl ExactSizeIterator for Events<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(major: u32, minor: u32, service_pack: &str) -> FileHeader {
        FileHeader {
            signature: *b"PML_",
            version: 9,
            is_64bit: true,
            computer_name: "WORKSTATION".into(),
            system_root: "C:\\Windows".into(),
            number_of_events: 0,
            events_offset: 0x3a8,
            events_offsets_array_offset: 1,
            process_table_offset: 1,
            strings_table_offset: 1,
            unknown_table_offset: 1,
            windows_major_number: major,
            windows_minor_number: minor,
            windows_build_number: 19041,
            windows_build_number_after_decimal_point: 1,
            service_pack_name: service_pack.into(),
            number_of_logical_processors: 8,
            ram_memory_size: 17_112_760_320,
            header_size: 0x3a8,
            hosts_and_ports_tables_offset: 1,
        }
    }

    #[test]
    fn operating_system_names() {
        assert_eq!(operating_system(&header(10, 0, "")), "Windows 10 (build 19041.1)");
        assert_eq!(
            operating_system(&header(6, 1, "Service Pack 1")),
            "Windows 7, Service Pack 1 (build 19041.1)"
        );
        assert_eq!(operating_system(&header(5, 1, "")), "Windows 5.1 (build 19041.1)");
    }

    #[test]
    fn memory_is_truncated_to_two_decimals() {
        assert_eq!(memory_size(16 * 1024 * 1024 * 1024), "16.0 GB");
        assert_eq!(memory_size(17_112_760_320), "15.93 GB");
    }

    #[test]
    fn system_details_pairs_are_ordered() {
        let details = SystemDetails::from_header(&header(6, 3, ""));
        let labels: Vec<&str> = details.pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            labels,
            [
                "Computer Name",
                "Operating System",
                "System Root",
                "Logical Processors",
                "Memory (RAM)",
                "System Type"
            ]
        );
        assert_eq!(details.system_type, "64-bit");
        let json = serde_json::to_string(&details).unwrap();
        assert!(json.starts_with(r#"{"Computer Name":"WORKSTATION","Operating System":"Windows 8.1"#));
    }

    #[test]
    fn options_builder() {
        let options = ReaderOptions::new().stacktrace(false);
        assert!(!options.stacktrace);
        assert!(options.details);
        assert!(!ReaderOptions::default().details(false).details);
    }

    #[test]
    fn reader_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PmlReader>();
    }
}
