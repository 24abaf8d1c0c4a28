//! Lookup tables loaded once when a capture is opened.
//!
//! Each loader is a pure function of the capture bytes and the absolute
//! offset recorded in the header. The tables are immutable afterwards and
//! can be shared freely between threads.

use std::collections::{BTreeMap, HashMap};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use super::bytes::{ByteReader, Overrun};
use super::error::FormatError;
use super::model::{Module, Process};

type TableResult<T> = std::result::Result<T, FormatError>;

/// Reader positioned at an absolute offset of the capture.
fn reader_at<'a>(data: &'a [u8], offset: u64, what: &'static str) -> TableResult<ByteReader<'a>> {
    usize::try_from(offset)
        .ok()
        .and_then(|o| data.get(o..))
        .map(ByteReader::new)
        .ok_or(FormatError::Truncated { what, offset })
}

fn truncated(what: &'static str, base: u64) -> impl Fn(Overrun) -> FormatError {
    move |o| FormatError::Truncated {
        what,
        offset: base + o.at as u64,
    }
}

/// 0-indexed table of every string the process table refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    pub fn parse(data: &[u8], table_offset: u64) -> TableResult<Self> {
        const WHAT: &str = "strings table";
        let mut r = reader_at(data, table_offset, WHAT)?;
        let err = truncated(WHAT, table_offset);

        let count = r.u32().map_err(&err)? as usize;
        let mut offsets = Vec::with_capacity(count.min(r.remaining() / 4));
        for _ in 0..count {
            offsets.push(r.u32().map_err(&err)?);
        }

        let mut strings = Vec::with_capacity(offsets.len());
        for relative in offsets {
            let pos = table_offset + u64::from(relative);
            let mut s = reader_at(data, pos, WHAT)?;
            let err = truncated(WHAT, pos);
            let size = s.u32().map_err(&err)? as usize;
            strings.push(s.utf16(size).map_err(&err)?);
        }

        Ok(Self { strings })
    }

    pub fn from_strings(strings: Vec<String>) -> Self {
        Self { strings }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    /// Like [`StringTable::get`] but an out-of-range index is a format error.
    pub fn resolve(&self, index: u32) -> TableResult<String> {
        self.get(index)
            .map(str::to_owned)
            .ok_or(FormatError::StringIndex {
                index,
                len: self.strings.len(),
            })
    }
}

/// Processes keyed by process index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessTable {
    processes: BTreeMap<u32, Arc<Process>>,
}

impl ProcessTable {
    pub fn parse(
        data: &[u8],
        table_offset: u64,
        is_64bit: bool,
        strings: &StringTable,
    ) -> TableResult<Self> {
        const WHAT: &str = "process table";
        let mut r = reader_at(data, table_offset, WHAT)?;
        let err = truncated(WHAT, table_offset);

        let count = r.u32().map_err(&err)? as usize;
        let capacity = count.min(r.remaining() / 8);
        let mut indexes = Vec::with_capacity(capacity);
        for _ in 0..count {
            indexes.push(r.u32().map_err(&err)?);
        }
        let mut offsets = Vec::with_capacity(capacity);
        for _ in 0..count {
            offsets.push(r.u32().map_err(&err)?);
        }

        let mut processes = BTreeMap::new();
        for (position, (expected, relative)) in indexes.into_iter().zip(offsets).enumerate() {
            let pos = table_offset + u64::from(relative);
            let mut record = reader_at(data, pos, "process record")?;
            let process = read_process(&mut record, is_64bit, strings)
                .map_err(|e| e.into_format("process record", pos))?;
            if process.process_index != expected {
                return Err(FormatError::ProcessIndexMismatch {
                    position,
                    expected,
                    found: process.process_index,
                });
            }
            processes.insert(process.process_index, Arc::new(process));
        }

        Ok(Self { processes })
    }

    pub fn from_processes(processes: impl IntoIterator<Item = Process>) -> Self {
        Self {
            processes: processes
                .into_iter()
                .map(|p| (p.process_index, Arc::new(p)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn get(&self, process_index: u32) -> Option<&Arc<Process>> {
        self.processes.get(&process_index)
    }

    /// Processes in process-index order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Process>> {
        self.processes.values()
    }
}

enum RecordError {
    Overrun(Overrun),
    Format(FormatError),
}

impl From<Overrun> for RecordError {
    fn from(o: Overrun) -> Self {
        Self::Overrun(o)
    }
}

impl From<FormatError> for RecordError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

impl RecordError {
    fn into_format(self, what: &'static str, base: u64) -> FormatError {
        match self {
            Self::Overrun(o) => truncated(what, base)(o),
            Self::Format(e) => e,
        }
    }
}

fn filetime_opt(ticks: u64) -> Option<u64> {
    (ticks != 0).then_some(ticks)
}

fn read_process(
    r: &mut ByteReader<'_>,
    is_64bit: bool,
    strings: &StringTable,
) -> std::result::Result<Process, RecordError> {
    let process_index = r.u32()?;
    let pid = r.u32()?;
    let parent_pid = r.u32()?;
    r.skip(4)?;
    let authentication_id = r.u64()?;
    let session = r.u32()?;
    r.skip(4)?;
    let start_time = filetime_opt(r.u64()?);
    let end_time = filetime_opt(r.u64()?);
    let virtualized = r.u32()?;
    let is_process_64bit = r.u32()? != 0;

    let integrity = strings.resolve(r.u32()?)?;
    let user = strings.resolve(r.u32()?)?;
    let process_name = strings.resolve(r.u32()?)?;
    let image_path = strings.resolve(r.u32()?)?;
    let command_line = strings.resolve(r.u32()?)?;
    let company = strings.resolve(r.u32()?)?;
    let version = strings.resolve(r.u32()?)?;
    let description = strings.resolve(r.u32()?)?;

    r.pvoid(is_64bit)?;
    r.skip(8)?;
    let number_of_modules = r.u32()? as usize;
    let module_size = 2 * if is_64bit { 8 } else { 4 } + 0x30;
    let mut modules = Vec::with_capacity(number_of_modules.min(r.remaining() / module_size));
    for _ in 0..number_of_modules {
        modules.push(read_module(r, is_64bit, strings)?);
    }

    Ok(Process {
        process_index,
        pid,
        parent_pid,
        authentication_id,
        session,
        virtualized,
        is_process_64bit,
        integrity,
        user,
        process_name,
        image_path,
        command_line,
        company,
        version,
        description,
        start_time,
        end_time,
        modules,
    })
}

fn read_module(
    r: &mut ByteReader<'_>,
    is_64bit: bool,
    strings: &StringTable,
) -> std::result::Result<Module, RecordError> {
    r.pvoid(is_64bit)?;
    let base_address = r.pvoid(is_64bit)?;
    let size = r.u32()?;
    let path = strings.resolve(r.u32()?)?;
    let version = strings.resolve(r.u32()?)?;
    let company = strings.resolve(r.u32()?)?;
    let description = strings.resolve(r.u32()?)?;
    let timestamp = r.u32()?;
    r.skip(0x18)?;
    Ok(Module {
        base_address,
        size,
        path,
        version,
        company,
        description,
        timestamp,
    })
}

/// Raw 16-byte IP address to resolved hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostTable {
    hosts: HashMap<[u8; 16], String>,
}

impl HostTable {
    pub fn from_entries(entries: impl IntoIterator<Item = ([u8; 16], String)>) -> Self {
        Self {
            hosts: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Hostname for `ip`, or the textual address when the capture did not
    /// resolve it. IPv4 addresses live in the first four bytes.
    pub fn lookup(&self, ip: &[u8; 16], is_ipv4: bool) -> String {
        match self.hosts.get(ip) {
            Some(name) if !name.is_empty() => name.clone(),
            _ if is_ipv4 => Ipv4Addr::new(ip[0], ip[1], ip[2], ip[3]).to_string(),
            _ => Ipv6Addr::from(*ip).to_string(),
        }
    }
}

/// (port, is_tcp) to service name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortTable {
    ports: HashMap<(u16, bool), String>,
}

impl PortTable {
    pub fn from_entries(entries: impl IntoIterator<Item = ((u16, bool), String)>) -> Self {
        Self {
            ports: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn lookup(&self, port: u16, is_tcp: bool) -> String {
        self.ports
            .get(&(port, is_tcp))
            .cloned()
            .unwrap_or_else(|| port.to_string())
    }
}

/// Loads the hostname table and the port table that follow each other from
/// `offset` to the end of the capture.
pub fn parse_hosts_and_ports(data: &[u8], offset: u64) -> TableResult<(HostTable, PortTable)> {
    const WHAT: &str = "hosts and ports tables";
    let mut r = reader_at(data, offset, WHAT)?;
    let err = truncated(WHAT, offset);

    let host_count = r.u32().map_err(&err)?;
    let mut hosts = HashMap::new();
    for _ in 0..host_count {
        let ip: [u8; 16] = r.array().map_err(&err)?;
        let len = r.u32().map_err(&err)? as usize;
        hosts.insert(ip, r.utf16(len).map_err(&err)?);
    }

    let port_count = r.u32().map_err(&err)?;
    let mut ports = HashMap::new();
    for _ in 0..port_count {
        let port = r.u16().map_err(&err)?;
        let is_tcp = r.u16().map_err(&err)? != 0;
        let len = r.u32().map_err(&err)? as usize;
        ports.insert((port, is_tcp), r.utf16(len).map_err(&err)?);
    }

    Ok((HostTable { hosts }, PortTable { ports }))
}

/// One entry of the event offset index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOffset {
    pub offset: u32,
    /// Meaning unknown; kept as read.
    pub flags: u8,
}

/// Absolute offset of every event, in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOffsetIndex {
    entries: Vec<EventOffset>,
}

impl EventOffsetIndex {
    const ENTRY_SIZE: usize = 5;

    pub fn parse(data: &[u8], offset: u64, number_of_events: u32) -> TableResult<Self> {
        const WHAT: &str = "event offsets array";
        let mut r = reader_at(data, offset, WHAT)?;
        let err = truncated(WHAT, offset);
        let count = number_of_events as usize;
        if count.saturating_mul(Self::ENTRY_SIZE) > r.remaining() {
            return Err(FormatError::Truncated { what: WHAT, offset });
        }

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(EventOffset {
                offset: r.u32().map_err(&err)?,
                flags: r.u8().map_err(&err)?,
            });
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u64> {
        self.entries.get(index).map(|e| u64::from(e.offset))
    }

    pub fn entries(&self) -> &[EventOffset] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|e| u64::from(e.offset))
    }
}
