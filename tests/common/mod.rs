//! In-memory builder for synthetic PML captures.
#![allow(dead_code)]

use scroll::{LE, Pwrite};

pub const HEADER_SIZE: usize = 0x3a8;
pub const ENVELOPE_SIZE: usize = 0x34;

/// Header field offsets.
pub const EVENTS_OFFSET_FIELD: usize = 0x240;
pub const PROCESS_TABLE_FIELD: usize = 0x250;

pub const CLASS_PROCESS: u32 = 1;
pub const CLASS_REGISTRY: u32 = 2;
pub const CLASS_FILE_SYSTEM: u32 = 3;
pub const CLASS_NETWORK: u32 = 5;

pub fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// String info word of `s` stored as UTF-16.
pub fn info(s: &str) -> [u8; 2] {
    (s.encode_utf16().count() as u16).to_le_bytes()
}

pub fn ipv4(a: u8, b: u8, c: u8, d: u8) -> [u8; 16] {
    let mut ip = [0u8; 16];
    ip[..4].copy_from_slice(&[a, b, c, d]);
    ip
}

#[derive(Debug, Clone, Default)]
pub struct ModuleRecord {
    pub base: u64,
    pub size: u32,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub index: u32,
    pub pid: u32,
    pub parent_pid: u32,
    pub name: String,
    pub image_path: String,
    pub command_line: String,
    pub user: String,
    pub integrity: String,
    pub company: String,
    pub modules: Vec<ModuleRecord>,
}

impl ProcessRecord {
    pub fn new(index: u32, pid: u32, name: &str) -> Self {
        Self {
            index,
            pid,
            parent_pid: 4,
            name: name.into(),
            image_path: format!("C:\\Windows\\System32\\{name}"),
            command_line: name.into(),
            user: "NT AUTHORITY\\SYSTEM".into(),
            integrity: "System".into(),
            company: "Microsoft Corporation".into(),
            modules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventRecord {
    pub process_index: u32,
    pub tid: u32,
    pub class: u32,
    pub operation: u16,
    pub duration: u64,
    pub date: u64,
    pub result: u32,
    pub stack: Vec<u64>,
    /// Overrides the stack depth field without writing that many frames.
    pub declared_depth: Option<u16>,
    pub details: Vec<u8>,
    pub extra: Option<Vec<u8>>,
}

impl EventRecord {
    pub fn new(process_index: u32, class: u32, operation: u16, details: Vec<u8>) -> Self {
        Self {
            process_index,
            tid: 100,
            class,
            operation,
            duration: 2_500,
            date: 132_227_030_490_000_000,
            result: 0,
            stack: Vec::new(),
            declared_depth: None,
            details,
            extra: None,
        }
    }

    pub fn with_stack(mut self, stack: Vec<u64>) -> Self {
        self.stack = stack;
        self
    }

    pub fn with_extra(mut self, extra: Vec<u8>) -> Self {
        self.extra = Some(extra);
        self
    }

    fn encode(&self, is_64bit: bool) -> Vec<u8> {
        let mut raw = vec![0u8; ENVELOPE_SIZE];
        let depth = self.declared_depth.unwrap_or(self.stack.len() as u16);
        let pointer_size = if is_64bit { 8 } else { 4 };
        raw.pwrite_with(self.process_index, 0x00, LE).unwrap();
        raw.pwrite_with(self.tid, 0x04, LE).unwrap();
        raw.pwrite_with(self.class, 0x08, LE).unwrap();
        raw.pwrite_with(self.operation, 0x0c, LE).unwrap();
        raw.pwrite_with(self.duration, 0x14, LE).unwrap();
        raw.pwrite_with(self.date, 0x1c, LE).unwrap();
        raw.pwrite_with(self.result, 0x24, LE).unwrap();
        raw.pwrite_with(depth, 0x28, LE).unwrap();
        raw.pwrite_with(self.details.len() as u32, 0x2c, LE).unwrap();
        if self.extra.is_some() {
            let consumed = ENVELOPE_SIZE + self.stack.len() * pointer_size + self.details.len();
            raw.pwrite_with(consumed as u32, 0x30, LE).unwrap();
        }
        for frame in &self.stack {
            if is_64bit {
                raw.extend_from_slice(&frame.to_le_bytes());
            } else {
                raw.extend_from_slice(&(*frame as u32).to_le_bytes());
            }
        }
        raw.extend_from_slice(&self.details);
        if let Some(extra) = &self.extra {
            raw.extend_from_slice(&(extra.len() as u16).to_le_bytes());
            raw.extend_from_slice(extra);
        }
        raw
    }
}

pub struct PmlBuilder {
    pub is_64bit: bool,
    pub computer_name: String,
    pub windows_version: (u32, u32, u32),
    pub ram: u64,
    pub processes: Vec<ProcessRecord>,
    pub events: Vec<EventRecord>,
    pub hosts: Vec<([u8; 16], String)>,
    pub ports: Vec<(u16, bool, String)>,
}

impl Default for PmlBuilder {
    fn default() -> Self {
        Self {
            is_64bit: true,
            computer_name: "WORKSTATION".into(),
            windows_version: (10, 0, 19041),
            ram: 16 * 1024 * 1024 * 1024,
            processes: Vec::new(),
            events: Vec::new(),
            hosts: Vec::new(),
            ports: Vec::new(),
        }
    }
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

#[derive(Default)]
struct Strings(Vec<String>);

impl Strings {
    fn intern(&mut self, s: &str) -> u32 {
        match self.0.iter().position(|x| x == s) {
            Some(i) => i as u32,
            None => {
                self.0.push(s.to_owned());
                (self.0.len() - 1) as u32
            }
        }
    }
}

impl PmlBuilder {
    pub fn process(mut self, process: ProcessRecord) -> Self {
        self.processes.push(process);
        self
    }

    pub fn event(mut self, event: EventRecord) -> Self {
        self.events.push(event);
        self
    }

    pub fn host(mut self, ip: [u8; 16], name: &str) -> Self {
        self.hosts.push((ip, name.into()));
        self
    }

    pub fn port(mut self, port: u16, is_tcp: bool, name: &str) -> Self {
        self.ports.push((port, is_tcp, name.into()));
        self
    }

    fn encode_process(&self, p: &ProcessRecord, strings: &mut Strings) -> Vec<u8> {
        let mut r = Vec::new();
        put_u32(&mut r, p.index);
        put_u32(&mut r, p.pid);
        put_u32(&mut r, p.parent_pid);
        put_u32(&mut r, 0);
        put_u64(&mut r, 0x3e7);
        put_u32(&mut r, 0);
        put_u32(&mut r, 0);
        put_u64(&mut r, 132_227_030_000_000_000);
        put_u64(&mut r, 0);
        put_u32(&mut r, 0);
        put_u32(&mut r, u32::from(self.is_64bit));
        for s in [
            &p.integrity,
            &p.user,
            &p.name,
            &p.image_path,
            &p.command_line,
            &p.company,
            &String::new(),
            &String::new(),
        ] {
            put_u32(&mut r, strings.intern(s));
        }
        let pointer = |r: &mut Vec<u8>, v: u64| {
            if self.is_64bit {
                put_u64(r, v)
            } else {
                put_u32(r, v as u32)
            }
        };
        pointer(&mut r, 0);
        r.extend_from_slice(&[0u8; 8]);
        put_u32(&mut r, p.modules.len() as u32);
        for m in &p.modules {
            pointer(&mut r, 0);
            pointer(&mut r, m.base);
            put_u32(&mut r, m.size);
            put_u32(&mut r, strings.intern(&m.path));
            put_u32(&mut r, strings.intern(""));
            put_u32(&mut r, strings.intern(""));
            put_u32(&mut r, strings.intern(""));
            put_u32(&mut r, 0);
            r.extend_from_slice(&[0u8; 0x18]);
        }
        r
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE];

        let mut event_offsets = Vec::new();
        for event in &self.events {
            event_offsets.push(buf.len() as u32);
            buf.extend_from_slice(&event.encode(self.is_64bit));
        }

        let offsets_array_offset = buf.len();
        for offset in event_offsets {
            put_u32(&mut buf, offset);
            buf.push(0);
        }

        let mut strings = Strings::default();
        let records: Vec<Vec<u8>> = self
            .processes
            .iter()
            .map(|p| self.encode_process(p, &mut strings))
            .collect();

        let strings_offset = buf.len();
        put_u32(&mut buf, strings.0.len() as u32);
        let mut relative = 4 + 4 * strings.0.len();
        for s in &strings.0 {
            put_u32(&mut buf, relative as u32);
            relative += 4 + utf16(s).len();
        }
        for s in &strings.0 {
            let encoded = utf16(s);
            put_u32(&mut buf, encoded.len() as u32);
            buf.extend_from_slice(&encoded);
        }

        let process_offset = buf.len();
        put_u32(&mut buf, self.processes.len() as u32);
        for p in &self.processes {
            put_u32(&mut buf, p.index);
        }
        let mut relative = 4 + 8 * self.processes.len();
        for record in &records {
            put_u32(&mut buf, relative as u32);
            relative += record.len();
        }
        for record in &records {
            buf.extend_from_slice(record);
        }

        let unknown_offset = buf.len();
        put_u32(&mut buf, 0);

        let hosts_offset = buf.len();
        put_u32(&mut buf, self.hosts.len() as u32);
        for (ip, name) in &self.hosts {
            buf.extend_from_slice(ip);
            put_u32(&mut buf, utf16(name).len() as u32);
            buf.extend_from_slice(&utf16(name));
        }
        put_u32(&mut buf, self.ports.len() as u32);
        for (port, is_tcp, name) in &self.ports {
            buf.extend_from_slice(&port.to_le_bytes());
            buf.extend_from_slice(&u16::from(*is_tcp).to_le_bytes());
            put_u32(&mut buf, utf16(name).len() as u32);
            buf.extend_from_slice(&utf16(name));
        }

        let header = &mut buf[..HEADER_SIZE];
        header[..4].copy_from_slice(b"PML_");
        header.pwrite_with(9u32, 0x04, LE).unwrap();
        header.pwrite_with(u32::from(self.is_64bit), 0x08, LE).unwrap();
        for (i, unit) in self.computer_name.encode_utf16().take(15).enumerate() {
            header.pwrite_with(unit, 0x0c + i * 2, LE).unwrap();
        }
        for (i, unit) in "C:\\Windows".encode_utf16().enumerate() {
            header.pwrite_with(unit, 0x2c + i * 2, LE).unwrap();
        }
        header.pwrite_with(self.events.len() as u32, 0x234, LE).unwrap();
        header.pwrite_with(HEADER_SIZE as u64, EVENTS_OFFSET_FIELD, LE).unwrap();
        header.pwrite_with(offsets_array_offset as u64, 0x248, LE).unwrap();
        header.pwrite_with(process_offset as u64, PROCESS_TABLE_FIELD, LE).unwrap();
        header.pwrite_with(strings_offset as u64, 0x258, LE).unwrap();
        header.pwrite_with(unknown_offset as u64, 0x260, LE).unwrap();
        let (major, minor, build) = self.windows_version;
        header.pwrite_with(major, 0x274, LE).unwrap();
        header.pwrite_with(minor, 0x278, LE).unwrap();
        header.pwrite_with(build, 0x27c, LE).unwrap();
        header.pwrite_with(1u32, 0x280, LE).unwrap();
        header.pwrite_with(4u32, 0x38c, LE).unwrap();
        header.pwrite_with(self.ram, 0x390, LE).unwrap();
        header.pwrite_with(HEADER_SIZE as u64, 0x398, LE).unwrap();
        header.pwrite_with(hosts_offset as u64, 0x3a0, LE).unwrap();

        buf
    }
}

/// RegOpenKey detail region.
pub fn reg_open_key(path: &str, desired_access: u32) -> Vec<u8> {
    let mut d = info(path).to_vec();
    d.extend_from_slice(&[0, 0]);
    d.extend_from_slice(&desired_access.to_le_bytes());
    d.extend_from_slice(&utf16(path));
    d
}

/// RegSetValue detail region carrying `data`.
pub fn reg_set_value(path: &str, reg_type: u32, data: &[u8]) -> Vec<u8> {
    let mut d = info(path).to_vec();
    d.extend_from_slice(&[0, 0]);
    d.extend_from_slice(&reg_type.to_le_bytes());
    d.extend_from_slice(&(data.len() as u32).to_le_bytes());
    d.extend_from_slice(&(data.len() as u32).to_le_bytes());
    d.extend_from_slice(&utf16(path));
    d.extend_from_slice(data);
    d
}

/// Network detail region.
pub fn network(flags: u16, src: [u8; 16], src_port: u16, dst: [u8; 16], dst_port: u16) -> Vec<u8> {
    let mut d = Vec::new();
    d.extend_from_slice(&flags.to_le_bytes());
    d.extend_from_slice(&[0, 0]);
    d.extend_from_slice(&512u32.to_le_bytes());
    d.extend_from_slice(&src);
    d.extend_from_slice(&dst);
    d.extend_from_slice(&src_port.to_le_bytes());
    d.extend_from_slice(&dst_port.to_le_bytes());
    d
}

/// File system detail region: sub-operation, zeroed IRP window, path and
/// `trailer`.
pub fn file_system(is_64bit: bool, sub_operation: u8, irp: &[u8], path: &str, trailer: &[u8]) -> Vec<u8> {
    let irp_size = if is_64bit { 8 * 5 + 0x14 } else { 4 * 5 + 0x14 };
    let mut d = vec![sub_operation, 0, 0, 0];
    let mut window = irp.to_vec();
    window.resize(irp_size, 0);
    d.extend_from_slice(&window);
    d.extend_from_slice(&info(path));
    d.extend_from_slice(&[0, 0]);
    d.extend_from_slice(&utf16(path));
    d.extend_from_slice(trailer);
    d
}
