//! Process and module records resolved from the process table.

use serde::Serialize;

/// A module loaded in a process (or in the kernel).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Module {
    pub base_address: u64,
    pub size: u32,
    pub path: String,
    pub version: String,
    pub company: String,
    pub description: String,
    /// Link timestamp of the image (seconds since 1970).
    pub timestamp: u32,
}

impl Module {
    /// True when `address` falls inside this module's image.
    pub fn contains(&self, address: u64) -> bool {
        address >= self.base_address && address - self.base_address < u64::from(self.size)
    }
}

/// A process known to the capture.
///
/// `process_index` is the key events use to refer to their process; it is
/// stable for the whole capture, unlike `pid` which the OS may reuse.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Process {
    pub process_index: u32,
    pub pid: u32,
    pub parent_pid: u32,
    pub authentication_id: u64,
    pub session: u32,
    pub virtualized: u32,
    pub is_process_64bit: bool,
    pub integrity: String,
    pub user: String,
    pub process_name: String,
    pub image_path: String,
    pub command_line: String,
    pub company: String,
    pub version: String,
    pub description: String,
    /// Filetime ticks, `None` when the capture recorded zero.
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub modules: Vec<Module>,
}

impl Process {
    /// Module whose image range contains `address`, used to annotate stack
    /// frames.
    pub fn module_for_address(&self, address: u64) -> Option<&Module> {
        self.modules.iter().find(|m| m.contains(address))
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\", {}", self.image_path, self.pid)
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\", address={:#x}, size={:#x}",
            self.path, self.base_address, self.size
        )
    }
}
