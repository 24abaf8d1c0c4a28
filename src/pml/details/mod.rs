//! Operation-specific decoding of an event's detail region.
//!
//! Dispatch is two levels deep (class, then operation) with a third level
//! for file system sub-operations. Each decoder fills an [`EventDetails`]
//! and reports the operation name it refines to, if any; nothing is written
//! back into the event being built.

mod filesystem;
mod network;
mod process;
mod registry;

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use strum::IntoStaticStr;

use super::bytes::{ByteReader, ReadResult};
use super::consts::Operation;
use super::format;
use super::tables::{HostTable, PortTable};

/// One value in an event's detail map.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum DetailValue {
    Text(String),
    Number(u64),
    Bool(bool),
    Bytes(Vec<u8>),
    /// 100ns ticks.
    Duration(u64),
    /// Filetime ticks.
    Time(u64),
    List(Vec<String>),
}

impl DetailValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) | Self::Duration(n) | Self::Time(n) => Some(*n),
            _ => None,
        }
    }
}

/// Renders a duration in 100ns ticks as `seconds.fraction`, seven digits.
pub fn format_ticks(ticks: u64) -> String {
    format!("{}.{:07}", ticks / 10_000_000, ticks % 10_000_000)
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            Self::Bytes(bytes) => {
                let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
                f.write_str(&hex.join(" "))
            }
            Self::Duration(ticks) => f.write_str(&format_ticks(*ticks)),
            Self::Time(filetime) => f.write_str(&format::date_time(*filetime, true, false)),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u32> for DetailValue {
    fn from(value: u32) -> Self {
        Self::Number(u64::from(value))
    }
}

impl From<u64> for DetailValue {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for DetailValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Insertion-ordered detail map, as Process Monitor lists them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailMap {
    entries: Vec<(String, DetailValue)>,
}

impl DetailMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, keeping its original position if it was already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DetailValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DetailValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<DetailValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DetailValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut DetailValue)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Serialize for DetailMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, IntoStaticStr, serde::Serialize)]
pub enum Category {
    #[default]
    #[strum(serialize = "")]
    #[serde(rename = "")]
    None,
    Read,
    Write,
    #[strum(serialize = "Read Metadata")]
    #[serde(rename = "Read Metadata")]
    ReadMetadata,
    #[strum(serialize = "Write Metadata")]
    #[serde(rename = "Write Metadata")]
    WriteMetadata,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a detail decoder learned about one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDetails {
    /// Replaces the generic operation name when set.
    pub refined_operation: Option<String>,
    pub path: String,
    pub category: Category,
    pub details: DetailMap,
}

/// Everything outside the detail region that decoders may consult.
pub(crate) struct DetailContext<'a> {
    pub is_64bit: bool,
    pub tid: u32,
    pub hosts: &'a HostTable,
    pub ports: &'a PortTable,
    /// The out-of-band extra detail region, when the event has one.
    pub extra: Option<&'a [u8]>,
    /// When false only the path and refined operation are decoded.
    pub full: bool,
}

impl<'a> DetailContext<'a> {
    fn pointer_size(&self) -> usize {
        if self.is_64bit { 8 } else { 4 }
    }

    fn extra_reader(&self) -> Option<ByteReader<'a>> {
        if self.full {
            self.extra.map(ByteReader::new)
        } else {
            None
        }
    }
}

/// Decodes `region` for `operation`. A region shorter than its layout keeps
/// whatever was decoded before the end was reached.
pub(crate) fn decode(operation: Operation, region: &[u8], ctx: &DetailContext<'_>) -> EventDetails {
    let mut out = EventDetails::default();
    let mut r = ByteReader::new(region);
    let outcome: ReadResult<()> = match operation {
        Operation::Process(op) => process::decode(op, &mut r, ctx, &mut out),
        Operation::Registry(op) => registry::decode(op, &mut r, ctx, &mut out),
        Operation::FileSystem(op) => filesystem::decode(op, &mut r, ctx, &mut out),
        Operation::Network(op) => network::decode(op, &mut r, ctx, &mut out),
        Operation::Profiling(_) | Operation::Unknown(_) => Ok(()),
    };
    if let Err(overrun) = outcome {
        log::debug!(
            "{operation} detail region ends early: {} byte(s) wanted at {:#x} of {:#x}",
            overrun.wanted,
            overrun.at,
            region.len()
        );
    }
    if !ctx.full {
        out.details.clear();
        out.category = Category::None;
    }
    out
}
