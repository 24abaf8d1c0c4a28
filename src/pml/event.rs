//! Event envelope and the decoded [`Event`] record.
//!
//! Every event starts with a fixed 0x34-byte envelope, followed by
//! `stack_depth` pointer-sized return addresses and `details_size` bytes of
//! operation-specific detail. Some events also point at an extra detail
//! region further in the file, addressed relative to the envelope.

use std::fmt;
use std::sync::Arc;

use scroll::{LE, Pread};
use serde::Serialize;

use super::bytes::ByteReader;
use super::consts::{EventClass, Operation};
use super::details::{self, Category, DetailContext, DetailMap};
use super::error::{EventDecodeError, EventDecodeErrorKind};
use super::format;
use super::model::Process;
use super::tables::{HostTable, PortTable, ProcessTable};

pub const ENVELOPE_SIZE: usize = 0x34;

/// Deeper stacks are treated as a corrupt envelope.
pub const MAX_STACK_DEPTH: u16 = 256;

/// The fixed envelope of one event, as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub process_index: u32,
    pub tid: u32,
    pub event_class: u32,
    pub operation: u16,
    /// 100ns ticks.
    pub duration: u64,
    /// Filetime.
    pub date: u64,
    pub result: u32,
    pub stack_depth: u16,
    pub details_size: u32,
    /// Relative to the start of the envelope; zero when there is none.
    pub extra_details_offset: u32,
}

impl Envelope {
    pub fn parse(raw: &[u8]) -> Result<Self, scroll::Error> {
        Ok(Self {
            process_index: raw.pread_with(0x00, LE)?,
            tid: raw.pread_with(0x04, LE)?,
            event_class: raw.pread_with(0x08, LE)?,
            operation: raw.pread_with(0x0c, LE)?,
            duration: raw.pread_with(0x14, LE)?,
            date: raw.pread_with(0x1c, LE)?,
            result: raw.pread_with(0x24, LE)?,
            stack_depth: raw.pread_with(0x28, LE)?,
            details_size: raw.pread_with(0x2c, LE)?,
            extra_details_offset: raw.pread_with(0x30, LE)?,
        })
    }
}

/// A fully decoded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub process: Arc<Process>,
    pub tid: u32,
    pub event_class: EventClass,
    pub operation: String,
    /// 100ns ticks.
    pub duration: u64,
    /// Filetime ticks.
    pub date: u64,
    pub result: u32,
    /// Return addresses, innermost first. Empty when stack traces are off.
    pub stacktrace: Vec<u64>,
    pub category: Category,
    pub path: String,
    pub details: DetailMap,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Process Name={}, Pid={}, Operation={}, Path=\"{}\", Time={}",
            self.process.process_name,
            self.process.pid,
            self.operation,
            self.path,
            format::date_time(self.date, true, true)
        )
    }
}

/// Read-only state shared by every event decode.
pub(crate) struct DecodeTables<'a> {
    pub is_64bit: bool,
    pub processes: &'a ProcessTable,
    pub hosts: &'a HostTable,
    pub ports: &'a PortTable,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DecodeOptions {
    pub stacktrace: bool,
    pub details: bool,
}

/// Decodes the event whose envelope starts at absolute `offset` of `data`.
pub(crate) fn decode_event(
    data: &[u8],
    offset: u64,
    tables: &DecodeTables<'_>,
    options: DecodeOptions,
) -> Result<Event, EventDecodeError> {
    use EventDecodeErrorKind::*;

    let fail = |kind| EventDecodeError::new(offset, kind);

    let raw = usize::try_from(offset)
        .ok()
        .and_then(|start| data.get(start..))
        .ok_or_else(|| fail(Truncated("event envelope")))?;
    let envelope = Envelope::parse(raw).map_err(|_| fail(Truncated("event envelope")))?;

    let process = tables
        .processes
        .get(envelope.process_index)
        .cloned()
        .ok_or_else(|| fail(UnknownProcess(envelope.process_index)))?;
    let event_class = EventClass::from_repr(envelope.event_class)
        .ok_or_else(|| fail(UnknownEventClass(envelope.event_class)))?;
    if envelope.stack_depth > MAX_STACK_DEPTH {
        return Err(fail(StackTooDeep {
            depth: envelope.stack_depth,
            limit: MAX_STACK_DEPTH,
        }));
    }

    let pointer_size = if tables.is_64bit { 8 } else { 4 };
    let stack_len = usize::from(envelope.stack_depth) * pointer_size;
    let stack_raw = raw
        .get(ENVELOPE_SIZE..ENVELOPE_SIZE + stack_len)
        .ok_or_else(|| fail(Truncated("stack trace")))?;
    let stacktrace = if options.stacktrace {
        let mut r = ByteReader::new(stack_raw);
        (0..envelope.stack_depth)
            .map(|_| r.pvoid(tables.is_64bit))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| fail(Truncated("stack trace")))?
    } else {
        Vec::new()
    };

    let details_start = ENVELOPE_SIZE + stack_len;
    let details_end = details_start + envelope.details_size as usize;
    let details_raw = raw
        .get(details_start..details_end)
        .ok_or_else(|| fail(Truncated("detail region")))?;
    let extra = if options.details {
        extra_region(raw, details_end, envelope.extra_details_offset)
    } else {
        None
    };

    let operation = Operation::decode(event_class, envelope.operation);
    let ctx = DetailContext {
        is_64bit: tables.is_64bit,
        tid: envelope.tid,
        hosts: tables.hosts,
        ports: tables.ports,
        extra,
        full: options.details,
    };
    let decoded = details::decode(operation, details_raw, &ctx);

    Ok(Event {
        process,
        tid: envelope.tid,
        event_class,
        operation: decoded
            .refined_operation
            .unwrap_or_else(|| operation.name().to_owned()),
        duration: envelope.duration,
        date: envelope.date,
        result: envelope.result,
        stacktrace,
        category: decoded.category,
        path: decoded.path,
        details: decoded.details,
    })
}

/// The extra detail region: a u16 size and that many bytes, located
/// `relative` bytes from the envelope. Absent when it would overlap what
/// was already consumed or runs past the end of the file.
fn extra_region(event: &[u8], consumed: usize, relative: u32) -> Option<&[u8]> {
    let start = relative as usize;
    if relative == 0 || start < consumed {
        return None;
    }
    let size: u16 = event.pread_with(start, LE).ok()?;
    if size == 0 {
        return None;
    }
    event.get(start + 2..start + 2 + usize::from(size))
}
