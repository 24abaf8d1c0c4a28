//! Error taxonomy of the PML decoder.
//!
//! Whole-file problems found while opening a capture are [`FormatError`]s and
//! abort the open. Problems with a single event are [`EventDecodeError`]s and
//! only affect that event; the caller decides whether to skip or propagate
//! them. Unknown enum values inside a detail region are never errors.

use thiserror::Error;

/// Result alias used across the `pml` module.
pub type Result<T> = std::result::Result<T, Error>;

/// Top level error returned by the PML reader.
#[derive(Error, Debug)]
pub enum Error {
    /// The capture is structurally unusable.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A caller-supplied event index is outside `[0, len)`.
    #[error("event index {index} is out of range for a log of {len} events")]
    OutOfRange { index: usize, len: usize },

    /// One event could not be decoded.
    #[error(transparent)]
    Event(#[from] EventDecodeError),

    /// Opening or mapping the capture failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Fatal, whole-file format problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("wrong PML header signature {0:02x?}")]
    BadSignature([u8; 4]),

    #[error("PML version {0} is not implemented")]
    UnsupportedVersion(u32),

    #[error("corrupted PML file: events offset ({events_offset:#x}) is not equal to header size ({header_size:#x})")]
    EventsOffsetMismatch { events_offset: u64, header_size: u64 },

    #[error("PML was not closed cleanly during capture and is corrupt ({region} offset is zero)")]
    NotClosedCleanly { region: &'static str },

    #[error("{what} at offset {offset:#x} runs past the end of the file")]
    Truncated { what: &'static str, offset: u64 },

    #[error("process table entry {position} declares index {found} but the index array says {expected}")]
    ProcessIndexMismatch {
        position: usize,
        expected: u32,
        found: u32,
    },

    #[error("string index {index} is out of range for a table of {len} strings")]
    StringIndex { index: u32, len: usize },
}

/// Failure scoped to the event at `offset`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("event at offset {offset:#x}: {kind}")]
pub struct EventDecodeError {
    /// Absolute file offset of the event envelope.
    pub offset: u64,
    pub kind: EventDecodeErrorKind,
}

impl EventDecodeError {
    pub(crate) fn new(offset: u64, kind: EventDecodeErrorKind) -> Self {
        Self { offset, kind }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventDecodeErrorKind {
    #[error("stack trace depth {depth} exceeds the limit of {limit}")]
    StackTooDeep { depth: u16, limit: u16 },

    #[error("process index {0} is not in the process table")]
    UnknownProcess(u32),

    #[error("unknown event class {0}")]
    UnknownEventClass(u32),

    #[error("{0} runs past the end of the file")]
    Truncated(&'static str),
}
