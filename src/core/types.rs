use serde_json::Value;
use std::io::{Read, Seek};
use std::path::PathBuf;

/// One object produced by a parser: a decoded event, a process, or the
/// system summary of a capture.
#[derive(Debug, Clone)]
pub struct ObjectParsed {
    /// Name of the parser that produced this object.
    pub parser: &'static str,
    /// Dotted kind, e.g. `windows.pml.event` or `windows.pml.process`.
    pub kind: &'static str,
    /// One-line (or few-line) human readable rendering.
    pub text: String,
    /// Structured rendering.
    pub json: Value,
}

/// Name and description of a registered parser, for `--list-parsers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserInfo {
    /// Registry name, as passed to `--parser`.
    pub name: &'static str,
    /// What the parser emits.
    pub description: &'static str,
}

/// Readers that can also seek; the stream form of [`ParserInput`].
///
/// Lets a `Read + Seek` stream travel as a single trait object.
pub trait ReadSeek: Read + Seek {}

/// Every seekable reader qualifies.

impl<T: Read + Seek> ReadSeek for T {}

/// Where a parser reads its capture from.
///
/// Each variant ends up as one immutable byte buffer: paths are mapped,
/// buffers are taken as they are and streams are read to the end.
pub enum ParserInput<'a> {
    /// A file on disk; PML parsers memory-map it.
    Path(PathBuf),
    /// The whole capture already in memory.
    Bytes(Vec<u8>),
    /// Any seekable stream; read whole from its start.
    ReadSeek(Box<dyn ReadSeek + 'a>),
}
