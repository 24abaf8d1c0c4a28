//! The contract shared by every artefact parser of the crate.

pub mod parser;
pub mod types;

pub use parser::Parser;
pub use types::{ObjectParsed, ParserInfo, ParserInput, ReadSeek};
