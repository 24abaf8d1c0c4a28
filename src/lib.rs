/// The artefact-parser contract.
pub mod core;
/// The PML artefact parsers and their registry.
pub mod parsers;
/// Process Monitor capture decoding: header, tables, events and details.
pub mod pml;

use crate::parsers::ParserRegistry;
use anyhow::Result;
pub use core::{ObjectParsed, Parser, ParserInfo, ParserInput};

/// Names and descriptions of every registered parser, sorted by name.
pub fn list_parsers(registry: &ParserRegistry) -> Vec<ParserInfo> {
    let mut out: Vec<ParserInfo> = registry
        .values()
        .map(|p| ParserInfo {
            name: p.name(),
            description: p.description(),
        })
        .collect();
    out.sort_by_key(|info| info.name);
    out
}

/// Runs the parser registered as `name` over `input`, streaming its objects
/// into `sink`.
///
/// # Errors
///
/// Fails when no parser is registered under `name`, or when the parser
/// itself fails.
pub fn run_parser_by_name(
    registry: &ParserRegistry,
    name: &str,
    input: ParserInput,
    sink: &mut dyn FnMut(ObjectParsed) -> Result<()>,
) -> Result<()> {
    registry
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("unknown parser: {name}"))?
        .run_into(input, sink)
}
