use anyhow::Result;

use super::{ObjectParsed, ParserInput};

/// An artefact parser that turns one input into a stream of objects.
///
/// Parsers are registered once and shared, hence `Send + Sync`.
pub trait Parser: Send + Sync {
    /// Stable registry name, e.g. `windows_pml`.
    fn name(&self) -> &'static str;

    /// One-line summary shown by `--list-parsers`.
    ///
    /// Parsers that do not override it report `"No description provided."`.
    fn description(&self) -> &'static str {
        "No description provided."
    }

    /// Parses `input` and hands every object to `sink`, in order.
    ///
    /// # Arguments
    ///
    /// * `input` - The capture to read: a path, an owned buffer or a stream.
    /// * `sink` - Called once per [`ObjectParsed`]. Returning an error stops
    ///   the parser, which then returns that error.
    ///
    /// # Errors
    ///
    /// Fails when the input cannot be opened or decoded, or as soon as
    /// `sink` returns an error.
    fn run_into(
        &self,
        input: ParserInput,
        sink: &mut dyn FnMut(ObjectParsed) -> Result<()>,
    ) -> Result<()>;
}
