use anyhow::{Context, Result};
use log::warn;
use serde_json::json;
use std::io::{Read, Seek, SeekFrom};

use crate::core::{ObjectParsed, Parser, ParserInput};
use crate::pml::{Error, PmlReader, ReaderOptions};

/// Open a PML capture from any supported parser input.
///
/// Paths are memory-mapped; in-memory buffers are used as is and streams
/// are read whole from their start.
fn open_reader(input: ParserInput) -> Result<PmlReader> {
    let reader = match input {
        ParserInput::Path(p) => {
            PmlReader::open(&p).with_context(|| format!("failed to open PML {}", p.display()))?
        }
        ParserInput::Bytes(b) => {
            PmlReader::from_bytes(b).context("failed to open PML from buffer")?
        }
        ParserInput::ReadSeek(mut rs) => {
            rs.seek(SeekFrom::Start(0))?;
            let mut data = Vec::new();
            rs.read_to_end(&mut data)?;
            PmlReader::from_bytes(data).context("failed to open PML from stream")?
        }
    };
    Ok(reader)
}

/// Parser for Process Monitor PML captures.
///
/// Emits one [`ObjectParsed`] per decoded event.
pub struct WindowsPmlParser {
    /// What to decode for each event.
    options: ReaderOptions,
    /// When `true`, events that fail to decode are logged and skipped.
    /// When `false`, the first such event aborts parsing.
    best_effort: bool,
}

impl Default for WindowsPmlParser {
    /// Stack traces and details decoded, best-effort mode enabled.
    fn default() -> Self {
        Self {
            options: ReaderOptions::default(),
            best_effort: true,
        }
    }
}

impl WindowsPmlParser {
    pub fn options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable or disable best-effort mode.
    pub fn best_effort(mut self, v: bool) -> Self {
        self.best_effort = v;
        self
    }

    fn run_with_reader(
        &self,
        reader: PmlReader,
        sink: &mut dyn FnMut(ObjectParsed) -> Result<()>,
    ) -> Result<()> {
        let reader = reader.with_options(self.options);

        for (index, event) in reader.iter().enumerate() {
            let event = match event {
                Ok(e) => e,
                // Event-scoped failures are skippable; anything else is not.
                Err(Error::Event(e)) if self.best_effort => {
                    warn!("PML: skipping event {index}: {e}");
                    continue;
                }
                Err(e) => return Err(e).with_context(|| format!("PML: event {index}")),
            };

            let text = format!(
                "[{}] PID={} {} -> {}",
                event.operation, event.process.pid, event.process.process_name, event.path
            );
            let event_json =
                serde_json::to_value(&event).context("PML: JSON serialization failed")?;

            sink(ObjectParsed {
                parser: self.name(),
                kind: "windows.pml.event",
                text,
                json: json!({
                    "index": index,
                    "event": event_json,
                }),
            })?;
        }

        Ok(())
    }
}

impl Parser for WindowsPmlParser {
    fn name(&self) -> &'static str {
        "windows_pml"
    }

    fn description(&self) -> &'static str {
        "Parse Process Monitor PML captures (v9) and emit one JSON object per event."
    }

    fn run_into(
        &self,
        input: ParserInput,
        sink: &mut dyn FnMut(ObjectParsed) -> Result<()>,
    ) -> Result<()> {
        self.run_with_reader(open_reader(input)?, sink)
    }
}

/// Lists the processes known to a PML capture, modules included.
#[derive(Default)]
pub struct WindowsPmlProcessesParser;

impl Parser for WindowsPmlProcessesParser {
    fn name(&self) -> &'static str {
        "windows_pml_processes"
    }

    fn description(&self) -> &'static str {
        "List the processes (and their modules) recorded in a Process Monitor PML capture."
    }

    fn run_into(
        &self,
        input: ParserInput,
        sink: &mut dyn FnMut(ObjectParsed) -> Result<()>,
    ) -> Result<()> {
        let reader = open_reader(input)?;
        for process in reader.processes() {
            sink(ObjectParsed {
                parser: self.name(),
                kind: "windows.pml.process",
                text: process.to_string(),
                json: serde_json::to_value(process.as_ref())
                    .context("PML: JSON serialization failed")?,
            })?;
        }
        Ok(())
    }
}

/// Reports the machine a PML capture was recorded on.
#[derive(Default)]
pub struct WindowsPmlSystemParser;

impl Parser for WindowsPmlSystemParser {
    fn name(&self) -> &'static str {
        "windows_pml_system"
    }

    fn description(&self) -> &'static str {
        "Show the system details (computer, OS, CPU, RAM) of a Process Monitor PML capture."
    }

    fn run_into(
        &self,
        input: ParserInput,
        sink: &mut dyn FnMut(ObjectParsed) -> Result<()>,
    ) -> Result<()> {
        let details = open_reader(input)?.system_details();
        let text = details
            .pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n");
        sink(ObjectParsed {
            parser: self.name(),
            kind: "windows.pml.system",
            text,
            json: serde_json::to_value(&details).context("PML: JSON serialization failed")?,
        })
    }
}
