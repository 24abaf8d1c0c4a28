//! Decoder for Process Monitor capture files (`.PML`).
//!
//! [`PmlReader`] opens a capture, validates its header and loads the lookup
//! tables; events are then decoded on demand by index, by slice, by
//! absolute offset or by iteration.
//!
//! ```no_run
//! use exhume_pml::pml::{PmlReader, ReaderOptions};
//!
//! let reader = PmlReader::open("Logfile.PML")?
//!     .with_options(ReaderOptions::new().stacktrace(false));
//! for event in &reader {
//!     let event = event?;
//!     println!("{} {} {}", event.operation, event.path, event.category);
//! }
//! # Ok::<(), exhume_pml::pml::Error>(())
//! ```

pub mod bytes;
pub mod consts;
pub mod details;
pub mod error;
pub mod event;
pub mod format;
pub mod header;
pub mod ioctl;
pub mod masks;
pub mod model;
pub mod reader;
pub mod tables;

pub use consts::{EventClass, Operation};
pub use details::{Category, DetailMap, DetailValue};
pub use error::{Error, EventDecodeError, EventDecodeErrorKind, FormatError, Result};
pub use event::Event;
pub use format::CsvRecord;
pub use header::FileHeader;
pub use model::{Module, Process};
pub use reader::{Events, PmlReader, ReaderOptions, SystemDetails};
