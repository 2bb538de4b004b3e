//! `docup_core` is the core library for the docup documentation updater. It
//! applies small declarative JSON descriptors to markdown files and routes
//! every descriptor to an archive directory that records how it ended.
//!
//! ## Processing Pipeline
//!
//! ```text
//! updates_dir/*.json (sorted by name)
//!   → Parse (JSON object)
//!   → Validate (`file`, `mode`, `content`)
//!   → Apply (read target, run the mode engine, write when changed)
//!   → Archive (processed/ | malformed/ | failed/)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `docup.toml` discovery and the resolved [`ProcessorOptions`].
//! - [`engine`]: A pure function from the current text and an update to the new text.
//! - [`processor`]: Descriptor discovery, the per-file pipeline, and [`RunStatistics`].
//! - [`archive`]: Timestamped archival of descriptors and their error sidecars.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docup_core::ProcessorOptions;
//! use docup_core::UpdateProcessor;
//! use std::path::Path;
//!
//! let options = ProcessorOptions::new(Path::new(".github/doc-updates"));
//! let stats = UpdateProcessor::new(options).run().unwrap();
//!
//! if stats.has_errors() {
//!     eprintln!("{} descriptor(s) could not be applied", stats.errors.len());
//! }
//! ```

pub use archive::*;
pub use config::*;
pub use descriptor::*;
pub use engine::*;
pub use error::*;
pub use mode::*;
pub use processor::*;

pub mod archive;
pub mod config;
mod descriptor;
pub mod engine;
#[allow(unused_assignments)]
mod error;
mod mode;
pub mod processor;
