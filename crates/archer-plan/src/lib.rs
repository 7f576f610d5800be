//! Turns an archive name into a runnable command.
//!
//! # Architecture
//!
//! - `compress.rs` - Compression plans: single-file, tar with external compressor, container
//! - `extract.rs` - Extraction plans: tar, pipelines, sniffed single files, last resort
//! - `template.rs` - Slot expansion and destination placement
//! - `decoder.rs` - Host decompressors for header sniffing
//! - `plan.rs` - `CommandPlan` and its execution
//!
//! ```no_run
//! use archer_plan::Synthesizer;
//! use archer_tool::{ResolverOptions, ToolResolver};
//!
//! let resolver = ToolResolver::system(&ResolverOptions::default());
//! let synth = Synthesizer::new(&resolver);
//! let plan = synth.compress("backup.tar.gz", &["-v"], &["a.txt", "b.txt"])?;
//! println!("{plan}");
//! # Ok::<(), archer_plan::Error>(())
//! ```

pub use decoder::ToolDecoder;
pub use error::{Error, Result};
pub use extract::archive_stem;
pub use plan::{CommandPlan, Invocation};
pub use synthesizer::{Synthesizer, resolve_compress, resolve_extract};

mod compress;
mod decoder;
mod error;
mod extract;
mod plan;
mod synthesizer;
mod template;
