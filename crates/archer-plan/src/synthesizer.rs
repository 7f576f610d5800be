use std::path::Path;

use archer_format::{ExternalDecoder, FormatDescriptor, SniffOutcome, sniff};
use archer_tool::ToolResolver;

use crate::decoder::ToolDecoder;
use crate::error::{Error, Result};
use crate::plan::CommandPlan;

/// Builds compression and extraction plans from the host's installed tools.
///
/// Holds no state of its own beyond borrowed collaborators; every call
/// resolves from scratch, with tool lookups served from the resolver's cache.
pub struct Synthesizer<'r> {
    pub(crate) resolver: &'r ToolResolver,
    decoder: Box<dyn ExternalDecoder + 'r>,
}

impl<'r> Synthesizer<'r> {
    pub fn new(resolver: &'r ToolResolver) -> Self {
        Self {
            resolver,
            decoder: Box::new(ToolDecoder::new(resolver)),
        }
    }

    /// Replace the decompressor used to sniff `.lz`/`.lzop` payloads.
    pub fn decoder(mut self, decoder: impl ExternalDecoder + 'r) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub(crate) fn sniff(&self, path: &Path, format: &FormatDescriptor) -> SniffOutcome {
        sniff(path, format, &*self.decoder)
    }
}

pub(crate) fn no_tool(archive: &str) -> Error {
    Error::NoToolAvailable {
        archive: archive.to_string(),
    }
}

/// Build a compression plan with the system's tools.
pub fn resolve_compress<F, P>(
    resolver: &ToolResolver,
    name: &str,
    flags: &[F],
    files: &[P],
) -> Result<CommandPlan>
where
    F: AsRef<str>,
    P: AsRef<str>,
{
    Synthesizer::new(resolver).compress(name, flags, files)
}

/// Build an extraction plan with the system's tools.
pub fn resolve_extract<F: AsRef<str>>(
    resolver: &ToolResolver,
    name: &str,
    flags: &[F],
    dest_dir: Option<&Path>,
) -> Result<CommandPlan> {
    Synthesizer::new(resolver).extract(name, flags, dest_dir)
}
