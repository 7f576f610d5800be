//! Tar payload detection for ambiguous single-compressor extensions.
//!
//! `.gz`, `.bz2`, `.xz`, `.lz`, ... may hold one plain file or a whole tar
//! stream. The name is checked first; only when it says nothing is the first
//! tar block decompressed and checked for the ustar magic.
//!
//! Whenever the header cannot be obtained the answer is "tar"
//! ([`ASSUME_TAR_ON_SNIFF_FAILURE`]).

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, trace};

use crate::codec::Codec;
use crate::descriptor::FormatDescriptor;

pub const TAR_BLOCK_LEN: usize = 512;
const MAGIC_OFFSET: usize = 257;
const TAR_MAGICS: &[&[u8]] = &[b"ustar\0", b"ustar "];

/// Marker in a filename that names a compressed tar outright.
pub const TAR_NAME_MARKER: &str = ".tar.";

/// What an unreadable header is taken to be.
pub const ASSUME_TAR_ON_SNIFF_FAILURE: bool = true;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SniffOutcome {
    /// The name or the decompressed header says tar.
    Tar,
    /// A complete header without tar magic, or a stream too short to be tar.
    Plain,
    /// The header could not be decompressed.
    Unreadable,
}

impl SniffOutcome {
    pub fn is_tar(self) -> bool {
        match self {
            Self::Tar => true,
            Self::Plain => false,
            Self::Unreadable => ASSUME_TAR_ON_SNIFF_FAILURE,
        }
    }
}

/// Source of decompressed bytes for codecs without an in-process decoder.
pub trait ExternalDecoder {
    /// Stream the decompressed contents of `path` produced by a tool from
    /// `format`'s extraction groups.
    fn decode(&self, path: &Path, format: &FormatDescriptor) -> io::Result<Box<dyn Read>>;
}

/// An [`ExternalDecoder`] that never has a tool to offer.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExternalDecoder;

impl ExternalDecoder for NoExternalDecoder {
    fn decode(&self, path: &Path, _format: &FormatDescriptor) -> io::Result<Box<dyn Read>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no external decoder for {}", path.display()),
        ))
    }
}

/// Whether the name alone marks a compressed tar.
pub fn named_as_tar(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|name| name.contains(TAR_NAME_MARKER))
}

/// Whether `header` carries one of the ustar magic values.
pub fn has_tar_magic(header: &[u8]) -> bool {
    header.len() >= TAR_BLOCK_LEN
        && TAR_MAGICS
            .iter()
            .any(|magic| header[MAGIC_OFFSET..].starts_with(magic))
}

/// Classify the payload of an ambiguous archive.
pub fn sniff(
    path: &Path,
    format: &FormatDescriptor,
    external: &dyn ExternalDecoder,
) -> SniffOutcome {
    if named_as_tar(path) {
        trace!(path = %path.display(), "tar marker in name");
        return SniffOutcome::Tar;
    }

    let header = match format.codec() {
        Some(codec) => read_header(path, codec, format, external),
        None => Err(io::Error::other(format!("{} has no codec", format.id))),
    };

    let outcome = match header {
        Ok(header) if header.len() < TAR_BLOCK_LEN => SniffOutcome::Plain,
        Ok(header) if has_tar_magic(&header) => SniffOutcome::Tar,
        Ok(_) => SniffOutcome::Plain,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "header unreadable");
            SniffOutcome::Unreadable
        }
    };
    debug!(path = %path.display(), ?outcome, "sniffed payload");
    outcome
}

/// [`sniff`], with unreadable headers resolved to the conservative default.
pub fn is_tar_payload(
    path: &Path,
    format: &FormatDescriptor,
    external: &dyn ExternalDecoder,
) -> bool {
    sniff(path, format, external).is_tar()
}

fn read_header(
    path: &Path,
    codec: Codec,
    format: &FormatDescriptor,
    external: &dyn ExternalDecoder,
) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    match codec.decoder(file) {
        Some(decoder) => read_block(decoder?),
        None => read_block(external.decode(path, format)?),
    }
}

/// Read up to one tar block, stopping early only at a clean end of stream.
fn read_block<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut block = vec![0u8; TAR_BLOCK_LEN];
    let mut filled = 0;
    while filled < TAR_BLOCK_LEN {
        match reader.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    block.truncate(filled);
    Ok(block)
}
