//! Static description of an archive format and the tools that handle it.

use crate::codec::Codec;

/// One position in a tool's argument vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Fixed argument, e.g. a subcommand like `a` or `x`.
    Lit(&'static str),
    /// Group defaults followed by the sanitized user flags.
    Flags,
    /// The archive path.
    Archive,
    /// Every input file, in order.
    Files,
}

/// How a tool is told where to put extracted files.
///
/// `Prefixed` and `Equals` are emitted right after the flags slot,
/// `Separate` and `Trailing` at the very end of the argument vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputConvention {
    /// `-oPATH`
    Prefixed(&'static str),
    /// `-C PATH`, `-d PATH`, `-to PATH`
    Separate(&'static str),
    /// `PATH` as the last argument.
    Trailing,
    /// `--output=PATH`
    Equals(&'static str),
}

impl OutputConvention {
    /// Arguments that carry `dir` under this convention.
    pub fn render(self, dir: &str) -> Vec<String> {
        match self {
            Self::Prefixed(flag) => vec![format!("{flag}{dir}")],
            Self::Separate(flag) => vec![flag.to_string(), dir.to_string()],
            Self::Trailing => vec![dir.to_string()],
            Self::Equals(flag) => vec![format!("{flag}={dir}")],
        }
    }

    /// Whether the directory goes at the end rather than after the flags.
    pub fn is_trailing(self) -> bool {
        matches!(self, Self::Separate(_) | Self::Trailing)
    }
}

/// Interchangeable binaries implementing one strategy for a format.
///
/// The first binary found on the host wins; the template and output
/// convention apply to whichever one is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolGroup {
    pub tools: &'static [&'static str],
    pub template: &'static [Slot],
    /// Flags always passed ahead of the user's, e.g. `-r`.
    pub defaults: &'static [&'static str],
    pub output: Option<OutputConvention>,
    /// The tool writes its result to stdout; the caller redirects it.
    pub stdout: bool,
}

impl ToolGroup {
    pub const fn new(tools: &'static [&'static str], template: &'static [Slot]) -> Self {
        Self {
            tools,
            template,
            defaults: &[],
            output: None,
            stdout: false,
        }
    }

    pub const fn defaults(mut self, defaults: &'static [&'static str]) -> Self {
        self.defaults = defaults;
        self
    }

    pub const fn output(mut self, convention: OutputConvention) -> Self {
        self.output = Some(convention);
        self
    }

    pub const fn to_stdout(mut self) -> Self {
        self.stdout = true;
        self
    }
}

/// Structural kind of a format, which drives how commands are built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatKind {
    /// A tar stream run through an external compressor.
    CompressedTar {
        /// Tar's own switch for this codec, when tar has one.
        builtin_flag: Option<&'static str>,
    },
    /// An uncompressed tar archive.
    PlainTar,
    /// A compressor that natively handles exactly one file.
    SingleFile { codec: Codec, ambiguous: bool },
    /// A self-contained archiver: 7z, zip, rar and friends.
    Container,
}

/// Extraction that needs two processes connected by a pipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pipeline {
    /// The format's extraction group streams to stdout, tar reads stdin.
    DecompressIntoTar,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub id: &'static str,
    /// Lower-case filename suffixes; the first one is the canonical extension.
    pub patterns: &'static [&'static str],
    pub kind: FormatKind,
    pub compress: &'static [ToolGroup],
    pub extract: &'static [ToolGroup],
    pub pipeline: Option<Pipeline>,
    pub fallback: Option<&'static str>,
}

impl FormatDescriptor {
    pub fn is_tar_based(&self) -> bool {
        matches!(
            self.kind,
            FormatKind::CompressedTar { .. } | FormatKind::PlainTar
        )
    }

    pub fn single_file(&self) -> bool {
        matches!(self.kind, FormatKind::SingleFile { .. })
    }

    pub fn ambiguous(&self) -> bool {
        matches!(
            self.kind,
            FormatKind::SingleFile {
                ambiguous: true,
                ..
            }
        )
    }

    pub fn codec(&self) -> Option<Codec> {
        match self.kind {
            FormatKind::SingleFile { codec, .. } => Some(codec),
            _ => None,
        }
    }

    /// The canonical extension, including the leading dot.
    pub fn extension(&self) -> &'static str {
        self.patterns[0]
    }

    /// The pattern `name` ends with, compared case-insensitively.
    pub fn matched_suffix(&self, name: &str) -> Option<&'static str> {
        let lower = name.to_ascii_lowercase();
        self.patterns
            .iter()
            .copied()
            .find(|pattern| lower.ends_with(pattern))
    }

    /// `name` with the matched suffix removed, preserving the original case.
    pub fn strip_suffix<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.matched_suffix(name)
            .map(|suffix| &name[..name.len() - suffix.len()])
    }
}
