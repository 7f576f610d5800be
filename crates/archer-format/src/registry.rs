//! The ordered table of every archive format archer knows about.
//!
//! Lookup walks [`FORMATS`] in order and stops at the first descriptor with a
//! matching suffix, so compound tar suffixes are registered ahead of the bare
//! compressor suffixes they end with.

use crate::codec::Codec;
use crate::descriptor::{
    FormatDescriptor, FormatKind, OutputConvention, Pipeline, Slot, ToolGroup,
};

use Slot::{Archive, Files, Flags, Lit};

/// Binaries accepted as tar.
pub const TAR_TOOLS: &[&str] = &["tar", "gtar", "bsdtar"];
const SEVEN_ZIP: &[&str] = &["7z", "7za", "7zz"];

/// Tar flag naming an external compression program.
pub const USE_COMPRESS_PROGRAM: &str = "--use-compress-program";

/// `tar -cf ARCHIVE FLAGS FILES`
pub const TAR_CREATE: ToolGroup = ToolGroup::new(TAR_TOOLS, &[Lit("-cf"), Archive, Flags, Files]);

/// `tar -xf ARCHIVE FLAGS [-C DIR]`; tar detects the compression itself.
pub const TAR_EXTRACT: ToolGroup = ToolGroup::new(TAR_TOOLS, &[Lit("-xf"), Archive, Flags])
    .output(OutputConvention::Separate("-C"));

/// `tar -xf - FLAGS [-C DIR]`, the reading end of a pipeline.
pub const TAR_EXTRACT_STDIN: ToolGroup = ToolGroup::new(TAR_TOOLS, &[Lit("-xf"), Lit("-"), Flags])
    .output(OutputConvention::Separate("-C"));

const SEVEN_ZIP_ADD: ToolGroup =
    ToolGroup::new(SEVEN_ZIP, &[Lit("a"), Flags, Archive, Files]).defaults(&["-r"]);
const SEVEN_ZIP_EXTRACT: ToolGroup =
    ToolGroup::new(SEVEN_ZIP, &[Lit("x"), Flags, Archive]).output(OutputConvention::Prefixed("-o"));
const UNZIP: ToolGroup =
    ToolGroup::new(&["unzip"], &[Flags, Archive]).output(OutputConvention::Separate("-d"));

const RAR_ADD: ToolGroup =
    ToolGroup::new(&["rar"], &[Lit("a"), Flags, Archive, Files]).defaults(&["-r"]);
const RAR_EXTRACT: ToolGroup = ToolGroup::new(&["rar", "unrar"], &[Lit("x"), Flags, Archive])
    .output(OutputConvention::Trailing);
const ZIP_ADD: ToolGroup = ToolGroup::new(&["zip"], &[Flags, Archive, Files]).defaults(&["-r"]);
const ZPAQ_ADD: ToolGroup = ToolGroup::new(&["zpaq"], &[Lit("a"), Archive, Files, Flags]);
const ZPAQ_EXTRACT: ToolGroup = ToolGroup::new(&["zpaq"], &[Lit("x"), Archive, Flags])
    .output(OutputConvention::Separate("-to"));
const LHA_ADD: ToolGroup = ToolGroup::new(&["jlha", "lha"], &[Lit("a"), Archive, Files]);
const JLHA_EXTRACT: ToolGroup =
    ToolGroup::new(&["jlha"], &[Lit("x"), Flags, Archive]).output(OutputConvention::Equals("-w"));
const LHA_EXTRACT: ToolGroup =
    ToolGroup::new(&["lha"], &[Lit("x"), Flags, Archive]).output(OutputConvention::Equals("w"));
const AR_EXTRACT: ToolGroup = ToolGroup::new(&["ar"], &[Lit("xv"), Flags, Archive])
    .output(OutputConvention::Equals("--output"));

/// Generic archivers tried when nothing else can handle an archive.
pub const LAST_RESORT_EXTRACT: &[ToolGroup] = &[SEVEN_ZIP_EXTRACT, UNZIP];

const TAR_ONLY: &[ToolGroup] = &[TAR_EXTRACT];

const fn compress_stdout(tools: &'static [&'static str]) -> ToolGroup {
    ToolGroup::new(tools, &[Lit("-c"), Flags, Files]).to_stdout()
}

const fn decompress_stdout(tools: &'static [&'static str]) -> ToolGroup {
    ToolGroup::new(tools, &[Lit("-dc"), Flags, Archive]).to_stdout()
}

const BZIP2: &[&str] = &["pbzip2", "lbzip2", "bzip2"];
const GZIP: &[&str] = &["pigz", "gzip"];
const LZIP: &[&str] = &["plzip", "lzip"];

/// Every registered format, in lookup order.
pub static FORMATS: &[FormatDescriptor] = &[
    FormatDescriptor {
        id: "tar.bz2",
        patterns: &[".tar.bz2", ".tar.bz", ".tbz2", ".tbz"],
        kind: FormatKind::CompressedTar {
            builtin_flag: Some("-j"),
        },
        compress: &[ToolGroup::new(BZIP2, &[])],
        extract: TAR_ONLY,
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "tar.gz",
        patterns: &[".tar.gz", ".tar.z", ".tgz", ".taz"],
        kind: FormatKind::CompressedTar {
            builtin_flag: Some("-z"),
        },
        compress: &[ToolGroup::new(GZIP, &[])],
        extract: TAR_ONLY,
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "tar.xz",
        patterns: &[".tar.xz", ".tar.lzma", ".txz", ".tlz"],
        kind: FormatKind::CompressedTar {
            builtin_flag: Some("-J"),
        },
        compress: &[ToolGroup::new(&["pixz", "xz"], &[])],
        extract: TAR_ONLY,
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "tar.lz4",
        patterns: &[".tar.lz4"],
        kind: FormatKind::CompressedTar { builtin_flag: None },
        compress: &[ToolGroup::new(&["lz4"], &[])],
        extract: &[decompress_stdout(&["lz4"])],
        pipeline: Some(Pipeline::DecompressIntoTar),
        fallback: None,
    },
    FormatDescriptor {
        id: "tar.lrz",
        patterns: &[".tar.lrz"],
        kind: FormatKind::CompressedTar { builtin_flag: None },
        compress: &[ToolGroup::new(&["lrzip"], &[])],
        extract: &[decompress_stdout(&["lrzip"])],
        pipeline: Some(Pipeline::DecompressIntoTar),
        fallback: None,
    },
    FormatDescriptor {
        id: "tar.lz",
        patterns: &[".tar.lz"],
        kind: FormatKind::CompressedTar { builtin_flag: None },
        compress: &[ToolGroup::new(LZIP, &[])],
        extract: TAR_ONLY,
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "tar.lzop",
        patterns: &[".tar.lzop", ".tar.lzo", ".tzo"],
        kind: FormatKind::CompressedTar { builtin_flag: None },
        compress: &[ToolGroup::new(&["lzop"], &[])],
        extract: TAR_ONLY,
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "tar.zst",
        patterns: &[".tar.zst", ".tzst"],
        kind: FormatKind::CompressedTar { builtin_flag: None },
        compress: &[ToolGroup::new(&["zstd"], &[])],
        extract: TAR_ONLY,
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "tar",
        patterns: &[".tar"],
        kind: FormatKind::PlainTar,
        compress: &[TAR_CREATE, SEVEN_ZIP_ADD.defaults(&[])],
        extract: &[TAR_EXTRACT, SEVEN_ZIP_EXTRACT],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "bz2",
        patterns: &[".bz2", ".bz"],
        kind: FormatKind::SingleFile {
            codec: Codec::Bzip2,
            ambiguous: true,
        },
        compress: &[compress_stdout(BZIP2)],
        extract: &[decompress_stdout(&["bzip2", "pbzip2", "lbzip2"])],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "gz",
        patterns: &[".gz", ".z"],
        kind: FormatKind::SingleFile {
            codec: Codec::Gzip,
            ambiguous: true,
        },
        compress: &[compress_stdout(GZIP)],
        extract: &[decompress_stdout(&["gzip", "pigz"])],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "xz",
        patterns: &[".xz", ".lzma"],
        kind: FormatKind::SingleFile {
            codec: Codec::Xz,
            ambiguous: true,
        },
        compress: &[compress_stdout(&["xz"])],
        extract: &[decompress_stdout(&["xz"])],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "lz",
        patterns: &[".lz"],
        kind: FormatKind::SingleFile {
            codec: Codec::Lzip,
            ambiguous: true,
        },
        compress: &[compress_stdout(LZIP)],
        extract: &[decompress_stdout(&["lzip", "plzip"])],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "lzop",
        patterns: &[".lzop", ".lzo"],
        kind: FormatKind::SingleFile {
            codec: Codec::Lzop,
            ambiguous: true,
        },
        compress: &[compress_stdout(&["lzop"])],
        extract: &[decompress_stdout(&["lzop"])],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "zst",
        patterns: &[".zst"],
        kind: FormatKind::SingleFile {
            codec: Codec::Zstd,
            ambiguous: true,
        },
        compress: &[compress_stdout(&["zstd"])],
        extract: &[decompress_stdout(&["zstd"])],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "7z",
        patterns: &[".7z"],
        kind: FormatKind::Container,
        compress: &[SEVEN_ZIP_ADD],
        extract: &[SEVEN_ZIP_EXTRACT],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "rar",
        patterns: &[".rar"],
        kind: FormatKind::Container,
        compress: &[RAR_ADD],
        extract: &[RAR_EXTRACT, SEVEN_ZIP_EXTRACT],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "zip",
        patterns: &[".zip"],
        kind: FormatKind::Container,
        compress: &[ZIP_ADD],
        extract: &[SEVEN_ZIP_EXTRACT, UNZIP],
        pipeline: None,
        fallback: Some("7z"),
    },
    FormatDescriptor {
        id: "zpaq",
        patterns: &[".zpaq"],
        kind: FormatKind::Container,
        compress: &[ZPAQ_ADD],
        extract: &[ZPAQ_EXTRACT],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "lha",
        patterns: &[".lzh", ".lha"],
        kind: FormatKind::Container,
        compress: &[LHA_ADD],
        extract: &[JLHA_EXTRACT, LHA_EXTRACT, SEVEN_ZIP_EXTRACT],
        pipeline: None,
        fallback: None,
    },
    FormatDescriptor {
        id: "deb",
        patterns: &[".deb"],
        kind: FormatKind::Container,
        compress: &[],
        extract: &[AR_EXTRACT, SEVEN_ZIP_EXTRACT],
        pipeline: None,
        fallback: None,
    },
];

/// Id of the format used when a name matches nothing or nothing is installed.
pub const GENERIC_FALLBACK: &str = "zip";

/// Find the first registered format whose pattern ends `filename`.
///
/// Only the final path component is considered, case-insensitively.
pub fn find_format(filename: &str) -> Option<&'static FormatDescriptor> {
    let name = basename(filename).to_ascii_lowercase();
    FORMATS
        .iter()
        .find(|format| format.patterns.iter().any(|p| name.ends_with(p)))
}

pub fn by_id(id: &str) -> Option<&'static FormatDescriptor> {
    FORMATS.iter().find(|format| format.id == id)
}

pub fn generic_fallback() -> &'static FormatDescriptor {
    by_id(GENERIC_FALLBACK).expect("generic fallback format is registered")
}

/// Name a multi-file archive gets when a single-file format was requested:
/// `.tar` goes in front of the matched suffix (`note.gz` → `note.tar.gz`).
pub fn tar_compound_name(format: &FormatDescriptor, name: &str) -> Option<String> {
    let suffix = format.matched_suffix(name)?;
    let stem = &name[..name.len() - suffix.len()];
    Some(format!("{stem}.tar{}", &name[stem.len()..]))
}

/// Uncompressed tar name for a compressed tar archive (`a.tar.zst` → `a.tar`,
/// `a.tzo` → `a.tar`).
pub fn plain_tar_name(format: &FormatDescriptor, name: &str) -> String {
    let stem = format.strip_suffix(name).unwrap_or(name);
    format!("{stem}.tar")
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
