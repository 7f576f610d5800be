//! Telling implementations of the same tool apart.
//!
//! GNU tar and bsdtar, p7zip and the upstream 7-Zip builds accept different
//! flags. The version banner decides which one is installed; anything that
//! cannot be probed is [`Variant::Unknown`] and gets the strictest flag filter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{trace, warn};

use crate::command::Command;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Which implementation of a tool family is installed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    /// GNU tar, p7zip, Info-ZIP.
    Reference,
    /// bsdtar/libarchive, upstream 7-Zip.
    Alternate,
    Unknown,
}

/// Tools whose flags differ between implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolFamily {
    Tar,
    SevenZip,
    Zip,
    Other,
}

impl ToolFamily {
    /// Family of a binary, judged by its file stem. Both `/` and `\\`
    /// separate path components.
    pub fn of(path: &Path) -> Self {
        let path = path.to_string_lossy();
        let file = path.rsplit(['/', '\\']).next().unwrap_or_default();
        let stem = match file.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => file,
        };
        match stem.to_ascii_lowercase().as_str() {
            "tar" | "gtar" | "bsdtar" => Self::Tar,
            "7z" | "7za" | "7zz" | "7zr" => Self::SevenZip,
            "zip" => Self::Zip,
            _ => Self::Other,
        }
    }

    /// Arguments that make the tool print its banner.
    pub fn version_args(self) -> &'static [&'static str] {
        match self {
            Self::Tar => &["--version"],
            Self::SevenZip => &[],
            Self::Zip => &["-v"],
            Self::Other => &["--version"],
        }
    }
}

static BANNERS: Lazy<Vec<(ToolFamily, Regex, Variant)>> = Lazy::new(|| {
    [
        (ToolFamily::Tar, r"(?i)\bGNU tar\b", Variant::Reference),
        (ToolFamily::Tar, r"(?i)\b(bsdtar|libarchive)\b", Variant::Alternate),
        (ToolFamily::SevenZip, r"(?i)\bp7zip\b", Variant::Reference),
        (ToolFamily::SevenZip, r"\b7-Zip\b", Variant::Alternate),
        (ToolFamily::Zip, r"This is Zip \d", Variant::Reference),
    ]
    .into_iter()
    .map(|(family, pattern, variant)| (family, Regex::new(pattern).unwrap(), variant))
    .collect()
});

/// Match a version banner against the known implementations of `family`.
pub fn classify_banner(family: ToolFamily, banner: &str) -> Variant {
    BANNERS
        .iter()
        .filter(|(f, _, _)| *f == family)
        .find(|(_, regex, _)| regex.is_match(banner))
        .map(|(_, _, variant)| *variant)
        .unwrap_or(Variant::Unknown)
}

/// Classification of a resolved binary.
pub trait VariantProbe {
    fn probe(&self, path: &Path, family: ToolFamily) -> Variant;
}

impl<P: VariantProbe + ?Sized> VariantProbe for Box<P> {
    fn probe(&self, path: &Path, family: ToolFamily) -> Variant {
        (**self).probe(path, family)
    }
}

/// Runs the tool's version query under a timeout.
///
/// Tools outside the known families are not run at all.
#[derive(Clone, Copy, Debug)]
pub struct VersionProbe {
    timeout: Duration,
}

impl Default for VersionProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl VersionProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl VariantProbe for VersionProbe {
    fn probe(&self, path: &Path, family: ToolFamily) -> Variant {
        if family == ToolFamily::Other {
            return Variant::Unknown;
        }

        let output = Command::new(path)
            .args(family.version_args())
            .env("LC_ALL", "C")
            .output_within(self.timeout);

        match output {
            Ok(output) => {
                let mut banner = String::from_utf8_lossy(&output.stdout).into_owned();
                banner.push_str(&String::from_utf8_lossy(&output.stderr));
                let variant = classify_banner(family, &banner);
                trace!(tool = %path.display(), ?family, ?variant, "classified");
                variant
            }
            Err(err) => {
                warn!(tool = %path.display(), error = %err, "version probe failed");
                Variant::Unknown
            }
        }
    }
}

/// Fixed classifications keyed by path; unlisted tools are `Unknown`.
#[derive(Clone, Debug, Default)]
pub struct StaticProbe {
    variants: HashMap<PathBuf, Variant>,
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, variant: Variant) -> Self {
        self.variants.insert(path.into(), variant);
        self
    }
}

impl VariantProbe for StaticProbe {
    fn probe(&self, path: &Path, _family: ToolFamily) -> Variant {
        self.variants
            .get(path)
            .copied()
            .unwrap_or(Variant::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(path: &str) -> ToolFamily {
        ToolFamily::of(Path::new(path))
    }

    #[test]
    fn family_by_stem() {
        assert_eq!(family("/usr/bin/tar"), ToolFamily::Tar);
        assert_eq!(family("/usr/local/bin/gtar"), ToolFamily::Tar);
        assert_eq!(family(r"C:\Tools\7z.exe"), ToolFamily::SevenZip);
        assert_eq!(
            family(r"C:\Program Files\Git\usr\bin\tar.EXE"),
            ToolFamily::Tar
        );
        assert_eq!(family("/usr/bin/7zz"), ToolFamily::SevenZip);
        assert_eq!(family("/usr/bin/zip"), ToolFamily::Zip);
        assert_eq!(family("/usr/bin/gzip"), ToolFamily::Other);
    }

    #[test]
    fn gnu_tar_banner() {
        let banner = "tar (GNU tar) 1.35\nCopyright (C) 2023 Free Software Foundation, Inc.";
        assert_eq!(classify_banner(ToolFamily::Tar, banner), Variant::Reference);
    }

    #[test]
    fn bsdtar_banner() {
        let banner = "bsdtar 3.7.2 - libarchive 3.7.2 zlib/1.2.12 liblzma/5.4.3";
        assert_eq!(classify_banner(ToolFamily::Tar, banner), Variant::Alternate);
    }

    #[test]
    fn busybox_tar_is_unknown() {
        let banner = "BusyBox v1.36.1 (2023-07-27) multi-call binary.";
        assert_eq!(classify_banner(ToolFamily::Tar, banner), Variant::Unknown);
    }

    #[test]
    fn p7zip_banner_wins_over_7zip() {
        let banner = concat!(
            "7-Zip [64] 16.02 : Copyright (c) 1999-2016 Igor Pavlov : 2016-05-21\n",
            "p7zip Version 16.02"
        );
        assert_eq!(
            classify_banner(ToolFamily::SevenZip, banner),
            Variant::Reference
        );
    }

    #[test]
    fn upstream_7zip_banner() {
        let banner = "7-Zip (z) 23.01 (x64) : Copyright (c) 1999-2023 Igor Pavlov : 2023-06-20";
        assert_eq!(
            classify_banner(ToolFamily::SevenZip, banner),
            Variant::Alternate
        );
    }

    #[test]
    fn info_zip_banner() {
        let banner = concat!(
            "Copyright (c) 1990-2008 Info-ZIP - Type 'zip \"-L\"' for software license.\n",
            "This is Zip 3.0 (July 5th 2008), by Info-ZIP."
        );
        assert_eq!(classify_banner(ToolFamily::Zip, banner), Variant::Reference);
    }

    #[test]
    fn banner_checked_against_own_family() {
        let banner = "tar (GNU tar) 1.35";
        assert_eq!(classify_banner(ToolFamily::Zip, banner), Variant::Unknown);
        assert_eq!(classify_banner(ToolFamily::Other, banner), Variant::Unknown);
    }

    #[test]
    fn unreadable_banner_is_unknown() {
        let banner = String::from_utf8_lossy(&[0xff, 0xfe, 0x00, 0x9c]).into_owned();
        assert_eq!(classify_banner(ToolFamily::Tar, &banner), Variant::Unknown);
    }

    #[test]
    fn missing_binary_is_unknown() {
        let probe = VersionProbe::new(Duration::from_millis(500));
        let variant = probe.probe(Path::new("/nonexistent/archer/tar"), ToolFamily::Tar);
        assert_eq!(variant, Variant::Unknown);
    }

    #[test]
    fn other_family_not_probed() {
        let probe = VersionProbe::default();
        assert_eq!(
            probe.probe(Path::new("/nonexistent/archer/gzip"), ToolFamily::Other),
            Variant::Unknown
        );
    }

    #[cfg(unix)]
    #[test]
    fn hanging_tool_times_out_to_unknown() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::Instant;

        let dir = tempfile::tempdir().unwrap();
        let tar = dir.path().join("tar");
        std::fs::write(&tar, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&tar, std::fs::Permissions::from_mode(0o755)).unwrap();

        let start = Instant::now();
        let variant = VersionProbe::new(Duration::from_millis(150)).probe(&tar, ToolFamily::Tar);
        assert_eq!(variant, Variant::Unknown);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn scripted_gnu_tar_is_reference() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tar = dir.path().join("tar");
        std::fs::write(&tar, "#!/bin/sh\necho 'tar (GNU tar) 1.34'\n").unwrap();
        std::fs::set_permissions(&tar, std::fs::Permissions::from_mode(0o755)).unwrap();

        let variant = VersionProbe::default().probe(&tar, ToolFamily::Tar);
        assert_eq!(variant, Variant::Reference);
    }
}
