//! Flag compatibility between tool implementations.
//!
//! Each `(family, variant)` row lists flags the implementation does not
//! understand. A rule with a substitute rewrites the flag; a rule without one
//! drops it. Flags are matched on the part before any `=`.

use tracing::debug;

use crate::variant::{ToolFamily, Variant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    pub flag: &'static str,
    pub substitute: Option<&'static str>,
}

const fn unsupported(flag: &'static str) -> Rule {
    Rule {
        flag,
        substitute: None,
    }
}

const fn replaced(flag: &'static str, substitute: &'static str) -> Rule {
    Rule {
        flag,
        substitute: Some(substitute),
    }
}

const TAR_ALTERNATE: &[Rule] = &[
    unsupported("--checkpoint"),
    unsupported("--checkpoint-action"),
    unsupported("--warning"),
    unsupported("--remove-files"),
    unsupported("--ignore-failed-read"),
    replaced("--overwrite", "-U"),
];

// Busybox, OpenBSD and other minimal tars.
const TAR_UNKNOWN: &[Rule] = &[
    unsupported("--checkpoint"),
    unsupported("--checkpoint-action"),
    unsupported("--warning"),
    unsupported("--remove-files"),
    unsupported("--ignore-failed-read"),
    unsupported("--overwrite"),
    unsupported("--use-compress-program"),
    unsupported("-I"),
    unsupported("--exclude-vcs"),
    unsupported("--sort"),
    replaced("--auto-compress", "-a"),
    replaced("--verbose", "-v"),
    replaced("--keep-old-files", "-k"),
];

const SEVEN_ZIP_ALTERNATE: &[Rule] = &[unsupported("-r")];

const SEVEN_ZIP_UNKNOWN: &[Rule] = &[
    unsupported("-r"),
    unsupported("-sdel"),
    unsupported("-stl"),
    unsupported("-snh"),
];

const ZIP_UNKNOWN: &[Rule] = &[
    unsupported("-FS"),
    unsupported("-MM"),
    replaced("--symlinks", "-y"),
];

/// The compatibility row for an implementation.
pub fn rules(family: ToolFamily, variant: Variant) -> &'static [Rule] {
    match (family, variant) {
        (ToolFamily::Tar, Variant::Alternate) => TAR_ALTERNATE,
        (ToolFamily::Tar, Variant::Unknown) => TAR_UNKNOWN,
        (ToolFamily::SevenZip, Variant::Alternate) => SEVEN_ZIP_ALTERNATE,
        (ToolFamily::SevenZip, Variant::Unknown) => SEVEN_ZIP_UNKNOWN,
        (ToolFamily::Zip, Variant::Alternate | Variant::Unknown) => ZIP_UNKNOWN,
        _ => &[],
    }
}

fn flag_name(flag: &str) -> &str {
    flag.split_once('=').map_or(flag, |(name, _)| name)
}

fn find_rule(rules: &[Rule], flag: &str) -> Option<Rule> {
    let name = flag_name(flag);
    rules.iter().copied().find(|rule| rule.flag == name)
}

/// Whether `flag` passes the compatibility row unchanged.
pub fn supports(family: ToolFamily, variant: Variant, flag: &str) -> bool {
    find_rule(rules(family, variant), flag).is_none()
}

/// Drop or rewrite every flag the implementation does not understand.
pub fn sanitize_flags<S: AsRef<str>>(
    family: ToolFamily,
    variant: Variant,
    flags: &[S],
) -> Vec<String> {
    let rules = rules(family, variant);
    let mut out = Vec::with_capacity(flags.len());

    for flag in flags {
        let flag = flag.as_ref();
        match find_rule(rules, flag) {
            None => out.push(flag.to_string()),
            Some(Rule {
                substitute: None,
                ..
            }) => {
                debug!(?family, ?variant, flag, "dropped unsupported flag");
            }
            Some(Rule {
                substitute: Some(substitute),
                ..
            }) => {
                debug!(?family, ?variant, flag, substitute, "substituted flag");
                // A short switch takes no `=value`, so the value is dropped.
                match flag.split_once('=') {
                    Some((_, value)) if substitute.starts_with("--") => {
                        out.push(format!("{substitute}={value}"))
                    }
                    _ => out.push(substitute.to_string()),
                }
            }
        }
    }

    out
}
