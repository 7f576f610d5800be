use archer_format::{Slot, ToolGroup};
use archer_tool::ResolvedTool;

use crate::plan::Invocation;

/// Values substituted into a tool group's slots.
#[derive(Debug, Default)]
pub(crate) struct Args<'a> {
    pub flags: Vec<String>,
    pub archive: &'a str,
    pub files: &'a [String],
    pub dest: Option<&'a str>,
}

/// Expand `group`'s template for `tool`.
///
/// The destination, when given, is placed according to the group's output
/// convention: right after the flags, or at the end of the argument vector.
pub(crate) fn render(group: &ToolGroup, tool: &ResolvedTool, args: Args<'_>) -> Invocation {
    let dest = args
        .dest
        .and_then(|dir| group.output.map(|convention| (convention, dir)));
    let mut argv = Vec::new();
    let mut dest_placed = false;

    for slot in group.template {
        match slot {
            Slot::Lit(lit) => argv.push(lit.to_string()),
            Slot::Flags => {
                argv.extend(args.flags.iter().cloned());
                if let Some((convention, dir)) = dest {
                    if !convention.is_trailing() {
                        argv.extend(convention.render(dir));
                        dest_placed = true;
                    }
                }
            }
            Slot::Archive => argv.push(args.archive.to_string()),
            Slot::Files => argv.extend(args.files.iter().cloned()),
        }
    }

    if let Some((convention, dir)) = dest {
        if !dest_placed {
            argv.extend(convention.render(dir));
        }
    }

    Invocation::new(&tool.path, argv)
}

/// Group defaults followed by the user's flags, filtered for `tool`.
pub(crate) fn merged_flags<S: AsRef<str>>(
    group: &ToolGroup,
    tool: &ResolvedTool,
    user: &[S],
) -> Vec<String> {
    let merged: Vec<&str> = group
        .defaults
        .iter()
        .copied()
        .chain(user.iter().map(AsRef::as_ref))
        .collect();
    tool.sanitize(merged.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archer_format::OutputConvention;
    use archer_tool::{ToolFamily, Variant};
    use std::path::PathBuf;

    fn tool(name: &str, family: ToolFamily, variant: Variant) -> ResolvedTool {
        ResolvedTool {
            name: name.to_string(),
            path: PathBuf::from(format!("/usr/bin/{name}")),
            family,
            variant,
        }
    }

    const EXTRACT: &[Slot] = &[Slot::Lit("x"), Slot::Flags, Slot::Archive];

    fn extract(convention: OutputConvention, dest: Option<&str>) -> Vec<String> {
        let group = ToolGroup::new(&["t"], EXTRACT).output(convention);
        let t = tool("t", ToolFamily::Other, Variant::Unknown);
        render(
            &group,
            &t,
            Args {
                flags: vec!["-y".into()],
                archive: "a.bin",
                dest,
                ..Args::default()
            },
        )
        .args
    }

    #[test]
    fn test_prefixed_after_flags() {
        assert_eq!(
            extract(OutputConvention::Prefixed("-o"), Some("out")),
            ["x", "-y", "-oout", "a.bin"]
        );
    }

    #[test]
    fn test_equals_after_flags() {
        assert_eq!(
            extract(OutputConvention::Equals("--output"), Some("out")),
            ["x", "-y", "--output=out", "a.bin"]
        );
    }

    #[test]
    fn test_separate_at_end() {
        assert_eq!(
            extract(OutputConvention::Separate("-C"), Some("out")),
            ["x", "-y", "a.bin", "-C", "out"]
        );
    }

    #[test]
    fn test_trailing_at_end() {
        assert_eq!(
            extract(OutputConvention::Trailing, Some("out")),
            ["x", "-y", "a.bin", "out"]
        );
    }

    #[test]
    fn test_no_dest_no_flag() {
        for convention in [
            OutputConvention::Prefixed("-o"),
            OutputConvention::Equals("--output"),
            OutputConvention::Separate("-C"),
            OutputConvention::Trailing,
        ] {
            assert_eq!(extract(convention, None), ["x", "-y", "a.bin"]);
        }
    }

    #[test]
    fn test_dest_ignored_without_convention() {
        let group = ToolGroup::new(&["t"], EXTRACT);
        let t = tool("t", ToolFamily::Other, Variant::Unknown);
        let invocation = render(
            &group,
            &t,
            Args {
                archive: "a.bin",
                dest: Some("out"),
                ..Args::default()
            },
        );
        assert_eq!(invocation.args, ["x", "a.bin"]);
        assert_eq!(invocation.program, PathBuf::from("/usr/bin/t"));
    }

    #[test]
    fn test_merged_flags_sanitized() {
        let group = ToolGroup::new(&["7z"], &[]).defaults(&["-r"]);
        let alternate = tool("7z", ToolFamily::SevenZip, Variant::Alternate);
        assert_eq!(merged_flags(&group, &alternate, &["-mx9"]), ["-mx9"]);
        let reference = tool("7z", ToolFamily::SevenZip, Variant::Reference);
        assert_eq!(merged_flags(&group, &reference, &["-mx9"]), ["-r", "-mx9"]);
    }
}
