use archer_format::registry::{TAR_CREATE, TAR_TOOLS, USE_COMPRESS_PROGRAM};
use archer_format::{
    FormatDescriptor, FormatKind, by_id, find_format, generic_fallback, plain_tar_name,
    tar_compound_name,
};
use archer_tool::ResolvedTool;
use tracing::debug;

use crate::error::Result;
use crate::plan::CommandPlan;
use crate::synthesizer::{Synthesizer, no_tool};
use crate::template::{Args, merged_flags, render};

struct Request<'a> {
    flags: &'a [&'a str],
    files: &'a [String],
}

impl Synthesizer<'_> {
    /// Plan the creation of `name` from `files`.
    ///
    /// An unrecognized name is archived with the generic format, its extension
    /// appended. The requested name can also change when a single-file format
    /// gets several inputs (`note.gz` → `note.tar.gz`) or when the installed
    /// tar cannot drive the compressor (`a.tar.zst` → `a.tar`).
    pub fn compress<F, P>(&self, name: &str, flags: &[F], files: &[P]) -> Result<CommandPlan>
    where
        F: AsRef<str>,
        P: AsRef<str>,
    {
        let flags: Vec<&str> = flags.iter().map(AsRef::as_ref).collect();
        let files: Vec<String> = files.iter().map(|f| f.as_ref().to_string()).collect();
        let request = Request {
            flags: &flags,
            files: &files,
        };

        let (format, target) = match find_format(name) {
            Some(format) => (format, name.to_string()),
            None => {
                let generic = generic_fallback();
                debug!(name, fallback = generic.id, "no format matches name");
                (generic, generic_name(generic, name))
            }
        };

        self.compress_chain(format, &target, &request)
            .ok_or_else(|| no_tool(name))
    }

    fn compress_chain(
        &self,
        format: &FormatDescriptor,
        target: &str,
        req: &Request<'_>,
    ) -> Option<CommandPlan> {
        if let Some(plan) = self.compress_as(format, target, req) {
            return Some(plan);
        }

        if let Some(fallback) = format.fallback.and_then(by_id) {
            debug!(
                format = format.id,
                fallback = fallback.id,
                "trying fallback format"
            );
            if let Some(plan) = self.compress_as(fallback, target, req) {
                return Some(plan);
            }
        }

        let generic = generic_fallback();
        if format.id == generic.id {
            return None;
        }
        let target = generic_name(generic, target);
        debug!(
            format = format.id,
            target = %target,
            "no compressor installed, using generic format"
        );
        self.compress_chain(generic, &target, req)
    }

    fn compress_as(
        &self,
        format: &FormatDescriptor,
        target: &str,
        req: &Request<'_>,
    ) -> Option<CommandPlan> {
        match format.kind {
            FormatKind::SingleFile { .. } => {
                let (tool, group) = self.resolver.find_tool_group(format.compress)?;
                if req.files.len() == 1 {
                    let flags = merged_flags(group, &tool, req.flags);
                    let invocation = render(
                        group,
                        &tool,
                        Args {
                            flags,
                            archive: target,
                            files: req.files,
                            dest: None,
                        },
                    );
                    return Some(CommandPlan::Single(invocation.stdout_to(target)));
                }

                let compound = tar_compound_name(format, target)?;
                let tar_format = find_format(&compound)?;
                debug!(
                    requested = target,
                    target = %compound,
                    files = req.files.len(),
                    "several inputs, archiving as tar"
                );
                self.compressed_tar(tar_format, &compound, &tool, req)
            }
            FormatKind::CompressedTar { .. } => {
                let (compressor, _) = self.resolver.find_tool_group(format.compress)?;
                self.compressed_tar(format, target, &compressor, req)
            }
            FormatKind::PlainTar | FormatKind::Container => {
                let (tool, group) = self.resolver.find_tool_group(format.compress)?;
                let flags = merged_flags(group, &tool, req.flags);
                Some(CommandPlan::Single(render(
                    group,
                    &tool,
                    Args {
                        flags,
                        archive: target,
                        files: req.files,
                        dest: None,
                    },
                )))
            }
        }
    }

    /// `tar -cf` with `compressor` as the external compression program,
    /// degrading to tar's own codec switch or to an uncompressed tar.
    fn compressed_tar(
        &self,
        format: &FormatDescriptor,
        target: &str,
        compressor: &ResolvedTool,
        req: &Request<'_>,
    ) -> Option<CommandPlan> {
        let tar = self.resolver.find_tool(TAR_TOOLS)?;
        let builtin = match format.kind {
            FormatKind::CompressedTar { builtin_flag } => builtin_flag,
            _ => None,
        };

        let mut flags = Vec::new();
        let mut target = target.to_string();
        if tar.supports(USE_COMPRESS_PROGRAM) {
            flags.push(format!("{USE_COMPRESS_PROGRAM}={}", compressor.path_str()));
        } else if let Some(flag) = builtin {
            debug!(
                tar = %tar.name,
                flag,
                "tar cannot run an external compressor, using its own"
            );
            flags.push(flag.to_string());
        } else {
            target = plain_tar_name(format, &target);
            debug!(
                tar = %tar.name,
                compressor = %compressor.name,
                target = %target,
                "tar cannot drive compressor, writing plain tar"
            );
        }
        flags.extend(tar.sanitize(req.flags));

        Some(CommandPlan::Single(render(
            &TAR_CREATE,
            &tar,
            Args {
                flags,
                archive: &target,
                files: req.files,
                dest: None,
            },
        )))
    }
}

fn generic_name(generic: &FormatDescriptor, name: &str) -> String {
    match generic.matched_suffix(name) {
        Some(_) => name.to_string(),
        None => format!("{name}{}", generic.extension()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_name_appends_once() {
        let zip = generic_fallback();
        assert_eq!(generic_name(zip, "photos"), "photos.zip");
        assert_eq!(generic_name(zip, "photos.rar"), "photos.rar.zip");
        assert_eq!(generic_name(zip, "photos.ZIP"), "photos.ZIP");
    }
}
