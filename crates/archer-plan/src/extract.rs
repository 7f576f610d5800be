use std::fs;
use std::path::{Path, PathBuf};

use archer_format::registry::{LAST_RESORT_EXTRACT, TAR_EXTRACT, TAR_EXTRACT_STDIN, TAR_TOOLS};
use archer_format::{FormatDescriptor, Pipeline, by_id, find_format};
use tracing::debug;

use crate::error::{Error, Result};
use crate::plan::CommandPlan;
use crate::synthesizer::{Synthesizer, no_tool};
use crate::template::{Args, merged_flags, render};

struct Request<'a> {
    archive: &'a str,
    flags: &'a [&'a str],
    dest: Option<&'a str>,
    dest_dir: Option<&'a Path>,
}

impl Synthesizer<'_> {
    /// Plan the extraction of `archive`, into `dest_dir` when given.
    ///
    /// `dest_dir` is created here, before any tool runs.
    pub fn extract<F: AsRef<str>>(
        &self,
        archive: &str,
        flags: &[F],
        dest_dir: Option<&Path>,
    ) -> Result<CommandPlan> {
        if let Some(dir) = dest_dir {
            fs::create_dir_all(dir).map_err(|source| Error::DestinationDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let flags: Vec<&str> = flags.iter().map(AsRef::as_ref).collect();
        let dest = dest_dir.map(|dir| dir.to_string_lossy().into_owned());
        let request = Request {
            archive,
            flags: &flags,
            dest: dest.as_deref(),
            dest_dir,
        };

        let plan = match find_format(archive) {
            Some(format) => self.extract_as(format, &request),
            None => {
                debug!(archive, "no format matches name");
                None
            }
        };

        plan.or_else(|| self.last_resort(&request))
            .ok_or_else(|| no_tool(archive))
    }

    fn extract_as(&self, format: &FormatDescriptor, req: &Request<'_>) -> Option<CommandPlan> {
        if let Some(Pipeline::DecompressIntoTar) = format.pipeline {
            return self.decompress_into_tar(format, req);
        }

        if format.ambiguous() {
            return if self.sniff(Path::new(req.archive), format).is_tar() {
                self.tar_extract(req)
            } else {
                self.decompress_single(format, req)
            };
        }

        if let Some(plan) = self.extract_groups(format, req) {
            return Some(plan);
        }
        let fallback = format.fallback.and_then(by_id)?;
        debug!(
            format = format.id,
            fallback = fallback.id,
            "trying fallback format"
        );
        self.extract_groups(fallback, req)
    }

    fn extract_groups(&self, format: &FormatDescriptor, req: &Request<'_>) -> Option<CommandPlan> {
        let (tool, group) = self.resolver.find_tool_group(format.extract)?;
        let flags = merged_flags(group, &tool, req.flags);
        Some(CommandPlan::Single(render(
            group,
            &tool,
            Args {
                flags,
                archive: req.archive,
                dest: req.dest,
                ..Args::default()
            },
        )))
    }

    fn tar_extract(&self, req: &Request<'_>) -> Option<CommandPlan> {
        let tar = self.resolver.find_tool(TAR_TOOLS)?;
        Some(CommandPlan::Single(render(
            &TAR_EXTRACT,
            &tar,
            Args {
                flags: tar.sanitize(req.flags),
                archive: req.archive,
                dest: req.dest,
                ..Args::default()
            },
        )))
    }

    fn decompress_into_tar(
        &self,
        format: &FormatDescriptor,
        req: &Request<'_>,
    ) -> Option<CommandPlan> {
        let (tool, group) = self.resolver.find_tool_group(format.extract)?;
        let tar = self.resolver.find_tool(TAR_TOOLS)?;

        let producer = render(
            group,
            &tool,
            Args {
                archive: req.archive,
                ..Args::default()
            },
        );
        let consumer = render(
            &TAR_EXTRACT_STDIN,
            &tar,
            Args {
                flags: tar.sanitize(req.flags),
                dest: req.dest,
                ..Args::default()
            },
        );
        Some(CommandPlan::Pipeline { producer, consumer })
    }

    /// A bare compressed file: the decompressor writes the stem next to the
    /// archive, or into the destination directory.
    fn decompress_single(
        &self,
        format: &FormatDescriptor,
        req: &Request<'_>,
    ) -> Option<CommandPlan> {
        let (tool, group) = self.resolver.find_tool_group(format.extract)?;
        let flags = merged_flags(group, &tool, req.flags);
        let invocation = render(
            group,
            &tool,
            Args {
                flags,
                archive: req.archive,
                ..Args::default()
            },
        );
        Some(CommandPlan::Single(
            invocation.stdout_to(decompressed_path(format, req)),
        ))
    }

    fn last_resort(&self, req: &Request<'_>) -> Option<CommandPlan> {
        let (tool, group) = self.resolver.find_tool_group(LAST_RESORT_EXTRACT)?;
        debug!(archive = req.archive, tool = %tool.name, "using last resort extractor");
        Some(CommandPlan::Single(render(
            group,
            &tool,
            Args {
                archive: req.archive,
                dest: req.dest,
                ..Args::default()
            },
        )))
    }
}

/// The archive's file name without its format suffix (`pics.tar.gz` →
/// `pics`). Names no format matches lose their last extension only.
pub fn archive_stem(archive: &str) -> String {
    let name = file_name(archive);
    match find_format(&name) {
        Some(format) => stem(format, &name),
        None => Path::new(&name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or(name),
    }
}

fn file_name(archive: &str) -> String {
    Path::new(archive)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.to_string())
}

fn stem(format: &FormatDescriptor, name: &str) -> String {
    match format.strip_suffix(name) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{name}.out"),
    }
}

fn decompressed_path(format: &FormatDescriptor, req: &Request<'_>) -> PathBuf {
    let stem = stem(format, &file_name(req.archive));
    match (req.dest_dir, Path::new(req.archive).parent()) {
        (Some(dir), _) => dir.join(stem),
        (None, Some(parent)) => parent.join(stem),
        (None, None) => PathBuf::from(stem),
    }
}
