use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use archer_plan::Synthesizer;
use archer_tool::ToolResolver;
use tracing::info;

#[derive(Debug, clap::Args)]
pub struct Compress {
    /// Archive to create; its extension picks the format
    pub archive: String,

    /// Files and directories to add
    #[arg(required_unless_present = "auto_name")]
    pub files: Vec<String>,

    /// Name the archive `<dir>.zip` after the working directory and treat
    /// every path as an input
    #[arg(long)]
    pub auto_name: bool,

    /// Extra flag passed to the archiver, once per flag
    #[arg(
        short = 'F',
        long = "flag",
        value_name = "FLAG",
        allow_hyphen_values = true
    )]
    pub flags: Vec<String>,

    /// Directory the archiver runs in
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

impl Compress {
    pub fn run(self, resolver: &ToolResolver) -> anyhow::Result<()> {
        let cwd = match self.cwd {
            Some(cwd) => cwd,
            None => env::current_dir().context("failed to read current directory")?,
        };

        let (archive, files) = if self.auto_name {
            let mut files = self.files;
            files.insert(0, self.archive);
            (default_archive_name(&cwd)?, files)
        } else {
            (self.archive, self.files)
        };

        let synth = Synthesizer::new(resolver);
        let plan = synth.compress(&archive, &self.flags, &files)?;

        if self.dry_run {
            println!("{plan}");
            return Ok(());
        }

        info!(%plan, "compressing");
        let status = plan
            .run(&cwd)
            .with_context(|| format!("failed to compress {archive}"))?;
        if !status.success() {
            bail!("{} exited with {status}", plan.last().program.display());
        }
        Ok(())
    }
}

/// `<dir>.zip`, named after the last component of `dir`.
fn default_archive_name(dir: &Path) -> anyhow::Result<String> {
    match dir.file_name() {
        Some(name) => Ok(format!("{}.zip", name.to_string_lossy())),
        None => bail!("cannot name an archive after {}", dir.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_archive_name() {
        assert_eq!(
            default_archive_name(Path::new("/home/me/photos")).unwrap(),
            "photos.zip"
        );
        assert_eq!(
            default_archive_name(Path::new("reports.2024")).unwrap(),
            "reports.2024.zip"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_default_archive_name_for_root() {
        assert!(default_archive_name(Path::new("/")).is_err());
    }
}
