use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use archer_plan::{Synthesizer, archive_stem};
use archer_tool::ToolResolver;
use tracing::{error, info};

#[derive(Debug, clap::Args)]
pub struct Extract {
    /// Archives to unpack, one job each
    #[arg(required = true)]
    pub archives: Vec<String>,

    /// Directory to unpack into, created if missing
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Unpack each archive into a directory named after it
    #[arg(long)]
    pub to_dirs: bool,

    /// Extra flag passed to the extractor, once per flag
    #[arg(
        short = 'F',
        long = "flag",
        value_name = "FLAG",
        allow_hyphen_values = true
    )]
    pub flags: Vec<String>,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

impl Extract {
    pub fn run(self, resolver: &ToolResolver) -> anyhow::Result<()> {
        let synth = Synthesizer::new(resolver);
        let cwd = env::current_dir().context("failed to read current directory")?;

        let mut failed = 0;
        for archive in &self.archives {
            match self.extract_one(&synth, &cwd, archive) {
                Ok(()) => {}
                Err(err) if self.archives.len() == 1 => return Err(err),
                Err(err) => {
                    error!(%archive, "{err:#}");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            bail!(
                "{failed} of {} archives failed to extract",
                self.archives.len()
            );
        }
        Ok(())
    }

    fn extract_one(
        &self,
        synth: &Synthesizer<'_>,
        cwd: &Path,
        archive: &str,
    ) -> anyhow::Result<()> {
        let dest = self.destination(archive);
        let plan = synth.extract(archive, &self.flags, dest.as_deref())?;

        if self.dry_run {
            println!("{plan}");
            return Ok(());
        }

        info!(%plan, "extracting");
        let status = plan
            .run(cwd)
            .with_context(|| format!("failed to extract {archive}"))?;
        if !status.success() {
            bail!("{} exited with {status}", plan.last().program.display());
        }
        Ok(())
    }

    fn destination(&self, archive: &str) -> Option<PathBuf> {
        match (&self.output, self.to_dirs) {
            (Some(output), true) => Some(output.join(archive_stem(archive))),
            (None, true) => Some(PathBuf::from(archive_stem(archive))),
            (output, false) => output.clone(),
        }
    }
}
