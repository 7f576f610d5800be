//! The synthesized command and how to run it.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// One process: a resolved program, its arguments and an optional stdout file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// File that receives the process's standard output.
    pub stdout: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stdout: None,
        }
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    fn command(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(cwd);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        if let Some(stdout) = &self.stdout {
            write!(f, " > {}", quote(&stdout.to_string_lossy()))?;
        }
        Ok(())
    }
}

/// What the synthesizer hands back: a single process, or a decompressor
/// whose stdout feeds the archiver's stdin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandPlan {
    Single(Invocation),
    Pipeline {
        producer: Invocation,
        consumer: Invocation,
    },
}

impl CommandPlan {
    /// The process whose exit status decides the outcome.
    pub fn last(&self) -> &Invocation {
        match self {
            Self::Single(invocation) => invocation,
            Self::Pipeline { consumer, .. } => consumer,
        }
    }

    /// A shell-like rendering for logs and dry runs.
    pub fn display(&self) -> String {
        self.to_string()
    }

    /// Execute the plan with `cwd` as working directory.
    ///
    /// Relative stdout targets are resolved against `cwd`. A pipeline reports
    /// the first failing stage, the consumer's status otherwise.
    pub fn run(&self, cwd: &Path) -> Result<ExitStatus> {
        debug!(plan = %self, cwd = %cwd.display(), "running");
        match self {
            Self::Single(invocation) => {
                let mut cmd = invocation.command(cwd);
                if let Some(path) = &invocation.stdout {
                    cmd.stdout(open_output(cwd, path)?);
                }
                cmd.status().map_err(|e| spawn_error(invocation, e))
            }
            Self::Pipeline { producer, consumer } => {
                let output = match &consumer.stdout {
                    Some(path) => Some(open_output(cwd, path)?),
                    None => None,
                };
                let mut upstream = producer
                    .command(cwd)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .spawn()
                    .map_err(|e| spawn_error(producer, e))?;

                let mut downstream = consumer.command(cwd);
                if let Some(pipe) = upstream.stdout.take() {
                    downstream.stdin(Stdio::from(pipe));
                }
                if let Some(file) = output {
                    downstream.stdout(file);
                }

                // The consumer must hold the only read end of the pipe.
                let spawned = downstream.spawn();
                drop(downstream);
                let consumer_status = match spawned.and_then(|mut child| child.wait()) {
                    Ok(status) => status,
                    Err(e) => {
                        let _ = upstream.kill();
                        let _ = upstream.wait();
                        return Err(spawn_error(consumer, e));
                    }
                };
                let producer_status = upstream.wait().map_err(|e| spawn_error(producer, e))?;

                if !producer_status.success() {
                    warn!(
                        program = %producer.program.display(),
                        status = %producer_status,
                        "pipeline producer failed"
                    );
                    return Ok(producer_status);
                }
                Ok(consumer_status)
            }
        }
    }
}

impl fmt::Display for CommandPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(invocation) => write!(f, "{invocation}"),
            Self::Pipeline { producer, consumer } => write!(f, "{producer} | {consumer}"),
        }
    }
}

fn open_output(cwd: &Path, path: &Path) -> Result<File> {
    let path = cwd.join(path);
    File::create(&path).map_err(|source| Error::Output { path, source })
}

fn spawn_error(invocation: &Invocation, source: std::io::Error) -> Error {
    Error::Spawn {
        program: invocation.program.clone(),
        source,
    }
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
