use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed {
        cmd: PathBuf,
        source: std::io::Error,
    },

    #[error("command timed out after {after:?}: {cmd}")]
    Timeout { cmd: PathBuf, after: Duration },
}
