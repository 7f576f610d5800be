use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no command could be built for {archive}")]
    NoToolAvailable { archive: String },

    #[error("failed to create destination directory {path}: {source}")]
    DestinationDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open output file {path}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}
