mod compress;
mod extract;

use clap::{ArgAction, Parser, Subcommand};

pub use compress::Compress;
pub use extract::Extract;

#[derive(Debug, Parser)]
#[command(
    name = "archer",
    version,
    about = "Compress and extract archives with whichever tools are installed"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an archive from files
    Compress(Compress),
    /// Unpack archives
    #[command(visible_alias = "decompress")]
    Extract(Extract),
}
