pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "bsync")]
#[command(about = "Sync file trees with remote buckets")]
pub struct Args {
    /// Bucket service URL (defaults to the configured remote)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the bsync config directory (defaults to ~/.bsync)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Run against a throwaway in-memory remote instead of a service
    #[arg(long, global = true, conflicts_with = "remote")]
    pub memory: bool,

    #[command(subcommand)]
    pub command: crate::Command,
}
