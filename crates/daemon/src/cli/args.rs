pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "brainshare")]
#[command(about = "Store links, notes and uploads, and share them by link")]
pub struct Args {
    /// API server to talk to (defaults to localhost on the configured port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the brainshare config directory (defaults to ~/.brainshare)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Credential from `brainshare login`, sent with API requests
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
