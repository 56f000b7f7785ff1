use std::path::PathBuf;

use clap::Parser;

use crate::{Commands, Config};

/// Main CLI application arguments and command structure
#[derive(Parser)]
#[clap(
    version,
    about = "Capture quotes in decorative fonts and keep them in a remote JSON bin"
)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory for local settings and the offline cache
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the bin API
    #[clap(long)]
    pub base_url: Option<String>,

    /// Bin holding the quotes
    #[clap(long)]
    pub bin_id: Option<String>,

    /// Use the local cache instead of fetching the remote bin
    #[clap(long)]
    pub offline: bool,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the quotebin application
    #[clap(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Applies command line overrides on top of file and environment configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(bin_id) = &self.bin_id {
            config.bin_id = Some(bin_id.clone());
        }
        config.normalize();
    }
}
