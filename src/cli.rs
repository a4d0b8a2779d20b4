use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Refresh citation counts and metadata in the publications file
    Citations {
        /// Publications file to update
        #[arg(long, value_name = "FILE", default_value = "assets/data/publications.json")]
        file: PathBuf,
    },
    /// Regenerate the sitemap from the tracked site files
    Sitemap {
        /// Site root directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        root: PathBuf,
        /// URL prefix for every sitemap entry
        #[arg(long, value_name = "URL", default_value = crate::sitemap::BASE_URL)]
        base_url: Url,
        /// Output path (defaults to <root>/sitemap.xml)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}
