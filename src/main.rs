use clap::Parser;

use crate::cli::{Cli, Command};

mod cli;
mod identifier;
mod inspire;
mod merge;
mod publication;
mod resolver;
mod sitemap;
mod throttle;
mod update;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    match args.command {
        Command::Citations { file } => update::run(&file),
        Command::Sitemap {
            root,
            base_url,
            out,
        } => sitemap::run(&root, &base_url, out.as_deref()),
    }
    Ok(())
}
