//! h5p - H5P package toolkit CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use h5p_cli::{Cli, Commands, cmd, load_config};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { file } => cmd::inspect::inspect(&file, &config),
        Commands::Validate { path, json } => cmd::validate::validate(&path, json, &config),
        Commands::Questions { file } => cmd::questions::questions(&file),
        Commands::Extract { file, dest } => cmd::extract::extract(&file, &dest),
        Commands::Pack {
            dir,
            output,
            stored,
            force,
        } => cmd::pack::pack(&dir, &output, stored, force, config),
    }
}
