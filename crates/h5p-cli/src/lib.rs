//! h5p - inspect, validate, pack and extract H5P packages
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! # Commands
//!
//! - `inspect`: metadata, libraries and content files of an `.h5p` file.
//! - `validate`: run every package check, exit non-zero on violations.
//! - `questions`: summarise and check a question-set `content.json`.
//! - `extract` / `pack`: convert between `.h5p` files and directories.
//!
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=h5p_core=debug`).

pub mod cmd;
pub mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use h5p_core::ArchiveConfig;

#[derive(Debug, Parser)]
#[command(name = "h5p")]
#[command(author, version, about = "h5p - inspect, validate and build H5P packages")]
pub struct Cli {
    /// Archive settings file (TOML)
    #[arg(long, global = true, env = "H5P_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show metadata, libraries and files of a package
    Inspect {
        /// Path to an .h5p file
        file: PathBuf,
    },
    /// Validate a package
    Validate {
        /// Path to an .h5p file or an unpacked package directory
        path: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summarise and check a question-set content.json
    Questions {
        /// Path to a content.json file
        file: PathBuf,
    },
    /// Unpack a package into a directory
    Extract {
        /// Path to an .h5p file
        file: PathBuf,
        /// Destination directory
        dest: PathBuf,
    },
    /// Build a package from an unpacked directory
    Pack {
        /// Package directory (h5p.json, content/, libraries)
        dir: PathBuf,
        /// Output .h5p file
        output: PathBuf,
        /// Write entries without compression
        #[arg(long)]
        stored: bool,
        /// Save even if validation fails
        #[arg(long, short = 'f')]
        force: bool,
    },
}

/// Defaults, then the config file if given, then `H5P_*` variables.
pub fn load_config(path: Option<&Path>) -> Result<ArchiveConfig> {
    let config = match path {
        Some(path) => ArchiveConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ArchiveConfig::default(),
    };
    let config = config.with_env();
    tracing::debug!(?config, "archive config");
    Ok(config)
}
