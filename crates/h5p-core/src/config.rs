//! Archive configuration.
//!
//! Settings come from three layers, lowest first: built-in defaults, an
//! optional TOML file and `H5P_*` environment variables.
//!
//! ```toml
//! library_prefixes = ["H5P.", "Quiz."]
//! compression = "stored"
//! strict = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding comma separated library prefixes.
pub const ENV_LIBRARY_PREFIXES: &str = "H5P_LIBRARY_PREFIXES";
/// Environment variable turning strict reading on (`1` or `true`).
pub const ENV_STRICT: &str = "H5P_STRICT";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How archive entries are compressed when writing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No compression.
    Stored,
    /// Deflate, the format H5P players expect.
    #[default]
    Deflated,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Self::Stored => zip::CompressionMethod::Stored,
            Self::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Settings shared by the archive reader and writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Top-level directory prefixes whose plain files are library files.
    pub library_prefixes: Vec<String>,
    /// Compression used for written entries.
    pub compression: Compression,
    /// Fail on unrecognised entries instead of ignoring them.
    pub strict: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            library_prefixes: vec!["H5P.".to_string()],
            compression: Compression::default(),
            strict: false,
        }
    }
}

impl ArchiveConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a valid configuration.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Overlay the `H5P_*` environment variables.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary key lookup.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(prefixes) = lookup(ENV_LIBRARY_PREFIXES) {
            self.library_prefixes = prefixes
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(strict) = lookup(ENV_STRICT) {
            self.strict = strict == "1" || strict.eq_ignore_ascii_case("true");
        }
        self
    }

    /// Add a library prefix.
    #[must_use]
    pub fn with_library_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.library_prefixes.push(prefix.into());
        self
    }

    /// Set the compression method.
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Whether a top-level directory is treated as a library directory.
    pub fn is_library_dir(&self, name: &str) -> bool {
        self.library_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}
