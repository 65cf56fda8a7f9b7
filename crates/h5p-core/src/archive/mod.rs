//! Archive IO - `.h5p` files and unpacked directories

pub mod directory;
pub mod layout;
pub mod reader;
pub mod writer;

use std::io;

use thiserror::Error;

use crate::package::{Package, PackageError};

pub use directory::{ExtractedFile, extract_archive, extract_file, load_directory};
pub use layout::{EntryKind, UnsafePath, classify, normalize_relative};
pub use reader::{load_package, read_package, read_package_bytes};
pub use writer::{package_to_bytes, save_package, write_package};

/// Errors raised while reading or writing archives.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Filesystem or stream error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Container format error.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A structural entry holds invalid JSON.
    #[error("Malformed entry '{entry}': {source}")]
    MalformedEntry {
        /// Entry name.
        entry: String,
        /// Decode failure.
        source: serde_json::Error,
    },

    /// A model value could not be encoded.
    #[error("Failed to serialize '{entry}': {source}")]
    Serialize {
        /// Entry name.
        entry: String,
        /// Encode failure.
        source: serde_json::Error,
    },

    /// An entry name escapes the archive root.
    #[error(transparent)]
    UnsafePath(#[from] UnsafePath),

    /// An entry fits no known location (strict mode only).
    #[error("Unrecognized entry: {0}")]
    UnrecognizedEntry(String),

    /// The entry could not be added to the model.
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Directory traversal error.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result of a read: the package plus every entry that was skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadedPackage {
    /// The assembled package.
    pub package: Package,
    /// Normalised names of unrecognised entries, in archive order.
    pub ignored: Vec<String>,
}

impl LoadedPackage {
    /// Drop the ignored list.
    pub fn into_package(self) -> Package {
        self.package
    }
}
