//! Core library for H5P packages.
//!
//! - [`package`]: the in-memory [`Package`] / [`Library`] model.
//! - [`archive`]: reading and writing `.h5p` archives and unpacked trees.
//! - [`validation`]: accumulating content and package checks.
//! - [`loader`]: pluggable sources for library semantics.
//! - [`config`]: reader/writer settings from TOML and the environment.
//!
//! ```no_run
//! use h5p_core::{ArchiveConfig, load_package, validate_package};
//! use std::path::Path;
//!
//! let config = ArchiveConfig::default().with_env();
//! let loaded = load_package(Path::new("quiz.h5p"), &config)?;
//! let report = validate_package(&loaded.package);
//! for violation in &report.violations {
//!     eprintln!("{violation}");
//! }
//! # Ok::<(), h5p_core::ArchiveError>(())
//! ```

pub mod archive;
pub mod config;
pub mod loader;
pub mod package;
pub mod validation;

pub use archive::{
    ArchiveError, ExtractedFile, LoadedPackage, extract_archive, extract_file, load_directory,
    load_package, package_to_bytes, read_package, read_package_bytes, save_package, write_package,
};
pub use config::{ArchiveConfig, Compression, ConfigError};
pub use loader::{DirSchemaSource, LoadError, MemorySchemaSource, SchemaSource};
pub use package::{Library, Package, PackageError};
pub use validation::{
    ContentKind, ValidationErrors, ValidationReport, Violation, validate_content,
    validate_multi_choice, validate_package, validate_question_set,
};
