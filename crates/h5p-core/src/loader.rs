//! Schema sources
//!
//! Libraries are often assembled without their `semantics.json` at hand.
//! A [`SchemaSource`] supplies those bytes on demand, from memory or from a
//! directory of unpacked libraries.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use h5p_schema::{LibraryDefinition, LibraryDependency, SchemaError, Semantics};
use thiserror::Error;
use tracing::debug;

use crate::archive::layout::LIBRARY_SEMANTICS;
use crate::package::{Library, PackageError};

/// Errors raised while fetching or decoding semantics.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// The bytes are not a semantics document.
    #[error("Invalid semantics for {library}: {source}")]
    Semantics {
        /// Library reference.
        library: String,
        /// Decode failure.
        source: SchemaError,
    },

    /// The library could not be created.
    #[error(transparent)]
    Package(#[from] PackageError),
}

/// Supplies raw `semantics.json` bytes for a library.
pub trait SchemaSource {
    /// Bytes for `library`, or `None` when the source has none.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the source exists but cannot be read.
    fn semantics(&self, library: &LibraryDependency) -> Result<Option<Vec<u8>>, LoadError>;
}

/// Schema bytes held in memory, keyed by `major.minor` reference.
#[derive(Debug, Clone, Default)]
pub struct MemorySchemaSource {
    entries: HashMap<LibraryDependency, Vec<u8>>,
}

impl MemorySchemaSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register semantics bytes for `library`.
    pub fn insert(&mut self, library: LibraryDependency, semantics: impl Into<Vec<u8>>) {
        self.entries.insert(library, semantics.into());
    }

    /// Builder form of [`MemorySchemaSource::insert`].
    pub fn with(mut self, library: LibraryDependency, semantics: impl Into<Vec<u8>>) -> Self {
        self.insert(library, semantics);
        self
    }
}

impl SchemaSource for MemorySchemaSource {
    fn semantics(&self, library: &LibraryDependency) -> Result<Option<Vec<u8>>, LoadError> {
        Ok(self.entries.get(library).cloned())
    }
}

/// Schema files in a directory of unpacked libraries.
///
/// Looks for `<root>/<Machine-Major.Minor>/semantics.json`, then
/// `<root>/<Machine>/semantics.json`.
#[derive(Debug, Clone)]
pub struct DirSchemaSource {
    root: PathBuf,
}

impl DirSchemaSource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SchemaSource for DirSchemaSource {
    fn semantics(&self, library: &LibraryDependency) -> Result<Option<Vec<u8>>, LoadError> {
        for dir in [library.directory_name(), library.machine_name.clone()] {
            let path = self.root.join(dir).join(LIBRARY_SEMANTICS);
            match fs::read(&path) {
                Ok(bytes) => {
                    debug!(path = %path.display(), "Found semantics");
                    return Ok(Some(bytes));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(LoadError::Io { path, source }),
            }
        }
        Ok(None)
    }
}

impl Library {
    /// Library for `definition`, with semantics from `source` when it has any.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails, the bytes are not a semantics
    /// document, or the definition does not give a usable directory name.
    pub fn with_schema_source(
        definition: LibraryDefinition,
        source: &dyn SchemaSource,
    ) -> Result<Self, LoadError> {
        let dependency = definition.dependency();
        let semantics = source
            .semantics(&dependency)?
            .map(|bytes| Semantics::from_slice(&bytes))
            .transpose()
            .map_err(|source| LoadError::Semantics {
                library: dependency.to_string(),
                source,
            })?;

        let mut library = Self::from_definition(definition)?;
        if let Some(semantics) = semantics {
            library.set_semantics(semantics);
        }
        Ok(library)
    }
}
