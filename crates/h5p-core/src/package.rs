//! In-memory package model
//!
//! A [`Package`] is the mutable aggregate the archive reader fills and the
//! archive writer drains. Structural checks (path safety, unique library
//! directories) happen on insertion; content rules live in
//! [`crate::validation`].

use std::collections::BTreeMap;

use h5p_schema::{LibraryDefinition, PackageMetadata, Semantics};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::archive::layout::{
    self, CONTENT_DIR, CONTENT_FILE, LIBRARY_DEFINITION, LIBRARY_SEMANTICS, METADATA_ENTRY,
    UnsafePath,
};

/// Errors raised while mutating a package.
#[derive(Error, Debug)]
pub enum PackageError {
    /// A library with the same directory name is already present.
    #[error("Duplicate library: {0}")]
    DuplicateLibrary(String),

    /// The library directory name cannot be used in an archive.
    #[error("Invalid library name '{name}': {reason}")]
    InvalidLibraryName {
        /// Offending name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A file path escapes its directory.
    #[error(transparent)]
    UnsafePath(#[from] UnsafePath),

    /// A file path collides with a structural entry.
    #[error("Reserved path: {0}")]
    ReservedPath(String),

    /// Content could not be converted to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A library bundled in a package.
#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    name: String,
    definition: Option<LibraryDefinition>,
    semantics: Option<Semantics>,
    files: BTreeMap<String, Vec<u8>>,
}

impl Library {
    /// Empty library stored under directory `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidLibraryName`] if `name` is not a single
    /// usable directory name.
    pub fn new(name: impl Into<String>) -> Result<Self, PackageError> {
        let name = name.into();
        check_library_name(&name)?;
        Ok(Self {
            name,
            definition: None,
            semantics: None,
            files: BTreeMap::new(),
        })
    }

    /// Library named after its definition (`Machine-Major.Minor`).
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidLibraryName`] if the machine name does
    /// not form a usable directory name.
    pub fn from_definition(definition: LibraryDefinition) -> Result<Self, PackageError> {
        let mut library = Self::new(definition.directory_name())?;
        library.definition = Some(definition);
        Ok(library)
    }

    /// Directory name inside the archive.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Machine name from the definition, or the directory name without its
    /// version suffix when there is no definition.
    pub fn machine_name(&self) -> &str {
        match &self.definition {
            Some(definition) => &definition.machine_name,
            None => strip_version_suffix(&self.name),
        }
    }

    /// Parsed `library.json`.
    pub fn definition(&self) -> Option<&LibraryDefinition> {
        self.definition.as_ref()
    }

    /// Replace the definition.
    pub fn set_definition(&mut self, definition: LibraryDefinition) {
        self.definition = Some(definition);
    }

    /// Parsed `semantics.json`.
    pub fn semantics(&self) -> Option<&Semantics> {
        self.semantics.as_ref()
    }

    /// Replace the semantics.
    pub fn set_semantics(&mut self, semantics: Semantics) {
        self.semantics = Some(semantics);
    }

    /// Other files, keyed by normalised path inside the library directory.
    pub fn files(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.files
    }

    /// Add or replace a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is unsafe or names `library.json` or
    /// `semantics.json` at the library root.
    pub fn add_file(&mut self, path: &str, data: impl Into<Vec<u8>>) -> Result<(), PackageError> {
        let path = normalize_file_path(path, &[LIBRARY_DEFINITION, LIBRARY_SEMANTICS])?;
        self.files.insert(path, data.into());
        Ok(())
    }

    /// Builder form of [`Library::add_file`].
    ///
    /// # Errors
    ///
    /// Same as [`Library::add_file`].
    pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Result<Self, PackageError> {
        self.add_file(path, data)?;
        Ok(self)
    }

    /// Replace all files. Nothing changes if any path is rejected.
    ///
    /// # Errors
    ///
    /// Same as [`Library::add_file`].
    pub fn set_files<I, P, D>(&mut self, files: I) -> Result<(), PackageError>
    where
        I: IntoIterator<Item = (P, D)>,
        P: AsRef<str>,
        D: Into<Vec<u8>>,
    {
        self.files = collect_files(files, &[LIBRARY_DEFINITION, LIBRARY_SEMANTICS])?;
        Ok(())
    }
}

/// An H5P package: metadata, content parameters, content files and libraries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    metadata: Option<PackageMetadata>,
    content: Option<Value>,
    content_files: BTreeMap<String, Vec<u8>>,
    libraries: Vec<Library>,
}

impl Package {
    /// Empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed `h5p.json`.
    pub fn metadata(&self) -> Option<&PackageMetadata> {
        self.metadata.as_ref()
    }

    /// Replace the metadata.
    pub fn set_metadata(&mut self, metadata: PackageMetadata) {
        self.metadata = Some(metadata);
    }

    /// Content parameters (`content/content.json`).
    pub fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }

    /// Replace the content parameters.
    pub fn set_content(&mut self, content: Value) {
        self.content = Some(content);
    }

    /// Replace the content parameters with any serialisable value, such as a
    /// typed question set.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::Json`] if `content` cannot be serialised.
    pub fn set_content_from<T: Serialize + ?Sized>(&mut self, content: &T) -> Result<(), PackageError> {
        self.content = Some(serde_json::to_value(content)?);
        Ok(())
    }

    /// Files under `content/`, keyed by normalised relative path.
    pub fn content_files(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.content_files
    }

    /// Add or replace a content file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is unsafe or is `content.json`.
    pub fn add_content_file(&mut self, path: &str, data: impl Into<Vec<u8>>) -> Result<(), PackageError> {
        let path = normalize_file_path(path, &[CONTENT_FILE])?;
        self.content_files.insert(path, data.into());
        Ok(())
    }

    /// Replace all content files. Nothing changes if any path is rejected.
    ///
    /// # Errors
    ///
    /// Same as [`Package::add_content_file`].
    pub fn set_content_files<I, P, D>(&mut self, files: I) -> Result<(), PackageError>
    where
        I: IntoIterator<Item = (P, D)>,
        P: AsRef<str>,
        D: Into<Vec<u8>>,
    {
        self.content_files = collect_files(files, &[CONTENT_FILE])?;
        Ok(())
    }

    /// Libraries in insertion order.
    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    /// Library stored under directory `name`.
    pub fn library(&self, name: &str) -> Option<&Library> {
        self.libraries.iter().find(|l| l.name == name)
    }

    /// Mutable library stored under directory `name`.
    pub fn library_mut(&mut self, name: &str) -> Option<&mut Library> {
        self.libraries.iter_mut().find(|l| l.name == name)
    }

    /// First library with the given machine name.
    pub fn find_library(&self, machine_name: &str) -> Option<&Library> {
        self.libraries.iter().find(|l| l.machine_name() == machine_name)
    }

    /// The library named by `mainLibrary` in the metadata.
    pub fn main_library(&self) -> Option<&Library> {
        let main = &self.metadata.as_ref()?.main_library;
        self.find_library(main)
    }

    /// Append a library.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::DuplicateLibrary`] if a library with the same
    /// directory name is already present.
    pub fn add_library(&mut self, library: Library) -> Result<(), PackageError> {
        if self.library(&library.name).is_some() {
            return Err(PackageError::DuplicateLibrary(library.name));
        }
        self.libraries.push(library);
        Ok(())
    }

    /// Remove and return the library stored under `name`.
    pub fn remove_library(&mut self, name: &str) -> Option<Library> {
        let index = self.libraries.iter().position(|l| l.name == name)?;
        Some(self.libraries.remove(index))
    }

    pub(crate) fn library_at_mut(&mut self, index: usize) -> &mut Library {
        &mut self.libraries[index]
    }
}

fn check_library_name(name: &str) -> Result<(), PackageError> {
    let reason = if name.is_empty() {
        Some("is empty")
    } else if name.contains(['/', '\\', '\0', ':']) {
        Some("must be a single path segment")
    } else if name == "." || name == ".." {
        Some("is a relative directory marker")
    } else if name == CONTENT_DIR || name == METADATA_ENTRY {
        Some("collides with a package entry")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(PackageError::InvalidLibraryName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn normalize_file_path(path: &str, reserved: &[&str]) -> Result<String, PackageError> {
    let normalized = layout::normalize_relative(path)?;
    if reserved.contains(&normalized.as_str()) {
        return Err(PackageError::ReservedPath(normalized));
    }
    Ok(normalized)
}

fn collect_files<I, P, D>(files: I, reserved: &[&str]) -> Result<BTreeMap<String, Vec<u8>>, PackageError>
where
    I: IntoIterator<Item = (P, D)>,
    P: AsRef<str>,
    D: Into<Vec<u8>>,
{
    files
        .into_iter()
        .map(|(path, data)| Ok((normalize_file_path(path.as_ref(), reserved)?, data.into())))
        .collect()
}

/// `H5P.MultiChoice-1.16` -> `H5P.MultiChoice`
fn strip_version_suffix(name: &str) -> &str {
    let Some((machine, version)) = name.rsplit_once('-') else {
        return name;
    };
    let is_version = version
        .split('.')
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    if is_version { machine } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h5p_schema::LibraryVersion;
    use serde_json::json;

    fn multichoice_definition() -> LibraryDefinition {
        LibraryDefinition::new("Multiple Choice", "H5P.MultiChoice", LibraryVersion::new(1, 16, 3))
    }

    #[test]
    fn test_library_from_definition_uses_directory_convention() {
        let library = Library::from_definition(multichoice_definition()).unwrap();
        assert_eq!(library.name(), "H5P.MultiChoice-1.16");
        assert_eq!(library.machine_name(), "H5P.MultiChoice");
    }

    #[test]
    fn test_machine_name_without_definition() {
        assert_eq!(Library::new("H5P.Question-1.5").unwrap().machine_name(), "H5P.Question");
        assert_eq!(Library::new("FontAwesome").unwrap().machine_name(), "FontAwesome");
        assert_eq!(Library::new("H5P.Foo-bar").unwrap().machine_name(), "H5P.Foo-bar");
    }

    #[test]
    fn test_invalid_library_names() {
        for bad in ["", "a/b", "a\\b", "..", "content", "h5p.json", "C:"] {
            assert!(
                matches!(Library::new(bad), Err(PackageError::InvalidLibraryName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_duplicate_library_rejected() {
        let mut package = Package::new();
        package
            .add_library(Library::from_definition(multichoice_definition()).unwrap())
            .unwrap();
        let err = package
            .add_library(Library::new("H5P.MultiChoice-1.16").unwrap())
            .unwrap_err();
        assert!(matches!(err, PackageError::DuplicateLibrary(name) if name == "H5P.MultiChoice-1.16"));
        assert_eq!(package.libraries().len(), 1);
    }

    #[test]
    fn test_library_files_are_normalised() {
        let mut library = Library::new("H5P.MultiChoice-1.16").unwrap();
        library.add_file("./js\\multichoice.js", b"x".to_vec()).unwrap();
        assert!(library.files().contains_key("js/multichoice.js"));

        assert!(matches!(
            library.add_file("../escape.js", b"x".to_vec()),
            Err(PackageError::UnsafePath(_))
        ));
        assert!(matches!(
            library.add_file("library.json", b"{}".to_vec()),
            Err(PackageError::ReservedPath(_))
        ));
        // Only reserved at the library root.
        library.add_file("sub/library.json", b"{}".to_vec()).unwrap();
    }

    #[test]
    fn test_set_files_is_all_or_nothing() {
        let mut library = Library::new("H5P.Foo-1.0")
            .unwrap()
            .with_file("a.js", b"a".to_vec())
            .unwrap();
        let result = library.set_files([("b.js", b"b".to_vec()), ("/abs.js", b"c".to_vec())]);
        assert!(result.is_err());
        assert_eq!(library.files().keys().collect::<Vec<_>>(), vec!["a.js"]);
    }

    #[test]
    fn test_content_files() {
        let mut package = Package::new();
        package.add_content_file("images/map.png", vec![1, 2, 3]).unwrap();
        assert!(matches!(
            package.add_content_file("content.json", b"{}".to_vec()),
            Err(PackageError::ReservedPath(_))
        ));
        package
            .set_content_files([("a.txt", "a"), ("b/c.txt", "c")])
            .unwrap();
        assert_eq!(package.content_files().len(), 2);
        assert!(!package.content_files().contains_key("images/map.png"));
    }

    #[test]
    fn test_main_library_lookup() {
        let mut package = Package::new();
        package.set_metadata(PackageMetadata::new("Quiz", "H5P.MultiChoice"));
        assert!(package.main_library().is_none());

        package
            .add_library(Library::from_definition(multichoice_definition()).unwrap())
            .unwrap();
        assert_eq!(package.main_library().unwrap().name(), "H5P.MultiChoice-1.16");
    }

    #[test]
    fn test_set_content_from_typed_value() {
        #[derive(Serialize)]
        struct Params {
            question: &'static str,
        }

        let mut package = Package::new();
        package.set_content_from(&Params { question: "Why?" }).unwrap();
        assert_eq!(package.content(), Some(&json!({"question": "Why?"})));
    }

    #[test]
    fn test_remove_library() {
        let mut package = Package::new();
        package.add_library(Library::new("H5P.A-1.0").unwrap()).unwrap();
        package.add_library(Library::new("H5P.B-1.0").unwrap()).unwrap();
        assert!(package.remove_library("H5P.A-1.0").is_some());
        assert!(package.remove_library("H5P.A-1.0").is_none());
        assert_eq!(package.libraries()[0].name(), "H5P.B-1.0");
    }
}
