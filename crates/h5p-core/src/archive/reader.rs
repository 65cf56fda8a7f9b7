//! Archive reader
//!
//! Entries are consumed in a single pass. Libraries are created on first
//! sight of any of their entries through a name to position index that lives
//! only for the duration of one read. Files in directories outside the
//! prefix gate are held back until the pass ends and join a library only if
//! that directory turned out to have a `library.json` or `semantics.json`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::layout::{EntryKind, classify, normalize_relative};
use super::{ArchiveError, LoadedPackage};
use crate::config::ArchiveConfig;
use crate::package::{Library, Package};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Builds a [`Package`] from named entries.
pub(crate) struct Assembler<'a> {
    config: &'a ArchiveConfig,
    package: Package,
    index: HashMap<String, usize>,
    pending: Vec<(String, Vec<u8>)>,
    ignored: Vec<String>,
}

impl<'a> Assembler<'a> {
    pub(crate) fn new(config: &'a ArchiveConfig) -> Self {
        Self {
            config,
            package: Package::new(),
            index: HashMap::new(),
            pending: Vec::new(),
            ignored: Vec::new(),
        }
    }

    /// Route one entry into the package.
    pub(crate) fn accept(&mut self, name: &str, data: Vec<u8>) -> Result<(), ArchiveError> {
        let entry = normalize_relative(name)?;

        match classify(&entry, self.config) {
            EntryKind::Metadata => {
                let metadata = parse_entry(&entry, &data)?;
                self.package.set_metadata(metadata);
            }
            EntryKind::Content => {
                let content = parse_entry(&entry, &data)?;
                self.package.set_content(content);
            }
            EntryKind::ContentFile(path) => self.package.add_content_file(path, data)?,
            EntryKind::LibraryDefinition(library) => {
                let definition = parse_entry(&entry, &data)?;
                self.library(library)?.set_definition(definition);
            }
            EntryKind::LibrarySemantics(library) => {
                let semantics = parse_entry(&entry, &data)?;
                self.library(library)?.set_semantics(semantics);
            }
            EntryKind::LibraryFile { library, path } => self.library(library)?.add_file(path, data)?,
            EntryKind::DirectoryFile { directory, path } => match self.index.get(directory) {
                Some(&index) => self.package.library_at_mut(index).add_file(path, data)?,
                None => self.pending.push((entry.clone(), data)),
            },
            EntryKind::Unrecognized => self.ignore(entry)?,
        }
        Ok(())
    }

    fn ignore(&mut self, entry: String) -> Result<(), ArchiveError> {
        if self.config.strict {
            return Err(ArchiveError::UnrecognizedEntry(entry));
        }
        warn!(entry = %entry, "Ignoring unrecognized archive entry");
        self.ignored.push(entry);
        Ok(())
    }

    fn library(&mut self, name: &str) -> Result<&mut Library, ArchiveError> {
        let index = match self.index.get(name) {
            Some(&index) => index,
            None => {
                let index = self.package.libraries().len();
                self.package.add_library(Library::new(name)?)?;
                self.index.insert(name.to_string(), index);
                index
            }
        };
        Ok(self.package.library_at_mut(index))
    }

    /// Settle held-back directory files and return the package.
    pub(crate) fn finish(mut self) -> Result<LoadedPackage, ArchiveError> {
        for (entry, data) in std::mem::take(&mut self.pending) {
            let owner = entry
                .split_once('/')
                .and_then(|(directory, path)| Some((*self.index.get(directory)?, path)));
            match owner {
                Some((index, path)) => self.package.library_at_mut(index).add_file(path, data)?,
                None => self.ignore(entry)?,
            }
        }

        info!(
            libraries = self.package.libraries().len(),
            content_files = self.package.content_files().len(),
            ignored = self.ignored.len(),
            "Assembled package"
        );
        Ok(LoadedPackage {
            package: self.package,
            ignored: self.ignored,
        })
    }
}

fn parse_entry<T: DeserializeOwned>(entry: &str, data: &[u8]) -> Result<T, ArchiveError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    serde_json::from_slice(data).map_err(|source| ArchiveError::MalformedEntry {
        entry: entry.to_string(),
        source,
    })
}

/// Read a package from any seekable zip stream.
///
/// # Errors
///
/// Returns an error if the stream is not a zip archive, an entry name is
/// unsafe, a structural JSON entry is malformed, or (in strict mode) an
/// entry is unrecognised.
pub fn read_package<R: Read + Seek>(reader: R, config: &ArchiveConfig) -> Result<LoadedPackage, ArchiveError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut assembler = Assembler::new(config);

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        debug!(entry = %name, bytes = data.len(), "Read archive entry");

        assembler.accept(&name, data)?;
    }

    assembler.finish()
}

/// Read a package from an in-memory archive.
///
/// # Errors
///
/// Same as [`read_package`].
pub fn read_package_bytes(bytes: &[u8], config: &ArchiveConfig) -> Result<LoadedPackage, ArchiveError> {
    read_package(Cursor::new(bytes), config)
}

/// Read a package from an `.h5p` file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, or as [`read_package`].
pub fn load_package(path: &Path, config: &ArchiveConfig) -> Result<LoadedPackage, ArchiveError> {
    debug!(path = %path.display(), "Loading package");
    let file = File::open(path)?;
    read_package(BufReader::new(file), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_libraries_are_created_once_per_directory() {
        let bytes = archive(&[
            ("H5P.MultiChoice-1.16/js/mc.js", b"js"),
            ("h5p.json", br#"{"title":"Quiz","mainLibrary":"H5P.MultiChoice"}"#),
            (
                "H5P.MultiChoice-1.16/library.json",
                br#"{"title":"MC","machineName":"H5P.MultiChoice","majorVersion":1,"minorVersion":16,"patchVersion":3}"#,
            ),
            ("H5P.MultiChoice-1.16/semantics.json", b"[]"),
            ("H5P.Question-1.5/library.json", br#"{"machineName":"H5P.Question","majorVersion":1,"minorVersion":5}"#),
        ]);

        let loaded = read_package_bytes(&bytes, &ArchiveConfig::default()).unwrap();
        let package = loaded.package;
        assert_eq!(package.libraries().len(), 2);

        let mc = package.library("H5P.MultiChoice-1.16").unwrap();
        assert_eq!(mc.definition().unwrap().patch_version, 3);
        assert!(mc.semantics().is_some());
        assert_eq!(mc.files()["js/mc.js"], b"js");
        assert_eq!(package.main_library().unwrap().name(), "H5P.MultiChoice-1.16");
    }

    #[test]
    fn test_unrecognized_entries_are_reported() {
        let bytes = archive(&[("README.md", b"hi"), ("FontAwesome-4.5/fa.css", b"css")]);

        let loaded = read_package_bytes(&bytes, &ArchiveConfig::default()).unwrap();
        assert_eq!(loaded.ignored, vec!["README.md", "FontAwesome-4.5/fa.css"]);
        assert!(loaded.package.libraries().is_empty());
    }

    #[test]
    fn test_unprefixed_library_keeps_its_files() {
        let bytes = archive(&[
            ("FontAwesome-4.5/fa.css", b"css"),
            (
                "FontAwesome-4.5/library.json",
                br#"{"machineName":"FontAwesome","majorVersion":4,"minorVersion":5}"#,
            ),
            ("FontAwesome-4.5/fonts/fa.woff", b"woff"),
            ("misc/notes.txt", b"x"),
        ]);

        let loaded = read_package_bytes(&bytes, &ArchiveConfig::default()).unwrap();
        assert_eq!(loaded.ignored, vec!["misc/notes.txt"]);
        let library = loaded.package.library("FontAwesome-4.5").unwrap();
        assert_eq!(library.files().len(), 2);
        assert_eq!(library.files()["fa.css"], b"css");
        assert_eq!(library.files()["fonts/fa.woff"], b"woff");
    }

    #[test]
    fn test_strict_mode_rejects_orphan_directory_files() {
        let bytes = archive(&[("misc/notes.txt", b"x")]);
        let config = ArchiveConfig {
            strict: true,
            ..ArchiveConfig::default()
        };

        let err = read_package_bytes(&bytes, &config).unwrap_err();
        assert!(matches!(err, ArchiveError::UnrecognizedEntry(name) if name == "misc/notes.txt"));
    }

    #[test]
    fn test_strict_mode_rejects_unrecognized_entries() {
        let bytes = archive(&[("README.md", b"hi")]);
        let config = ArchiveConfig {
            strict: true,
            ..ArchiveConfig::default()
        };

        let err = read_package_bytes(&bytes, &config).unwrap_err();
        assert!(matches!(err, ArchiveError::UnrecognizedEntry(name) if name == "README.md"));
    }

    #[test]
    fn test_malformed_json_names_the_entry() {
        let bytes = archive(&[("content/content.json", b"{not json")]);

        let err = read_package_bytes(&bytes, &ArchiveConfig::default()).unwrap_err();
        assert!(matches!(err, ArchiveError::MalformedEntry { entry, .. } if entry == "content/content.json"));
    }

    #[test]
    fn test_escaping_entry_is_rejected() {
        let bytes = archive(&[("content/../../evil.sh", b"x")]);

        let err = read_package_bytes(&bytes, &ArchiveConfig::default()).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsafePath(_)));
    }

    #[test]
    fn test_byte_order_mark_is_tolerated() {
        let bytes = archive(&[("content/content.json", b"\xEF\xBB\xBF{\"a\":1}")]);

        let loaded = read_package_bytes(&bytes, &ArchiveConfig::default()).unwrap();
        assert_eq!(loaded.package.content().unwrap()["a"], 1);
    }

    #[test]
    fn test_content_files_and_directories() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.add_directory("content/images/", SimpleFileOptions::default()).unwrap();
        zip.start_file("content/images/map.png", SimpleFileOptions::default()).unwrap();
        zip.write_all(&[0x89, 0x50]).unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let loaded = read_package_bytes(&bytes, &ArchiveConfig::default()).unwrap();
        assert!(loaded.ignored.is_empty());
        assert_eq!(loaded.package.content_files()["images/map.png"], vec![0x89, 0x50]);
    }

    #[test]
    fn test_not_a_zip() {
        let err = read_package_bytes(b"plain text", &ArchiveConfig::default()).unwrap_err();
        assert!(matches!(err, ArchiveError::Zip(_)));
    }
}
