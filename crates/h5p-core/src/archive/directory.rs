//! Unpacked packages on disk
//!
//! `load_directory` reads a package from an extracted tree with the same
//! classification as the archive reader; `extract_archive` writes an
//! archive out to such a tree.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::ZipArchive;

use super::layout::normalize_relative;
use super::reader::Assembler;
use super::{ArchiveError, LoadedPackage};
use crate::config::ArchiveConfig;

/// Information about an extracted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    /// Path relative to extraction root
    pub relative_path: PathBuf,
    /// Absolute path on disk
    pub absolute_path: PathBuf,
}

/// Build a package from an unpacked directory.
///
/// Files are visited in sorted order; symlinks are not followed.
///
/// # Errors
///
/// Returns an error if the tree cannot be read or a file fails to
/// classify, as with [`super::read_package`].
pub fn load_directory(root: &Path, config: &ArchiveConfig) -> Result<LoadedPackage, ArchiveError> {
    debug!(root = %root.display(), "Loading package directory");
    let mut assembler = Assembler::new(config);

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let data = fs::read(entry.path())?;
        assembler.accept(&name, data)?;
    }

    assembler.finish()
}

/// Extract a zip stream into `dest_dir`.
///
/// Entry names go through the same normalisation as the reader. Every name
/// is checked before anything is written, so an entry that would land
/// outside `dest_dir` aborts the extraction with nothing on disk.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsafePath`] for escaping names, or an IO/zip
/// error.
pub fn extract_archive<R: Read + Seek>(reader: R, dest_dir: &Path) -> Result<Vec<ExtractedFile>, ArchiveError> {
    let mut archive = ZipArchive::new(reader)?;

    let mut planned = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        if file.is_dir() {
            continue;
        }
        let relative = normalize_relative(file.name())?;
        planned.push((i, relative.split('/').collect::<PathBuf>()));
    }

    fs::create_dir_all(dest_dir)?;
    let mut extracted_files = Vec::with_capacity(planned.len());

    for (i, relative_path) in planned {
        let mut file = archive.by_index(i)?;
        let absolute_path = dest_dir.join(&relative_path);
        if let Some(parent) = absolute_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&absolute_path)?;
        io::copy(&mut file, &mut outfile)?;
        debug!(path = %relative_path.display(), "Extracted entry");

        extracted_files.push(ExtractedFile {
            relative_path,
            absolute_path,
        });
    }

    info!(dest = %dest_dir.display(), files = extracted_files.len(), "Extracted archive");
    Ok(extracted_files)
}

/// Extract an `.h5p` file into `dest_dir`.
///
/// # Errors
///
/// Same as [`extract_archive`].
pub fn extract_file(archive_path: &Path, dest_dir: &Path) -> Result<Vec<ExtractedFile>, ArchiveError> {
    let file = File::open(archive_path)?;
    extract_archive(BufReader::new(file), dest_dir)
}
