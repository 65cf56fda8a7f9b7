//! Archive writer
//!
//! Output is deterministic: entries are written in a fixed order with a
//! fixed timestamp and mode, so equal packages produce equal bytes.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::ArchiveError;
use super::layout::{
    self, CONTENT_ENTRY, LIBRARY_DEFINITION, LIBRARY_SEMANTICS, METADATA_ENTRY,
};
use crate::config::ArchiveConfig;
use crate::package::Package;

const ENTRY_MODE: u32 = 0o644;

/// Write `package` as a zip archive into `writer` and return the writer.
///
/// Entry order: `h5p.json`, `content/content.json`, content files sorted by
/// path, then each library in insertion order with its `library.json`,
/// `semantics.json` and sorted files. Absent parts are skipped.
///
/// # Errors
///
/// Returns an error if a JSON part cannot be encoded or the stream fails.
pub fn write_package<W: Write + Seek>(
    package: &Package,
    writer: W,
    config: &ArchiveConfig,
) -> Result<W, ArchiveError> {
    let options = SimpleFileOptions::default()
        .compression_method(config.compression.method())
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(ENTRY_MODE);
    let mut zip = ZipWriter::new(writer);

    if let Some(metadata) = package.metadata() {
        write_json(&mut zip, METADATA_ENTRY, metadata, options)?;
    }
    if let Some(content) = package.content() {
        write_json(&mut zip, CONTENT_ENTRY, content, options)?;
    }
    for (path, data) in package.content_files() {
        write_bytes(&mut zip, &layout::content_entry(path), data, options)?;
    }

    for library in package.libraries() {
        let name = library.name();
        if let Some(definition) = library.definition() {
            let entry = layout::library_entry(name, LIBRARY_DEFINITION);
            write_json(&mut zip, &entry, definition, options)?;
        }
        if let Some(semantics) = library.semantics() {
            let entry = layout::library_entry(name, LIBRARY_SEMANTICS);
            write_json(&mut zip, &entry, semantics, options)?;
        }
        for (path, data) in library.files() {
            write_bytes(&mut zip, &layout::library_entry(name, path), data, options)?;
        }
    }

    Ok(zip.finish()?)
}

/// Encode `package` into an in-memory archive.
///
/// # Errors
///
/// Same as [`write_package`].
pub fn package_to_bytes(package: &Package, config: &ArchiveConfig) -> Result<Vec<u8>, ArchiveError> {
    let cursor = write_package(package, Cursor::new(Vec::new()), config)?;
    Ok(cursor.into_inner())
}

/// Save `package` to `path` atomically.
///
/// The archive is built in memory, written to a temporary file next to
/// `path` and renamed over it. On failure `path` is left untouched.
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written.
pub fn save_package(package: &Package, path: &Path, config: &ArchiveConfig) -> Result<(), ArchiveError> {
    let bytes = package_to_bytes(package, config)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".h5p-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ArchiveError::Io(e.error))?;

    info!(path = %path.display(), bytes = bytes.len(), "Saved package");
    Ok(())
}

fn write_json<W, T>(
    zip: &mut ZipWriter<W>,
    entry: &str,
    value: &T,
    options: SimpleFileOptions,
) -> Result<(), ArchiveError>
where
    W: Write + Seek,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_vec_pretty(value).map_err(|source| ArchiveError::Serialize {
        entry: entry.to_string(),
        source,
    })?;
    write_bytes(zip, entry, &json, options)
}

fn write_bytes<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &str,
    data: &[u8],
    options: SimpleFileOptions,
) -> Result<(), ArchiveError> {
    zip.start_file(entry, options)?;
    zip.write_all(data)?;
    debug!(entry, bytes = data.len(), "Wrote archive entry");
    Ok(())
}
