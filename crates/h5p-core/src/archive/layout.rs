//! Entry names inside an `.h5p` archive.
//!
//! ```text
//! h5p.json
//! content/content.json
//! content/<file>
//! <LibraryDir>/library.json
//! <LibraryDir>/semantics.json
//! <LibraryDir>/<file>
//! ```

use thiserror::Error;

use crate::config::ArchiveConfig;

/// Package metadata entry.
pub const METADATA_ENTRY: &str = "h5p.json";
/// Directory holding the content parameters and media.
pub const CONTENT_DIR: &str = "content";
/// Content parameters entry.
pub const CONTENT_ENTRY: &str = "content/content.json";
/// Name of the parameters file inside [`CONTENT_DIR`].
pub const CONTENT_FILE: &str = "content.json";
/// Library definition file name.
pub const LIBRARY_DEFINITION: &str = "library.json";
/// Library semantics file name.
pub const LIBRARY_SEMANTICS: &str = "semantics.json";

/// A path that would land outside the directory it is relative to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsafe path '{path}': {reason}")]
pub struct UnsafePath {
    /// The offending path as given.
    pub path: String,
    /// What is wrong with it.
    pub reason: &'static str,
}

impl UnsafePath {
    fn new(path: &str, reason: &'static str) -> Self {
        Self {
            path: path.to_string(),
            reason,
        }
    }
}

/// Normalise a relative path to `/`-separated form.
///
/// Backslashes become separators, empty and `.` segments are dropped.
///
/// # Errors
///
/// Returns [`UnsafePath`] if the path is empty, absolute, carries a drive
/// prefix, contains a NUL byte or has a `..` segment.
pub fn normalize_relative(path: &str) -> Result<String, UnsafePath> {
    if path.contains('\0') {
        return Err(UnsafePath::new(path, "contains a NUL byte"));
    }

    let unified = path.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(UnsafePath::new(path, "is absolute"));
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(UnsafePath::new(path, "escapes its root")),
            s if segments.is_empty() && s.contains(':') => {
                return Err(UnsafePath::new(path, "has a drive prefix"));
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(UnsafePath::new(path, "is empty"));
    }
    Ok(segments.join("/"))
}

/// Archive entry name of a content file.
pub fn content_entry(relative: &str) -> String {
    format!("{CONTENT_DIR}/{relative}")
}

/// Archive entry name of a file inside a library directory.
pub fn library_entry(library: &str, relative: &str) -> String {
    format!("{library}/{relative}")
}

/// What a normalised entry name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind<'a> {
    /// `h5p.json`
    Metadata,
    /// `content/content.json`
    Content,
    /// Any other file below `content/`.
    ContentFile(&'a str),
    /// `<lib>/library.json`
    LibraryDefinition(&'a str),
    /// `<lib>/semantics.json`
    LibrarySemantics(&'a str),
    /// A plain file in a library directory accepted by the prefix gate.
    LibraryFile {
        /// Library directory name.
        library: &'a str,
        /// Path inside the library directory.
        path: &'a str,
    },
    /// A plain file in a top-level directory outside the prefix gate. It
    /// belongs to a library only if the directory also holds a
    /// `library.json` or `semantics.json`.
    DirectoryFile {
        /// Top-level directory name.
        directory: &'a str,
        /// Path inside the directory.
        path: &'a str,
    },
    /// Everything else.
    Unrecognized,
}

/// Classify a normalised entry name.
///
/// `library.json` and `semantics.json` are recognised in any top-level
/// directory. Plain files are [`EntryKind::LibraryFile`] when the directory
/// matches one of the configured prefixes and [`EntryKind::DirectoryFile`]
/// otherwise.
pub fn classify<'a>(entry: &'a str, config: &ArchiveConfig) -> EntryKind<'a> {
    if entry == METADATA_ENTRY {
        return EntryKind::Metadata;
    }
    if entry == CONTENT_ENTRY {
        return EntryKind::Content;
    }

    let Some((top, rest)) = entry.split_once('/') else {
        return EntryKind::Unrecognized;
    };

    if top == CONTENT_DIR {
        return EntryKind::ContentFile(rest);
    }

    match rest {
        LIBRARY_DEFINITION => EntryKind::LibraryDefinition(top),
        LIBRARY_SEMANTICS => EntryKind::LibrarySemantics(top),
        _ if config.is_library_dir(top) => EntryKind::LibraryFile {
            library: top,
            path: rest,
        },
        _ => EntryKind::DirectoryFile {
            directory: top,
            path: rest,
        },
    }
}
