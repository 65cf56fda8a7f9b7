//! Wire types for `h5p.json` and `library.json`.
//!
//! Both structs keep unknown keys in a flattened map so a read/write cycle
//! leaves foreign data untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::SchemaError;

/// Version triple of a library (`majorVersion.minorVersion.patchVersion`).
///
/// Ordering is lexicographic on `(major, minor, patch)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LibraryVersion {
    /// Major version; a change here breaks content written for older majors.
    pub major: u32,
    /// Minor version; dependencies pin `major.minor`.
    pub minor: u32,
    /// Patch version; never part of dependency resolution.
    pub patch: u32,
}

impl LibraryVersion {
    /// Create a version triple.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Reference to a library by machine name and `major.minor`.
///
/// Serialized as `{"machineName": ..., "majorVersion": ..., "minorVersion": ...}`
/// in `h5p.json` and `library.json`. The string form `"H5P.MultiChoice 1.16"`
/// used by question-set entries and library-type options parses into the
/// same type.
///
/// ```
/// use h5p_schema::LibraryDependency;
///
/// let dep: LibraryDependency = "H5P.MultiChoice 1.16".parse().unwrap();
/// assert_eq!(dep.machine_name, "H5P.MultiChoice");
/// assert_eq!(dep.to_string(), "H5P.MultiChoice 1.16");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDependency {
    /// Machine name of the referenced library (e.g. `H5P.MultiChoice`).
    pub machine_name: String,
    /// Required major version.
    pub major_version: u32,
    /// Required minor version.
    pub minor_version: u32,
}

impl LibraryDependency {
    /// Create a dependency reference.
    pub fn new(machine_name: impl Into<String>, major_version: u32, minor_version: u32) -> Self {
        Self {
            machine_name: machine_name.into(),
            major_version,
            minor_version,
        }
    }

    /// Conventional archive directory name (`Machine-Major.Minor`).
    pub fn directory_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.machine_name, self.major_version, self.minor_version
        )
    }
}

impl std::fmt::Display for LibraryDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}.{}",
            self.machine_name, self.major_version, self.minor_version
        )
    }
}

impl std::str::FromStr for LibraryDependency {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidLibraryRef(s.to_string());

        let (name, version) = s.trim().rsplit_once(' ').ok_or_else(invalid)?;
        let (major, minor) = version.split_once('.').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            machine_name: name.to_string(),
            major_version: major.parse().map_err(|_| invalid())?,
            minor_version: minor.parse().map_err(|_| invalid())?,
        })
    }
}

/// Reference to a file inside a library (`{"path": "js/multichoice.js"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Path relative to the library directory.
    pub path: String,
}

impl From<&str> for FileReference {
    fn from(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

/// Package metadata stored in `h5p.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    /// Human-readable title of the content.
    #[serde(default)]
    pub title: String,
    /// Content language code (e.g. `en`, `und`).
    #[serde(default)]
    pub language: String,
    /// Machine name of the library that runs the content.
    #[serde(default)]
    pub main_library: String,
    /// How the content may be embedded (`div`, `iframe`).
    #[serde(default)]
    pub embed_types: Vec<String>,
    /// Content license identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Language used when `language` is not available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    /// Content author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Libraries loaded when the content is displayed.
    #[serde(default)]
    pub preloaded_dependencies: Vec<LibraryDependency>,
    /// Libraries loaded only by the editor.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub editor_dependencies: Vec<LibraryDependency>,
    /// Keys this model does not know about, kept so nothing is lost on rewrite.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageMetadata {
    /// Create metadata with a title and main library; language defaults to `und`.
    pub fn new(title: impl Into<String>, main_library: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            language: "und".to_string(),
            main_library: main_library.into(),
            embed_types: vec!["div".to_string()],
            ..Self::default()
        }
    }

    /// Append a preloaded dependency.
    pub fn with_dependency(mut self, dependency: LibraryDependency) -> Self {
        self.preloaded_dependencies.push(dependency);
        self
    }
}

/// Library definition stored in `<library>/library.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDefinition {
    /// Human-readable library title.
    #[serde(default)]
    pub title: String,
    /// Machine name (e.g. `H5P.MultiChoice`).
    pub machine_name: String,
    /// Major version.
    #[serde(default)]
    pub major_version: u32,
    /// Minor version.
    #[serde(default)]
    pub minor_version: u32,
    /// Patch version.
    #[serde(default)]
    pub patch_version: u32,
    /// Whether the library can be the main library of a package.
    #[serde(default, deserialize_with = "bool_or_int")]
    pub runnable: bool,
    /// Library author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Library license identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scripts loaded with the library.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preloaded_js: Vec<FileReference>,
    /// Stylesheets loaded with the library.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preloaded_css: Vec<FileReference>,
    /// Libraries whose stylesheets this library replaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop_library_css: Vec<FileReference>,
    /// Libraries loaded before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preloaded_dependencies: Vec<LibraryDependency>,
    /// Libraries needed only by the editor.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub editor_dependencies: Vec<LibraryDependency>,
    /// Keys this model does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LibraryDefinition {
    /// Create a definition for `machine_name` at the given version.
    pub fn new(
        title: impl Into<String>,
        machine_name: impl Into<String>,
        version: LibraryVersion,
    ) -> Self {
        Self {
            title: title.into(),
            machine_name: machine_name.into(),
            major_version: version.major,
            minor_version: version.minor,
            patch_version: version.patch,
            ..Self::default()
        }
    }

    /// The version triple.
    pub fn version(&self) -> LibraryVersion {
        LibraryVersion::new(self.major_version, self.minor_version, self.patch_version)
    }

    /// A `major.minor` reference to this library.
    pub fn dependency(&self) -> LibraryDependency {
        LibraryDependency::new(&self.machine_name, self.major_version, self.minor_version)
    }

    /// Conventional archive directory name (`Machine-Major.Minor`).
    pub fn directory_name(&self) -> String {
        self.dependency().directory_name()
    }

    /// Whether this library fulfils `dependency`. Patch versions are ignored.
    pub fn satisfies(&self, dependency: &LibraryDependency) -> bool {
        self.machine_name == dependency.machine_name
            && self.major_version == dependency.major_version
            && self.minor_version == dependency.minor_version
    }
}

/// `runnable` is written as `1`/`0` by most published libraries.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(i) => Ok(i != 0),
    }
}
