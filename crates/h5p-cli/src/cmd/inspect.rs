//! Inspect command

use std::path::Path;

use anyhow::{Context, Result};
use h5p_core::{ArchiveConfig, load_package};

use crate::ui::{Output, table};

/// Print metadata, libraries and content files of a package
pub fn inspect(file: &Path, config: &ArchiveConfig) -> Result<()> {
    let loaded = load_package(file, config)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    let package = &loaded.package;
    let output = Output::new();

    println!();
    match package.metadata() {
        Some(metadata) => {
            output.field("title", &metadata.title);
            output.field("main library", &metadata.main_library);
            output.field("language", &metadata.language);
            if let Some(license) = &metadata.license {
                output.field("license", license);
            }
            let preloaded: Vec<String> = metadata
                .preloaded_dependencies
                .iter()
                .map(ToString::to_string)
                .collect();
            if !preloaded.is_empty() {
                output.field("preloads", &preloaded.join(", "));
            }
        }
        None => output.warning("No h5p.json in package"),
    }
    output.field("content", if package.content().is_some() { "yes" } else { "missing" });
    output.field("content files", &package.content_files().len().to_string());
    println!();

    let mut libraries = table(&["Directory", "Machine name", "Version", "Files", "Fields"]);
    for library in package.libraries() {
        let version = library
            .definition()
            .map_or_else(|| "-".to_string(), |d| d.version().to_string());
        let fields = library
            .semantics()
            .map_or_else(|| "-".to_string(), |s| s.walk().len().to_string());
        libraries.add_row(vec![
            library.name().to_string(),
            library.machine_name().to_string(),
            version,
            library.files().len().to_string(),
            fields,
        ]);
    }
    println!("{libraries}");

    for entry in &loaded.ignored {
        output.warning(&format!("Ignored entry: {entry}"));
    }
    Ok(())
}
