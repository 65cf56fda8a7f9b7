//! Validate command

use std::path::Path;

use anyhow::{Context, Result, bail};
use h5p_core::{
    ArchiveConfig, LoadedPackage, ValidationReport, load_directory, load_package, validate_package,
};

use crate::ui::{Output, table};

/// Load a package from a file or directory
pub fn load(path: &Path, config: &ArchiveConfig) -> Result<LoadedPackage> {
    let loaded = if path.is_dir() {
        load_directory(path, config)
    } else {
        load_package(path, config)
    };
    loaded.with_context(|| format!("Failed to load {}", path.display()))
}

/// Validate a package and fail when any rule is broken
pub fn validate(path: &Path, json: bool, config: &ArchiveConfig) -> Result<()> {
    let loaded = load(path, config)?;
    let report = validate_package(&loaded.package);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        for entry in &loaded.ignored {
            Output::new().warning(&format!("Ignored entry: {entry}"));
        }
    }

    if !report.is_valid() {
        bail!("{} is invalid ({} violation(s))", path.display(), report.violations.len());
    }
    if !json {
        Output::new().success(&format!("{} is valid", path.display()));
    }
    Ok(())
}

/// Print violations as a table and warnings as lines
pub fn print_report(report: &ValidationReport) {
    let output = Output::new();

    if !report.violations.is_empty() {
        let mut violations = table(&["Field", "Problem", "Value"]);
        for violation in &report.violations {
            violations.add_row(vec![
                violation.field.clone(),
                violation.message.clone(),
                violation.value.as_ref().map_or_else(String::new, ToString::to_string),
            ]);
        }
        println!("{violations}");
    }
    for warning in &report.warnings {
        output.warning(warning);
    }
}
