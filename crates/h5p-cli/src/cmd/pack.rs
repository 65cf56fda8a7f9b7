//! Pack command

use std::path::Path;

use anyhow::{Context, Result, bail};
use h5p_core::{ArchiveConfig, Compression, load_directory, save_package, validate_package};

use super::validate::print_report;
use crate::ui::Output;

/// Build a package from a directory and save it atomically
pub fn pack(dir: &Path, output_path: &Path, stored: bool, force: bool, config: ArchiveConfig) -> Result<()> {
    let config = if stored {
        config.with_compression(Compression::Stored)
    } else {
        config
    };
    let output = Output::new();

    let loaded = load_directory(dir, &config)
        .with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in &loaded.ignored {
        output.warning(&format!("Skipping unrecognized file: {entry}"));
    }

    let report = validate_package(&loaded.package);
    print_report(&report);
    if !report.is_valid() {
        if !force {
            bail!(
                "{} is invalid ({} violation(s)); use --force to pack anyway",
                dir.display(),
                report.violations.len()
            );
        }
        output.warning("Packing despite validation errors");
    }

    save_package(&loaded.package, output_path, &config)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    output.success(&format!(
        "Packed {} librar{} into {}",
        loaded.package.libraries().len(),
        if loaded.package.libraries().len() == 1 { "y" } else { "ies" },
        output_path.display()
    ));
    Ok(())
}
