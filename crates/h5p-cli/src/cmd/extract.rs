//! Extract command

use std::path::Path;

use anyhow::{Context, Result};
use h5p_core::extract_file;

use crate::ui::Output;

/// Unpack a package into a directory
pub fn extract(file: &Path, dest: &Path) -> Result<()> {
    let files = extract_file(file, dest)
        .with_context(|| format!("Failed to extract {}", file.display()))?;

    Output::new().success(&format!(
        "Extracted {} file{} to {}",
        files.len(),
        if files.len() == 1 { "" } else { "s" },
        dest.display()
    ));
    Ok(())
}
