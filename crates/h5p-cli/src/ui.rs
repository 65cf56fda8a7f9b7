//! Terminal output helpers.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use crossterm::style::Stylize;

/// Status icons
const SUCCESS: &str = "✓";
const ERROR: &str = "✗";
const WARNING: &str = "⚠";
const INFO: &str = "ℹ";

/// Status lines in a consistent style. Errors and warnings go to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn info(&self, msg: &str) {
        println!("  {} {msg}", INFO.blue());
    }

    pub fn success(&self, msg: &str) {
        println!("  {} {msg}", SUCCESS.green());
    }

    pub fn warning(&self, msg: &str) {
        eprintln!("  {} {msg}", WARNING.yellow());
    }

    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", ERROR.red());
    }

    /// Aligned `label value` line.
    pub fn field(&self, label: &str, value: &str) {
        println!("  {:<14}{value}", label.dark_grey());
    }
}

/// Table with the CLI's common styling.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}
