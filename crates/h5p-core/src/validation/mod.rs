//! Validation
//!
//! Every check runs and adds to a [`ValidationReport`]; nothing stops at
//! the first problem. Violations make the input invalid, warnings do not.

mod content;
mod package;

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use content::{ContentKind, validate_content, validate_multi_choice, validate_question_set};
pub use package::validate_package;

/// One broken rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Dotted path of the offending field, e.g. `questions[0].params.answers`.
    pub field: String,
    /// What is wrong.
    pub message: String,
    /// The offending value, when there is a single one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        if let Some(value) = &self.value {
            write!(f, " (got {value})")?;
        }
        Ok(())
    }
}

/// Collected outcome of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Rules that failed.
    pub violations: Vec<Violation>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no rule failed. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Record a failed rule.
    pub fn violation(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            field: field.into(),
            message: message.into(),
            value: None,
        });
    }

    /// Record a failed rule together with the offending value.
    pub fn violation_with_value(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.violations.push(Violation {
            field: field.into(),
            message: message.into(),
            value: Some(value.into()),
        });
    }

    /// Record a non-fatal finding.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Append everything from `other`.
    pub fn merge(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.warnings.extend(other.warnings);
    }

    /// Append everything from `other`, nesting its field paths under `prefix`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: Self) {
        self.violations
            .extend(other.violations.into_iter().map(|mut v| {
                v.field = format!("{prefix}.{}", v.field);
                v
            }));
        self.warnings
            .extend(other.warnings.into_iter().map(|w| format!("{prefix}: {w}")));
    }

    /// `Ok` when valid, otherwise every violation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] holding all violations.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.violations))
        }
    }
}

/// All violations of a failed validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<Violation>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for (i, violation) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{violation}")?;
        }
        Ok(())
    }
}
