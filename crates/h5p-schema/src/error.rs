//! Schema error types

use thiserror::Error;

/// Errors produced while decoding schema-level data.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A field's `options` do not have the shape its `type` requires.
    #[error("Ambiguous schema: options of field '{field}' do not match type '{field_type}'")]
    AmbiguousOptions {
        /// Name of the offending field.
        field: String,
        /// The declared type tag.
        field_type: String,
    },

    /// A library reference string is not of the form `Machine.Name 1.2`.
    #[error("Invalid library reference: '{0}'")]
    InvalidLibraryRef(String),

    /// A question set was built without any question.
    #[error("Question set must have at least one question")]
    EmptyQuestionSet,

    /// The input is not valid JSON for the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
