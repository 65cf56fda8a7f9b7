//! Shared wire types for H5P packages.
//!
//! - [`types`]: `h5p.json` metadata, `library.json` definitions, library
//!   references and version triples.
//! - [`semantics`]: the `semantics.json` field tree and its polymorphic
//!   `options` codec.
//! - [`content`]: typed question-set and multiple-choice parameters.

pub mod content;
pub mod error;
pub mod semantics;
pub mod types;

// Re-exports
pub use error::SchemaError;
pub use semantics::{Field, FieldOptions, FieldType, SelectOption, Semantics, ShowRule, ShowWhen};
pub use types::*;
