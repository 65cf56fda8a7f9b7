//! Command modules - one file per CLI command

pub mod extract;
pub mod inspect;
pub mod pack;
pub mod questions;
pub mod validate;
