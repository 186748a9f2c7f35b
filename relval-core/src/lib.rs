//! # Core models and utilities for relval.
//!
//! This crate holds the pieces every other relval crate leans on: the [models::IdentifierSet]
//! (a sorted, deduplicated set of RS accession numbers with linear-time set algebra), the
//! identifier parsing rules shared by every input format, and the dynamic (gzip-aware) readers
//! and writers used to stream very large ID files.
//!
pub mod consts;
pub mod errors;
pub mod models;
pub mod utils;

// re-expose the types nearly every caller needs
pub use errors::IdentifierError;
pub use models::{IdentifierSet, diff};
