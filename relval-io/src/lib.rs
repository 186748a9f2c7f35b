//! # Input/Output for RS release validation.
//!
//! This crate turns the flat-file exports of a release (active, merged, multimap, deprecated
//! and merged-deprecated RS IDs) and of the datastore (accession dumps) into canonical
//! [relval_core::IdentifierSet]s, and writes identifier sets back to disk as one-id-per-line
//! text files (gzipped when the path ends in `.gz`).
//!
pub mod builder;
pub mod consts;
pub mod source;
pub mod writer;

// re-expose core functions
pub use builder::*;
pub use consts::*;
pub use source::*;
pub use writer::*;
