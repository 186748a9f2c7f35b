//! # Datastore access for attribution queries.
//!
//! The reconciliation engine never talks to the variant datastore directly. It only needs
//! one capability: "give me the records of this collection whose id field holds one of these
//! ids and that satisfy this predicate, projected to this field". That capability is the
//! [QueryableStore] trait.
//!
//! [DocumentStore] implements it over collection exports on disk (one JSON document per
//! line, optionally gzipped), which is what `mongoexport` produces.
//!
pub mod consts;
pub mod document;
pub mod errors;
pub mod query;

pub use document::DocumentStore;
pub use errors::StoreError;
pub use query::{FieldPath, MatchFilter, Predicate, QueryableStore, value_as_id};
