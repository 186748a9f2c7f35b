use relval_core::IdentifierSet;
use relval_io::IdentifierSetBuilder;
use relval_store::consts::{ACCESSION_FIELD, RS_UNIVERSE_COLLECTIONS};
use relval_store::{DocumentStore, FieldPath};

use crate::errors::ReconcileError;

/// Something a reconciliation can draw a full set of RS ids from.
pub trait UniverseSource {
    fn build_universe(&self) -> Result<IdentifierSet, ReconcileError>;
}

impl UniverseSource for IdentifierSetBuilder {
    fn build_universe(&self) -> Result<IdentifierSet, ReconcileError> {
        Ok(self.build()?)
    }
}

impl UniverseSource for IdentifierSet {
    fn build_universe(&self) -> Result<IdentifierSet, ReconcileError> {
        Ok(self.clone())
    }
}

///
/// The accessions a [DocumentStore] holds, read straight from its exports.
///
pub struct StoreAccessions<'a> {
    store: &'a DocumentStore,
    collections: Vec<String>,
    field: FieldPath,
}

impl<'a> StoreAccessions<'a> {
    /// The clustered variant collections, keyed on `accession`.
    pub fn new(store: &'a DocumentStore) -> Self {
        StoreAccessions {
            store,
            collections: RS_UNIVERSE_COLLECTIONS.iter().map(|c| c.to_string()).collect(),
            field: FieldPath::from_segments(&[ACCESSION_FIELD]),
        }
    }

    pub fn with_collections(mut self, collections: Vec<String>) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_field(mut self, field: FieldPath) -> Self {
        self.field = field;
        self
    }
}

impl UniverseSource for StoreAccessions<'_> {
    fn build_universe(&self) -> Result<IdentifierSet, ReconcileError> {
        let collections: Vec<&str> = self.collections.iter().map(String::as_str).collect();
        Ok(self.store.distinct_ids(&collections, &self.field)?)
    }
}
