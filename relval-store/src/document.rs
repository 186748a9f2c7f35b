use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, info};

use relval_core::IdentifierSet;
use relval_core::utils::get_dynamic_reader;

use crate::consts::COLLECTION_FILE_EXTENSIONS;
use crate::errors::StoreError;
use crate::query::{FieldPath, MatchFilter, QueryableStore, value_as_id};

/// id -> positions of the documents holding it
type IdIndex = HashMap<u64, Vec<usize>>;

struct Collection {
    documents: Vec<Value>,
    indexes: RwLock<HashMap<FieldPath, Arc<IdIndex>>>,
}

impl Collection {
    fn new(documents: Vec<Value>) -> Self {
        Collection {
            documents,
            indexes: RwLock::new(HashMap::new()),
        }
    }

    fn index_on(&self, field: &FieldPath) -> Arc<IdIndex> {
        if let Some(index) = read_lock(&self.indexes).get(field) {
            return Arc::clone(index);
        }

        let mut index: IdIndex = HashMap::new();
        for (position, document) in self.documents.iter().enumerate() {
            for id in field.resolve(document).into_iter().filter_map(value_as_id) {
                let positions = index.entry(id).or_default();
                if positions.last() != Some(&position) {
                    positions.push(position);
                }
            }
        }

        let index = Arc::new(index);
        write_lock(&self.indexes)
            .entry(field.clone())
            .or_insert_with(|| Arc::clone(&index));
        index
    }
}

///
/// A read-only document store backed by collection exports on disk.
///
/// Each collection lives in `<root>/<collection>.jsonl` (or `.json`, either
/// optionally gzipped) with one JSON document per line. Collections are
/// loaded on first use and an id index is built per queried field, so
/// repeated batched lookups stay cheap.
///
pub struct DocumentStore {
    root: Option<PathBuf>,
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl DocumentStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Store directory not found: {}", root.display()),
            )));
        }

        Ok(DocumentStore {
            root: Some(root.to_path_buf()),
            collections: RwLock::new(HashMap::new()),
        })
    }

    ///
    /// Build a store from documents already in memory.
    ///
    /// Only the given collections exist; anything else is unknown.
    ///
    pub fn from_documents<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let collections: HashMap<String, Arc<Collection>> = collections
            .into_iter()
            .map(|(name, documents)| (name.into(), Arc::new(Collection::new(documents))))
            .collect();

        DocumentStore {
            root: None,
            collections: RwLock::new(collections),
        }
    }

    pub fn collection_path(&self, collection: &str) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        COLLECTION_FILE_EXTENSIONS
            .iter()
            .map(|ext| root.join(format!("{}.{}", collection, ext)))
            .find(|path| path.is_file())
    }

    fn export_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        self.collection_path(name)
            .ok_or_else(|| StoreError::UnknownCollection {
                collection: name.to_string(),
                root: self.root.clone().unwrap_or_default(),
            })
    }

    fn collection(&self, name: &str) -> Result<Arc<Collection>, StoreError> {
        if let Some(collection) = read_lock(&self.collections).get(name) {
            return Ok(Arc::clone(collection));
        }

        let path = self.export_path(name)?;
        let mut documents = Vec::new();
        for_each_document(name, &path, |document| documents.push(document))?;
        info!(
            collection = name,
            documents = documents.len(),
            "loaded collection export"
        );

        let mut collections = write_lock(&self.collections);
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Collection::new(documents)));
        Ok(Arc::clone(collection))
    }

    ///
    /// Every distinct id found under `field` across `collections`.
    ///
    /// This is the store-side RS universe when called with the clustered
    /// variant collections and `accession`. Exports not loaded yet are
    /// streamed line by line and not kept in memory.
    ///
    pub fn distinct_ids(
        &self,
        collections: &[&str],
        field: &FieldPath,
    ) -> Result<IdentifierSet, StoreError> {
        let mut ids = Vec::new();
        for name in collections {
            let loaded = read_lock(&self.collections).get(*name).cloned();
            match loaded {
                Some(collection) => {
                    for document in &collection.documents {
                        ids.extend(field.resolve(document).into_iter().filter_map(value_as_id));
                    }
                }
                None => {
                    let path = self.export_path(name)?;
                    for_each_document(name, &path, |document| {
                        ids.extend(field.resolve(&document).into_iter().filter_map(value_as_id));
                    })?;
                    debug!(collection = *name, "streamed collection export");
                }
            }
        }
        Ok(IdentifierSet::from_unsorted(ids))
    }

    pub fn is_loaded(&self, collection: &str) -> bool {
        read_lock(&self.collections).contains_key(collection)
    }
}

impl QueryableStore for DocumentStore {
    fn prepare(&self, collection: &str, id_field: &FieldPath) -> Result<(), StoreError> {
        self.collection(collection)?.index_on(id_field);
        Ok(())
    }

    fn query(
        &self,
        collection: &str,
        filter: &MatchFilter<'_>,
        projection: &FieldPath,
    ) -> Result<Vec<Value>, StoreError> {
        let predicate = filter.predicate.map(|p| p.compile()).transpose()?;
        let collection = self.collection(collection)?;
        let index = collection.index_on(filter.id_field);

        let mut positions: Vec<usize> = filter
            .ids
            .iter()
            .filter_map(|id| index.get(id))
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();

        let records: Vec<Value> = positions
            .into_iter()
            .map(|position| &collection.documents[position])
            .filter(|document| predicate.as_ref().is_none_or(|p| p.is_match(document)))
            .map(|document| project(document, projection))
            .collect();

        debug!(
            batch = filter.ids.len(),
            records = records.len(),
            "document store query"
        );

        Ok(records)
    }
}

fn project(document: &Value, projection: &FieldPath) -> Value {
    let mut values = projection.resolve(document);
    match (projection.is_nested(document), values.len()) {
        (false, 1) => values.remove(0).clone(),
        _ => Value::Array(values.into_iter().cloned().collect()),
    }
}

fn for_each_document<F>(collection: &str, path: &Path, mut f: F) -> Result<(), StoreError>
where
    F: FnMut(Value),
{
    let reader = get_dynamic_reader(path)?;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let document =
            serde_json::from_str(&line).map_err(|source| StoreError::InvalidDocument {
                collection: collection.to_string(),
                line: index + 1,
                source,
            })?;
        f(document);
    }

    Ok(())
}

// Entries are inserted whole, so a poisoned lock is still safe to use.
fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
