use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde_json::Value;
use tracing::debug;

use relval_core::IdentifierSet;
use relval_store::{MatchFilter, QueryableStore, StoreError, value_as_id};

use crate::category::AttributionCategory;
use crate::config::ReconcileConfig;
use crate::errors::ReconcileError;

///
/// Runs an [AttributionCategory] against a store in bounded batches.
///
/// Candidate ids are split into sorted batches of at most `batch_size` ids,
/// one store query is issued per (batch, category query, collection), and the
/// per-batch results are merged by set union. With more than one worker the
/// batches of a category are queried on a dedicated thread pool; the merged
/// result does not depend on the order batches complete in.
///
/// Every collection is prepared with [QueryableStore::prepare] before the
/// first batch, outside the timeout. The timeout then bounds each completed
/// query call: store calls are synchronous, so a call over the limit is
/// detected when it returns and aborts the category.
///
pub struct BatchedEvaluator {
    batch_size: usize,
    query_timeout: Option<Duration>,
    pool: Option<ThreadPool>,
}

impl BatchedEvaluator {
    pub fn new(batch_size: usize) -> Self {
        BatchedEvaluator {
            batch_size: batch_size.max(1),
            query_timeout: None,
            pool: None,
        }
    }

    pub fn from_config(config: &ReconcileConfig) -> Result<Self, ReconcileError> {
        BatchedEvaluator::new(config.batch_size)
            .with_workers(config.workers)
            .map(|evaluator| evaluator.with_query_timeout(config.query_timeout()))
    }

    pub fn with_workers(mut self, workers: usize) -> Result<Self, ReconcileError> {
        self.pool = match workers {
            0 | 1 => None,
            n => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("relval-query-{}", i))
                    .build()
                    .map_err(|e| ReconcileError::Config(format!("can't start query workers: {}", e)))?,
            ),
        };
        Ok(self)
    }

    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    ///
    /// The subset of `candidates` the category explains.
    ///
    /// # Arguments
    /// - category: the cause being tested
    /// - candidates: ids still unexplained
    /// - store: where the category's collections live
    ///
    pub fn attribute<S: QueryableStore + ?Sized>(
        &self,
        category: &AttributionCategory,
        candidates: &IdentifierSet,
        store: &S,
    ) -> Result<IdentifierSet, ReconcileError> {
        if candidates.is_empty() {
            return Ok(IdentifierSet::new());
        }

        let batches: Vec<&[u64]> = candidates.chunks(self.batch_size).collect();
        debug!(
            category = %category.name,
            candidates = candidates.len(),
            batches = batches.len(),
            "evaluating category"
        );

        let wrap = |source: StoreError| ReconcileError::StoreQuery {
            category: category.name.clone(),
            source,
        };

        for query in &category.queries {
            for collection in &query.collections {
                store.prepare(collection, &query.id_field).map_err(wrap)?;
            }
        }

        let per_batch: Result<Vec<Vec<u64>>, StoreError> = match &self.pool {
            Some(pool) => pool.install(|| {
                batches
                    .par_iter()
                    .map(|batch| self.query_batch(category, batch, store))
                    .collect()
            }),
            None => batches
                .iter()
                .map(|batch| self.query_batch(category, batch, store))
                .collect(),
        };

        let matched = per_batch.map_err(wrap)?.into_iter().flatten().collect();
        Ok(IdentifierSet::from_unsorted(matched))
    }

    fn query_batch<S: QueryableStore + ?Sized>(
        &self,
        category: &AttributionCategory,
        batch: &[u64],
        store: &S,
    ) -> Result<Vec<u64>, StoreError> {
        let mut found = Vec::new();

        for query in &category.queries {
            let filter = MatchFilter {
                id_field: &query.id_field,
                ids: batch,
                predicate: query.predicate.as_ref(),
            };

            for collection in &query.collections {
                let started = Instant::now();
                let records = store.query(collection, &filter, &query.id_field)?;
                let elapsed = started.elapsed();

                if let Some(limit) = self.query_timeout {
                    if elapsed > limit {
                        return Err(StoreError::Timeout {
                            collection: collection.clone(),
                            elapsed,
                        });
                    }
                }

                for record in &records {
                    collect_ids(record, &mut found);
                }
            }
        }

        // a record may carry other ids next to the one that matched (e.g. every
        // RS touched by a merge event); only the batch's own ids count
        found.retain(|id| batch.binary_search(id).is_ok());
        Ok(found)
    }
}

fn collect_ids(value: &Value, ids: &mut Vec<u64>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_ids(item, ids)),
        other => ids.extend(value_as_id(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    use relval_store::{FieldPath, Predicate};

    use crate::category::CategoryQuery;

    /// Echoes back every even id it is asked about, twice, as nested arrays.
    struct EvenStore {
        queries: AtomicUsize,
        batch_sizes: Mutex<Vec<usize>>,
    }

    impl EvenStore {
        fn new() -> Self {
            EvenStore {
                queries: AtomicUsize::new(0),
                batch_sizes: Mutex::new(Vec::new()),
            }
        }
    }

    impl QueryableStore for EvenStore {
        fn query(
            &self,
            _collection: &str,
            filter: &MatchFilter<'_>,
            _projection: &FieldPath,
        ) -> Result<Vec<Value>, StoreError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.batch_sizes.lock().unwrap().push(filter.ids.len());
            Ok(filter
                .ids
                .iter()
                .filter(|id| *id % 2 == 0)
                .flat_map(|id| vec![json!([id]), json!([id, 1_000_000_000])])
                .collect())
        }
    }

    #[derive(Default)]
    struct FailingStore {
        queries: AtomicUsize,
    }

    impl QueryableStore for FailingStore {
        fn query(
            &self,
            collection: &str,
            _filter: &MatchFilter<'_>,
            _projection: &FieldPath,
        ) -> Result<Vec<Value>, StoreError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Backend(format!("{} is unavailable", collection)))
        }
    }

    struct SlowStore;

    impl QueryableStore for SlowStore {
        fn query(
            &self,
            _collection: &str,
            _filter: &MatchFilter<'_>,
            _projection: &FieldPath,
        ) -> Result<Vec<Value>, StoreError> {
            std::thread::sleep(Duration::from_millis(50));
            Ok(vec![])
        }
    }

    /// Slow to load each collection, quick to answer afterwards.
    #[derive(Default)]
    struct ColdStore {
        prepared: Mutex<Vec<String>>,
    }

    impl QueryableStore for ColdStore {
        fn prepare(&self, collection: &str, _id_field: &FieldPath) -> Result<(), StoreError> {
            std::thread::sleep(Duration::from_millis(50));
            self.prepared.lock().unwrap().push(collection.to_string());
            Ok(())
        }

        fn query(
            &self,
            _collection: &str,
            filter: &MatchFilter<'_>,
            _projection: &FieldPath,
        ) -> Result<Vec<Value>, StoreError> {
            Ok(filter.ids.iter().map(|id| json!(id)).collect())
        }
    }

    #[fixture]
    fn category() -> AttributionCategory {
        AttributionCategory::new(
            "rs_with_merged_ss_parents",
            vec![CategoryQuery {
                collections: vec!["submittedVariantOperationEntity".to_string()],
                id_field: FieldPath::from_segments(&["inactiveObjects", "rs"]),
                predicate: Some(Predicate::equals("eventType", "MERGED").unwrap()),
            }],
        )
    }

    #[rstest]
    fn test_batch_boundaries(category: AttributionCategory) {
        let candidates: IdentifierSet = (1..=2500u64).collect();

        let store = EvenStore::new();
        let batched = BatchedEvaluator::new(1000)
            .attribute(&category, &candidates, &store)
            .unwrap();
        assert_eq!(store.queries.load(Ordering::SeqCst), 3);
        assert_eq!(*store.batch_sizes.lock().unwrap(), vec![1000, 1000, 500]);

        let unbounded_store = EvenStore::new();
        let unbounded = BatchedEvaluator::new(usize::MAX)
            .attribute(&category, &candidates, &unbounded_store)
            .unwrap();
        assert_eq!(unbounded_store.queries.load(Ordering::SeqCst), 1);

        assert_eq!(batched, unbounded);
        assert_eq!(batched.len(), 1250);
        assert!(batched.is_subset(&candidates));
    }

    #[rstest]
    fn test_parallel_matches_serial(category: AttributionCategory) {
        let candidates: IdentifierSet = (0..10_000u64).map(|i| i * 7).collect();

        let serial = BatchedEvaluator::new(100)
            .attribute(&category, &candidates, &EvenStore::new())
            .unwrap();
        let parallel = BatchedEvaluator::new(100)
            .with_workers(4)
            .unwrap()
            .attribute(&category, &candidates, &EvenStore::new())
            .unwrap();

        assert_eq!(serial, parallel);
    }

    #[rstest]
    fn test_every_query_and_collection_is_consulted() {
        let category = AttributionCategory::new(
            "rs_with_non_nucleotide_letters",
            vec![
                CategoryQuery {
                    collections: vec!["a".to_string(), "b".to_string()],
                    id_field: FieldPath::from_segments(&["rs"]),
                    predicate: None,
                },
                CategoryQuery {
                    collections: vec!["c".to_string()],
                    id_field: FieldPath::from_segments(&["inactiveObjects", "rs"]),
                    predicate: None,
                },
            ],
        );
        let store = EvenStore::new();
        let candidates: IdentifierSet = (1..=10u64).collect();

        let matched = BatchedEvaluator::new(4)
            .attribute(&category, &candidates, &store)
            .unwrap();

        // 3 batches x 3 collections
        assert_eq!(store.queries.load(Ordering::SeqCst), 9);
        assert_eq!(matched.as_slice(), &[2, 4, 6, 8, 10]);
    }

    #[rstest]
    fn test_store_error_carries_category(category: AttributionCategory) {
        let candidates: IdentifierSet = (1..=5u64).collect();
        let err = BatchedEvaluator::new(2)
            .attribute(&category, &candidates, &FailingStore::default())
            .unwrap_err();

        match err {
            ReconcileError::StoreQuery { category, source } => {
                assert_eq!(category, "rs_with_merged_ss_parents");
                assert!(matches!(source, StoreError::Backend(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn test_first_failing_batch_stops_the_category(category: AttributionCategory) {
        let candidates: IdentifierSet = (1..=10u64).collect();
        let store = FailingStore::default();

        BatchedEvaluator::new(2)
            .attribute(&category, &candidates, &store)
            .unwrap_err();

        assert_eq!(store.queries.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn test_preparing_collections_is_not_timed(category: AttributionCategory) {
        let candidates: IdentifierSet = (1..=6u64).collect();
        let store = ColdStore::default();

        let matched = BatchedEvaluator::new(2)
            .with_query_timeout(Some(Duration::from_millis(20)))
            .attribute(&category, &candidates, &store)
            .unwrap();

        assert_eq!(matched, candidates);
        assert_eq!(
            *store.prepared.lock().unwrap(),
            vec!["submittedVariantOperationEntity".to_string()]
        );
    }

    #[rstest]
    fn test_slow_query_aborts(category: AttributionCategory) {
        let candidates: IdentifierSet = (1..=5u64).collect();
        let err = BatchedEvaluator::new(10)
            .with_query_timeout(Some(Duration::from_millis(1)))
            .attribute(&category, &candidates, &SlowStore)
            .unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::StoreQuery {
                source: StoreError::Timeout { .. },
                ..
            }
        ));
    }

    #[rstest]
    fn test_no_candidates_no_queries(category: AttributionCategory) {
        let store = EvenStore::new();
        let matched = BatchedEvaluator::new(10)
            .attribute(&category, &IdentifierSet::new(), &store)
            .unwrap();

        assert!(matched.is_empty());
        assert_eq!(store.queries.load(Ordering::SeqCst), 0);
    }
}
