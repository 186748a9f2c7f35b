//! # Release-file reconciliation and missing-id attribution.
//!
//! Given the RS IDs published in a release and the RS IDs present in the datastore, this crate
//! works out which released IDs the datastore no longer knows about and explains each one by
//! a known cause: the RS was merged, its submitted variants were declustered, it is a tandem
//! repeat, or its alleles carry non-nucleotide letters.
//!
//! Causes are evaluated one after another in a fixed order. Each [AttributionCategory] only
//! sees the ids its predecessors left unexplained, so the matched sets are disjoint and the
//! report is reproducible. Any id still unexplained at the end fails the run.
//!
//! # Example
//!
//! ```no_run
//! use relval_attribution::{Reconciliation, ReconcileConfig, RunContext};
//! use relval_io::{IdentifierSetBuilder, ReleaseFiles, SourceKind};
//! use relval_store::DocumentStore;
//!
//! let store = DocumentStore::open("store_exports").unwrap();
//! let release = IdentifierSetBuilder::for_release(&ReleaseFiles::for_assembly("release", "GCA_000003055.6"));
//! let store_ids = IdentifierSetBuilder::new().add_source(SourceKind::IdList, "mongo_unique_rs_ids.txt");
//!
//! let context = RunContext::new("GCA_000003055.6", "validation");
//! let mut reconciliation = Reconciliation::new(&ReconcileConfig::default(), &store).unwrap();
//! let report = reconciliation.run(&context, &release, &store_ids).unwrap();
//! println!("{} missing ids attributed", report.attributed_count());
//! ```

pub mod category;
pub mod config;
pub mod consts;
pub mod errors;
pub mod evaluator;
pub mod orchestrator;
pub mod report;
pub mod residual;
pub mod universe;

// re-exports
pub use category::{AttributionCategory, CategoryQuery, default_categories};
pub use config::ReconcileConfig;
pub use errors::ReconcileError;
pub use evaluator::BatchedEvaluator;
pub use orchestrator::{Reconciliation, RunContext, RunState};
pub use report::{AttributionReport, CategoryAttribution, RunOutcome};
pub use residual::ResidualTracker;
pub use universe::{StoreAccessions, UniverseSource};
