use std::fs::{create_dir_all, remove_file};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn};

use relval_core::{IdentifierSet, diff};
use relval_io::IdWrite;
use relval_store::QueryableStore;

use crate::category::AttributionCategory;
use crate::config::ReconcileConfig;
use crate::consts::*;
use crate::errors::ReconcileError;
use crate::evaluator::BatchedEvaluator;
use crate::report::{AttributionReport, CategoryAttribution, RunOutcome};
use crate::residual::ResidualTracker;
use crate::universe::UniverseSource;

///
/// Where a [Reconciliation] is in its run.
///
/// A run moves strictly forward; `Failed` can be reached from any state.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Initialized,
    SetsBuilt,
    DiffComputed,
    /// Evaluating the category at this index.
    Attributing(usize),
    Verified,
    Reported,
    Failed,
}

/// Per-run metadata: which assembly, where outputs go and when the run began.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub assembly: String,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new<P: AsRef<Path>>(assembly: &str, output_dir: P) -> Self {
        RunContext {
            assembly: assembly.to_string(),
            output_dir: output_dir.as_ref().to_path_buf(),
            started_at: Utc::now(),
        }
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    /// `<output_dir>/<assembly><suffix>`
    pub fn output_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", self.assembly, suffix))
    }

    pub fn category_path(&self, category: &str) -> PathBuf {
        self.output_path(&format!("_{}.txt", category))
    }
}

///
/// Reconciles a release against the datastore and explains every missing id.
///
/// The release universe minus the store universe gives the missing ids.
/// Categories are then evaluated in order, each one only on what the previous
/// ones left unexplained, so every missing id lands in at most one category.
/// Anything left at the end fails the run with
/// [ReconcileError::UnattributedResidual].
///
/// Every id set of the run is written next to the JSON report in the
/// context's output directory.
///
pub struct Reconciliation<'s, S: QueryableStore + ?Sized> {
    store: &'s S,
    categories: Vec<AttributionCategory>,
    evaluator: BatchedEvaluator,
    state: RunState,
}

impl<'s, S: QueryableStore + ?Sized> Reconciliation<'s, S> {
    pub fn new(config: &ReconcileConfig, store: &'s S) -> Result<Self, ReconcileError> {
        config.validate()?;

        Ok(Reconciliation {
            store,
            categories: config.categories(),
            evaluator: BatchedEvaluator::from_config(config)?,
            state: RunState::Initialized,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn categories(&self) -> &[AttributionCategory] {
        &self.categories
    }

    ///
    /// Build both universes and reconcile them.
    ///
    /// Outputs of an earlier run for the same assembly are removed first, so
    /// the output directory only ever describes this run.
    ///
    /// # Arguments
    /// - context: assembly, output directory and start time of the run
    /// - release: yields the ids published in the release files
    /// - store_side: yields the ids the datastore knows about
    ///
    pub fn run<R, T>(
        &mut self,
        context: &RunContext,
        release: &R,
        store_side: &T,
    ) -> Result<AttributionReport, ReconcileError>
    where
        R: UniverseSource + ?Sized,
        T: UniverseSource + ?Sized,
    {
        let span = info_span!("reconciliation", assembly = %context.assembly);
        let _guard = span.enter();

        self.state = RunState::Initialized;
        let result = self
            .clear_outputs(context)
            .and_then(|()| release.build_universe())
            .and_then(|release_ids| Ok((release_ids, store_side.build_universe()?)))
            .and_then(|(release_ids, store_ids)| {
                self.reconcile(context, &release_ids, &store_ids)
            });

        self.finish(result)
    }

    /// Reconcile universes that are already built.
    pub fn reconcile_sets(
        &mut self,
        context: &RunContext,
        release_ids: &IdentifierSet,
        store_ids: &IdentifierSet,
    ) -> Result<AttributionReport, ReconcileError> {
        let span = info_span!("reconciliation", assembly = %context.assembly);
        let _guard = span.enter();

        self.state = RunState::Initialized;
        let result = self
            .clear_outputs(context)
            .and_then(|()| self.reconcile(context, release_ids, store_ids));

        self.finish(result)
    }

    /// Every file a run may write for the context's assembly.
    pub fn output_paths(&self, context: &RunContext) -> Vec<PathBuf> {
        let mut paths = vec![
            context.output_path(UNIQUE_IDS_SUFFIX),
            context.output_path(MISSING_IDS_SUFFIX),
            context.output_path(RESIDUAL_IDS_SUFFIX),
            context.output_path(REPORT_SUFFIX),
        ];
        paths.extend(
            self.categories
                .iter()
                .map(|category| context.category_path(&category.name)),
        );
        paths
    }

    fn clear_outputs(&self, context: &RunContext) -> Result<(), ReconcileError> {
        for path in self.output_paths(context) {
            match remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed output of an earlier run"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn finish(
        &mut self,
        result: Result<AttributionReport, ReconcileError>,
    ) -> Result<AttributionReport, ReconcileError> {
        match &result {
            Ok(_) => self.state = RunState::Reported,
            Err(e) => {
                warn!("reconciliation failed: {}", e);
                self.state = RunState::Failed;
            }
        }
        result
    }

    fn reconcile(
        &mut self,
        context: &RunContext,
        release_ids: &IdentifierSet,
        store_ids: &IdentifierSet,
    ) -> Result<AttributionReport, ReconcileError> {
        self.state = RunState::SetsBuilt;
        info!(
            release = release_ids.len(),
            store = store_ids.len(),
            "built id universes"
        );

        create_dir_all(&context.output_dir)?;
        release_ids.write_ids(context.output_path(UNIQUE_IDS_SUFFIX))?;

        let missing = diff(release_ids, store_ids);
        self.state = RunState::DiffComputed;
        missing.write_ids(context.output_path(MISSING_IDS_SUFFIX))?;
        info!(missing = missing.len(), "computed ids missing from the store");

        let mut report = AttributionReport {
            assembly: context.assembly.clone(),
            started_at: context.started_at,
            outcome: RunOutcome::Success,
            error: None,
            release_count: release_ids.len(),
            store_count: store_ids.len(),
            missing_count: missing.len(),
            categories: Vec::with_capacity(self.categories.len()),
            residual: IdentifierSet::new(),
            residual_path: None,
        };
        let report_path = context.output_path(REPORT_SUFFIX);
        let residual_path = context.output_path(RESIDUAL_IDS_SUFFIX);

        if missing.is_empty() {
            info!("every released id is in the store");
            report.residual.write_ids(&residual_path)?;
            report.residual_path = Some(residual_path);
            report.write_json(&report_path)?;
            return Ok(report);
        }

        let mut tracker = ResidualTracker::new(missing);
        if let Err(e) = self.attribute_all(context, &mut tracker, &mut report) {
            report.outcome = RunOutcome::Failed;
            report.error = Some(e.to_string());
            report.residual = tracker.into_inner();
            if let Err(write_err) = report.write_json(&report_path) {
                warn!("can't record the failed run: {}", write_err);
            }
            return Err(e);
        }
        self.state = RunState::Verified;
        debug!(sizes = ?tracker.sizes(), "residual after each category");

        let residual = tracker.into_inner();
        residual.write_ids(&residual_path)?;

        let count = residual.len();
        report.residual = residual;
        report.residual_path = Some(residual_path.clone());

        if count == 0 {
            report.write_json(&report_path)?;
            return Ok(report);
        }

        report.outcome = RunOutcome::Unattributed;
        report.write_json(&report_path)?;
        Err(ReconcileError::UnattributedResidual {
            count,
            path: residual_path,
        })
    }

    /// Evaluate every category in order, shrinking the residual as it goes.
    fn attribute_all(
        &mut self,
        context: &RunContext,
        tracker: &mut ResidualTracker,
        report: &mut AttributionReport,
    ) -> Result<(), ReconcileError> {
        for (i, category) in self.categories.iter().enumerate() {
            self.state = RunState::Attributing(i);

            let matched = self
                .evaluator
                .attribute(category, tracker.current(), self.store)?;
            tracker.subtract(&matched);

            let path = context.category_path(&category.name);
            matched.write_ids(&path)?;
            info!(
                category = %category.name,
                matched = matched.len(),
                remaining = tracker.current().len(),
                "attributed missing ids"
            );

            report.categories.push(CategoryAttribution {
                name: category.name.clone(),
                matched,
                path: Some(path),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_output_paths() {
        let context = RunContext::new("GCA_000001405.15", "/tmp/out");
        assert_eq!(
            context.output_path(MISSING_IDS_SUFFIX),
            PathBuf::from("/tmp/out/GCA_000001405.15_missing_ids.txt")
        );
        assert_eq!(
            context.category_path(RS_WITH_TANDEM_REPEAT_TYPE),
            PathBuf::from("/tmp/out/GCA_000001405.15_rs_with_tandem_repeat_type.txt")
        );
    }

    #[rstest]
    fn test_new_rejects_invalid_config() {
        let store = relval_store::DocumentStore::from_documents(Vec::<(String, _)>::new());
        let config = ReconcileConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            Reconciliation::new(&config, &store),
            Err(ReconcileError::Config(_))
        ));
    }
}
