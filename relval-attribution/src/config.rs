use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::category::{AttributionCategory, default_categories, validate_categories};
use crate::consts::{DEFAULT_BATCH_SIZE, DEFAULT_WORKERS};
use crate::errors::ReconcileError;

///
/// Tunables of one reconciliation run.
///
/// Every field is optional in the TOML file; omitted fields keep their
/// defaults. Leaving out `categories` selects [default_categories].
///
/// ```toml
/// batch_size = 500
/// workers = 4
/// query_timeout_secs = 600
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Maximum number of ids per store query.
    pub batch_size: usize,
    /// Threads used to query batches of one category concurrently.
    pub workers: usize,
    /// Abort the run when a single store query takes longer than this.
    pub query_timeout_secs: Option<u64>,
    /// Ordered category list overriding the defaults.
    pub categories: Option<Vec<AttributionCategory>>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            batch_size: DEFAULT_BATCH_SIZE,
            workers: DEFAULT_WORKERS,
            query_timeout_secs: None,
            categories: None,
        }
    }
}

impl ReconcileConfig {
    ///
    /// Load a config from disk.
    ///
    /// # Arguments
    /// - path: Path to the config file (a .toml) file.
    pub fn try_from(path: &Path) -> Result<ReconcileConfig, ReconcileError> {
        let toml_str = read_to_string(path)?;
        let config: ReconcileConfig = toml::from_str(&toml_str)
            .map_err(|e| ReconcileError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.batch_size == 0 {
            return Err(ReconcileError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(ReconcileError::Config(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.query_timeout_secs == Some(0) {
            return Err(ReconcileError::Config(
                "query_timeout_secs must be at least 1".to_string(),
            ));
        }
        validate_categories(&self.categories())
    }

    /// The categories to evaluate, in order.
    pub fn categories(&self) -> Vec<AttributionCategory> {
        self.categories.clone().unwrap_or_else(default_categories)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }
}
