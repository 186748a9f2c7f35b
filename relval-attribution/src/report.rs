use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use relval_core::IdentifierSet;

use crate::errors::ReconcileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every missing id was attributed (or nothing was missing).
    Success,
    /// Some missing ids could not be attributed to any category.
    Unattributed,
    /// Attribution stopped on an error; counts cover the categories reached.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAttribution {
    pub name: String,
    #[serde(rename = "matched_count", serialize_with = "serialize_len")]
    pub matched: IdentifierSet,
    pub path: Option<PathBuf>,
}

///
/// What one reconciliation run found.
///
/// Category entries keep evaluation order. The JSON form carries counts and
/// file paths only; the ids themselves live in the per-category files.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionReport {
    pub assembly: String,
    pub started_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub release_count: usize,
    pub store_count: usize,
    pub missing_count: usize,
    pub categories: Vec<CategoryAttribution>,
    #[serde(rename = "residual_count", serialize_with = "serialize_len")]
    pub residual: IdentifierSet,
    pub residual_path: Option<PathBuf>,
}

fn serialize_len<S: Serializer>(ids: &IdentifierSet, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(ids.len() as u64)
}

impl AttributionReport {
    pub fn matched(&self, category: &str) -> Option<&IdentifierSet> {
        self.categories
            .iter()
            .find(|attribution| attribution.name == category)
            .map(|attribution| &attribution.matched)
    }

    pub fn attributed_count(&self) -> usize {
        self.categories.iter().map(|c| c.matched.len()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == RunOutcome::Success && self.residual.is_empty()
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ReconcileError> {
        let wrap = |source| ReconcileError::Report {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(wrap)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| wrap(e.into()))?;
        writeln!(writer).map_err(wrap)?;
        writer.flush().map_err(wrap)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::{Value, json};

    #[fixture]
    fn report() -> AttributionReport {
        AttributionReport {
            assembly: "GCA_1.1".to_string(),
            started_at: DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            outcome: RunOutcome::Unattributed,
            error: None,
            release_count: 5,
            store_count: 3,
            missing_count: 2,
            categories: vec![CategoryAttribution {
                name: "rs_with_merged_ss_parents".to_string(),
                matched: IdentifierSet::from_unsorted(vec![4]),
                path: Some(PathBuf::from("GCA_1.1_rs_with_merged_ss_parents.txt")),
            }],
            residual: IdentifierSet::from_unsorted(vec![5]),
            residual_path: Some(PathBuf::from("GCA_1.1_rs_still_missing.txt")),
        }
    }

    #[rstest]
    fn test_accessors(report: AttributionReport) {
        assert_eq!(report.attributed_count(), 1);
        assert_eq!(
            report.matched("rs_with_merged_ss_parents").unwrap().as_slice(),
            &[4]
        );
        assert!(report.matched("other").is_none());
        assert!(!report.is_complete());
    }

    #[rstest]
    fn test_json_has_counts_not_ids(report: AttributionReport) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["outcome"], json!("unattributed"));
        assert_eq!(value["residual_count"], json!(1));
        assert_eq!(value["categories"][0]["matched_count"], json!(1));
        assert_eq!(value["started_at"], json!("2024-03-01T10:00:00Z"));
        assert!(value.get("error").is_none());
    }
}
