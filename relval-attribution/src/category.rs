use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use relval_store::consts::*;
use relval_store::{FieldPath, Predicate};

use crate::consts::*;
use crate::errors::ReconcileError;

///
/// One lookup a category performs: which collections to search, where the
/// candidate RS id sits in their records, and what else must hold.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryQuery {
    pub collections: Vec<String>,
    pub id_field: FieldPath,
    #[serde(default)]
    pub predicate: Option<Predicate>,
}

///
/// A known cause for an RS id being absent from the datastore.
///
/// A candidate is explained by the category when any of its queries finds a
/// record for it.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributionCategory {
    pub name: String,
    pub queries: Vec<CategoryQuery>,
}

impl AttributionCategory {
    pub fn new(name: &str, queries: Vec<CategoryQuery>) -> Self {
        AttributionCategory {
            name: name.to_string(),
            queries,
        }
    }

    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.name.trim().is_empty() {
            return Err(ReconcileError::Config(
                "attribution category with an empty name".to_string(),
            ));
        }
        if self.queries.is_empty() {
            return Err(ReconcileError::Config(format!(
                "category {:?} has no queries",
                self.name
            )));
        }
        // the name becomes part of an output file name
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ReconcileError::Config(format!(
                "category name {:?} may only hold ASCII letters, digits, '_' and '-'",
                self.name
            )));
        }

        for query in &self.queries {
            if query.collections.is_empty() {
                return Err(ReconcileError::Config(format!(
                    "category {:?} has a query without collections",
                    self.name
                )));
            }
            if let Some(predicate) = &query.predicate {
                predicate
                    .compile()
                    .map_err(|e| ReconcileError::Config(format!("category {:?}: {}", self.name, e)))?;
            }
        }

        Ok(())
    }
}

/// Check a whole ordered category list: each entry valid, names unique.
pub fn validate_categories(categories: &[AttributionCategory]) -> Result<(), ReconcileError> {
    if categories.is_empty() {
        return Err(ReconcileError::Config(
            "at least one attribution category is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for category in categories {
        category.validate()?;
        if !seen.insert(category.name.as_str()) {
            return Err(ReconcileError::Config(format!(
                "duplicate category name {:?}",
                category.name
            )));
        }
    }

    Ok(())
}

fn collections(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn equals(field: &[&str], value: &str) -> Predicate {
    Predicate::Equals {
        field: FieldPath::from_segments(field),
        value: value.into(),
    }
}

fn not_nucleotides(field: &[&str]) -> Predicate {
    Predicate::NotMatches {
        field: FieldPath::from_segments(field),
        pattern: NUCLEOTIDES_ONLY_PATTERN.to_string(),
    }
}

///
/// The standard attribution categories, in evaluation order.
///
/// The order is a precedence policy: an id explained by an earlier category
/// is never offered to a later one.
///
pub fn default_categories() -> Vec<AttributionCategory> {
    let operations = collections(&[
        DBSNP_SUBMITTED_VARIANT_OPERATION_ENTITY,
        SUBMITTED_VARIANT_OPERATION_ENTITY,
    ]);
    let inactive_rs = FieldPath::from_segments(&["inactiveObjects", "rs"]);

    vec![
        AttributionCategory::new(
            RS_WITH_MERGED_SS_PARENTS,
            vec![CategoryQuery {
                collections: operations.clone(),
                id_field: inactive_rs.clone(),
                predicate: Some(equals(&["eventType"], "MERGED")),
            }],
        ),
        AttributionCategory::new(
            RS_WITH_DECLUSTERED_SS_PARENTS,
            vec![CategoryQuery {
                collections: operations.clone(),
                id_field: inactive_rs.clone(),
                predicate: Some(Predicate::All {
                    of: vec![
                        equals(&["eventType"], "UPDATED"),
                        Predicate::Matches {
                            field: FieldPath::from_segments(&["reason"]),
                            pattern: DECLUSTERED_REASON_PATTERN.to_string(),
                        },
                    ],
                }),
            }],
        ),
        AttributionCategory::new(
            RS_WITH_TANDEM_REPEAT_TYPE,
            vec![CategoryQuery {
                collections: collections(&[
                    DBSNP_CLUSTERED_VARIANT_ENTITY,
                    CLUSTERED_VARIANT_ENTITY,
                ]),
                id_field: FieldPath::from_segments(&[ACCESSION_FIELD]),
                predicate: Some(equals(&["type"], "TANDEM_REPEAT")),
            }],
        ),
        AttributionCategory::new(
            RS_WITH_NON_NUCLEOTIDE_LETTERS,
            vec![
                CategoryQuery {
                    collections: collections(&[
                        DBSNP_SUBMITTED_VARIANT_ENTITY,
                        SUBMITTED_VARIANT_ENTITY,
                    ]),
                    id_field: FieldPath::from_segments(&["rs"]),
                    predicate: Some(Predicate::Any {
                        of: vec![not_nucleotides(&["ref"]), not_nucleotides(&["alt"])],
                    }),
                },
                CategoryQuery {
                    collections: operations,
                    id_field: inactive_rs,
                    predicate: Some(Predicate::Any {
                        of: vec![
                            not_nucleotides(&["inactiveObjects", "ref"]),
                            not_nucleotides(&["inactiveObjects", "alt"]),
                        ],
                    }),
                },
            ],
        ),
    ]
}
