use std::fmt::{self, Display};
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{NUMBER_INT_KEY, NUMBER_LONG_KEY};
use crate::errors::StoreError;

///
/// A dotted path into a document, e.g. `inactiveObjects.rs`.
///
/// Resolution walks through arrays transparently: every element of an array
/// met along the way is followed, and an array found at the end of the path
/// is flattened into its elements.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Build a path from known-good segments, e.g. `&["inactiveObjects", "rs"]`.
    pub fn from_segments(segments: &[&str]) -> Self {
        FieldPath {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Every leaf value this path reaches in `document`.
    pub fn resolve<'a>(&self, document: &'a Value) -> Vec<&'a Value> {
        let mut current: Vec<&'a Value> = vec![document];

        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                match value {
                    Value::Object(map) => {
                        if let Some(child) = map.get(segment) {
                            next.push(child);
                        }
                    }
                    Value::Array(items) => {
                        for item in items {
                            if let Some(child) = item.as_object().and_then(|m| m.get(segment)) {
                                next.push(child);
                            }
                        }
                    }
                    _ => {}
                }
            }
            current = next;
        }

        let mut leaves = Vec::with_capacity(current.len());
        for value in current {
            match value {
                Value::Array(items) => leaves.extend(items.iter()),
                other => leaves.push(other),
            }
        }
        leaves
    }

    /// Whether the path crosses an array field in `document`.
    pub fn is_nested(&self, document: &Value) -> bool {
        let mut current = document;
        for segment in &self.segments {
            match current {
                Value::Object(map) => match map.get(segment) {
                    Some(Value::Array(_)) => return true,
                    Some(child) => current = child,
                    None => return false,
                },
                Value::Array(_) => return true,
                _ => return false,
            }
        }
        false
    }
}

impl FromStr for FieldPath {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(StoreError::InvalidFieldPath(s.to_string()));
        }
        Ok(FieldPath { segments })
    }
}

impl TryFrom<String> for FieldPath {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldPath> for String {
    fn from(value: FieldPath) -> Self {
        value.to_string()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

///
/// Read an RS id out of a JSON value.
///
/// Accepts plain non-negative integers, integral strings and the extended
/// JSON wrappers (`{"$numberLong": "123"}`) that collection exports use.
///
pub fn value_as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(s) => s.parse().ok(),
        Value::Object(map) => map
            .get(NUMBER_LONG_KEY)
            .or_else(|| map.get(NUMBER_INT_KEY))
            .and_then(value_as_id),
        _ => None,
    }
}

///
/// Extra condition a record must satisfy on top of the id filter.
///
/// `Equals` and `Matches` hold when any value resolved from the field
/// satisfies them. `NotMatches` holds when no resolved string matches the
/// pattern, which includes records lacking the field.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Equals { field: FieldPath, value: Value },
    Matches { field: FieldPath, pattern: String },
    NotMatches { field: FieldPath, pattern: String },
    All { of: Vec<Predicate> },
    Any { of: Vec<Predicate> },
}

impl Predicate {
    pub fn equals(field: &str, value: impl Into<Value>) -> Result<Self, StoreError> {
        Ok(Predicate::Equals {
            field: field.parse()?,
            value: value.into(),
        })
    }

    pub fn matches(field: &str, pattern: &str) -> Result<Self, StoreError> {
        Ok(Predicate::Matches {
            field: field.parse()?,
            pattern: pattern.to_string(),
        })
    }

    pub fn not_matches(field: &str, pattern: &str) -> Result<Self, StoreError> {
        Ok(Predicate::NotMatches {
            field: field.parse()?,
            pattern: pattern.to_string(),
        })
    }

    /// Compile every pattern once so the predicate can be applied to many records.
    pub fn compile(&self) -> Result<CompiledPredicate, StoreError> {
        let compile_pattern = |pattern: &str| {
            Regex::new(pattern).map_err(|source| StoreError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        };

        let compiled = match self {
            Predicate::Equals { field, value } => CompiledPredicate::Equals {
                field: field.clone(),
                value: value.clone(),
            },
            Predicate::Matches { field, pattern } => CompiledPredicate::Matches {
                field: field.clone(),
                regex: compile_pattern(pattern)?,
            },
            Predicate::NotMatches { field, pattern } => CompiledPredicate::NotMatches {
                field: field.clone(),
                regex: compile_pattern(pattern)?,
            },
            Predicate::All { of } => CompiledPredicate::All(
                of.iter()
                    .map(Predicate::compile)
                    .collect::<Result<_, _>>()?,
            ),
            Predicate::Any { of } => CompiledPredicate::Any(
                of.iter()
                    .map(Predicate::compile)
                    .collect::<Result<_, _>>()?,
            ),
        };

        Ok(compiled)
    }
}

#[derive(Debug, Clone)]
pub enum CompiledPredicate {
    Equals { field: FieldPath, value: Value },
    Matches { field: FieldPath, regex: Regex },
    NotMatches { field: FieldPath, regex: Regex },
    All(Vec<CompiledPredicate>),
    Any(Vec<CompiledPredicate>),
}

impl CompiledPredicate {
    pub fn is_match(&self, document: &Value) -> bool {
        let matches_regex = |field: &FieldPath, regex: &Regex| {
            field
                .resolve(document)
                .into_iter()
                .any(|v| v.as_str().is_some_and(|s| regex.is_match(s)))
        };

        match self {
            CompiledPredicate::Equals { field, value } => {
                field.resolve(document).into_iter().any(|v| v == value)
            }
            CompiledPredicate::Matches { field, regex } => matches_regex(field, regex),
            CompiledPredicate::NotMatches { field, regex } => !matches_regex(field, regex),
            CompiledPredicate::All(predicates) => predicates.iter().all(|p| p.is_match(document)),
            CompiledPredicate::Any(predicates) => predicates.iter().any(|p| p.is_match(document)),
        }
    }
}

///
/// Selects records whose `id_field` holds one of `ids` (sorted) and which
/// satisfy the optional `predicate`.
///
#[derive(Debug, Clone, Copy)]
pub struct MatchFilter<'a> {
    pub id_field: &'a FieldPath,
    pub ids: &'a [u64],
    pub predicate: Option<&'a Predicate>,
}

///
/// Read-only query capability of the variant datastore.
///
/// Implementations must be shareable across threads: batches of one
/// attribution category may be queried concurrently.
///
pub trait QueryableStore: Sync {
    ///
    /// Return the `projection` of every record in `collection` matching `filter`.
    ///
    /// One value is returned per matching record. When the projection crosses
    /// an array field the value is an array of everything it reaches.
    ///
    fn query(
        &self,
        collection: &str,
        filter: &MatchFilter<'_>,
        projection: &FieldPath,
    ) -> Result<Vec<Value>, StoreError>;

    ///
    /// Get `collection` ready to be queried on `id_field`.
    ///
    /// Called once per (collection, id field) before any batch is issued, and
    /// never counted against a query timeout. Stores that load or index lazily
    /// do that work here.
    ///
    fn prepare(&self, _collection: &str, _id_field: &FieldPath) -> Result<(), StoreError> {
        Ok(())
    }
}
