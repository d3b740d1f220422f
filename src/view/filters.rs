//! Filter predicates for the derived view
//!
//! Each predicate is a pure function of one record. Active predicates are
//! combined by conjunction, so the order in which they are installed never
//! changes the result.

use crate::core::error::ConfigError;
use crate::core::field::{contains_text, reference_id};
use crate::core::record::Record;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Which fields each predicate looks at, per entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSchema {
    /// Entity name for logs and errors
    pub entity: String,
    /// Field compared by the status predicate
    pub status_field: String,
    /// Status assumed when a record lacks the status field
    pub default_status: String,
    /// Fields matched by the search predicate
    pub search_fields: Vec<String>,
    /// Reference field compared by the foreign-key predicate
    pub foreign_key: Option<String>,
}

impl ViewSchema {
    /// Effective status of a record, defaulted when absent
    pub fn status_of<'a>(&'a self, record: &'a Record) -> &'a str {
        record
            .get_str(&self.status_field)
            .unwrap_or(&self.default_status)
    }
}

/// Name of a predicate slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKind {
    Status,
    Search,
    ForeignKey,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Status => "status",
            FilterKind::Search => "search",
            FilterKind::ForeignKey => "foreignKey",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(FilterKind::Status),
            "search" => Ok(FilterKind::Search),
            "foreignKey" | "foreign_key" => Ok(FilterKind::ForeignKey),
            other => Err(ConfigError::UnknownFilter {
                name: other.to_string(),
            }),
        }
    }
}

/// A configured predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact status equality; missing status counts as `default`
    Status {
        field: String,
        value: String,
        default: String,
    },
    /// Case-insensitive substring match on any of `fields`
    Search { fields: Vec<String>, term: String },
    /// Exact equality with a reference id
    ForeignKey { field: String, id: String },
}

impl Predicate {
    /// Build the predicate for `kind` from a raw configuration value
    ///
    /// Returns `None` when the value clears the slot: empty for every kind,
    /// and also `all` for status and foreign key. A foreign-key filter on an
    /// entity without a reference field is ignored.
    pub fn build(kind: FilterKind, raw: &str, schema: &ViewSchema) -> Option<Predicate> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        match kind {
            FilterKind::Status => {
                if value.eq_ignore_ascii_case("all") {
                    return None;
                }
                Some(Predicate::Status {
                    field: schema.status_field.clone(),
                    value: value.to_string(),
                    default: schema.default_status.clone(),
                })
            }
            FilterKind::Search => Some(Predicate::Search {
                fields: schema.search_fields.clone(),
                term: value.to_lowercase(),
            }),
            FilterKind::ForeignKey => {
                if value.eq_ignore_ascii_case("all") {
                    return None;
                }
                let Some(field) = schema.foreign_key.clone() else {
                    tracing::warn!(
                        entity = %schema.entity,
                        "foreign-key filter ignored: no reference field configured"
                    );
                    return None;
                };
                Some(Predicate::ForeignKey {
                    field,
                    id: value.to_string(),
                })
            }
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Predicate::Status { .. } => FilterKind::Status,
            Predicate::Search { .. } => FilterKind::Search,
            Predicate::ForeignKey { .. } => FilterKind::ForeignKey,
        }
    }

    /// The configuration value, as it would be shown in a filter control
    pub fn value(&self) -> &str {
        match self {
            Predicate::Status { value, .. } => value,
            Predicate::Search { term, .. } => term,
            Predicate::ForeignKey { id, .. } => id,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Status {
                field,
                value,
                default,
            } => {
                let status = match record.get(field) {
                    Some(Value::String(s)) => s.as_str(),
                    Some(Value::Null) | None => default.as_str(),
                    Some(_) => return false,
                };
                status == value
            }
            Predicate::Search { fields, term } => fields
                .iter()
                .filter_map(|field| record.get(field))
                .any(|v| contains_text(v, term)),
            Predicate::ForeignKey { field, id } => record
                .get(field)
                .and_then(reference_id)
                .is_some_and(|found| found == id),
        }
    }
}
