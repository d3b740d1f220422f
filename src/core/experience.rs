//! Work experience of applicants and employees
//!
//! The backend stores experience as free text, as a list of entries, or as
//! a single entry object. It is resolved into [`Experience`] once, when a
//! record is read into its typed form, so callers switch on the variant
//! instead of probing JSON shapes.

use crate::core::record::Fields;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One position held
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(default, alias = "position", alias = "role", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, alias = "company", alias = "institution", skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(default, alias = "from", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, alias = "to", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fields not covered above (`years`, `location`, ...)
    #[serde(flatten)]
    pub extra: Fields,
}

impl ExperienceEntry {
    /// Best-effort read of an entry; never fails
    fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => ExperienceEntry {
                description: Some(text),
                ..Default::default()
            },
            Value::Object(object) => {
                let raw = Value::Object(object);
                serde_json::from_value(raw.clone()).unwrap_or_else(|_| ExperienceEntry {
                    extra: raw
                        .as_object()
                        .map(|o| o.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                        .unwrap_or_default(),
                    ..Default::default()
                })
            }
            other => ExperienceEntry {
                description: Some(other.to_string()),
                ..Default::default()
            },
        }
    }

    /// One-line summary such as `Lecturer at City College`
    pub fn summary(&self) -> String {
        match (&self.title, &self.organization) {
            (Some(title), Some(org)) => format!("{} at {}", title, org),
            (Some(title), None) => title.clone(),
            (None, Some(org)) => org.clone(),
            (None, None) => self.description.clone().unwrap_or_default(),
        }
    }
}

/// Experience in one of the three shapes the backend produces
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Experience {
    Unstructured(String),
    Entries(Vec<ExperienceEntry>),
    Single(ExperienceEntry),
}

impl Experience {
    /// Resolve a raw JSON value; `null` means no experience
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Experience::Unstructured(text)),
            Value::Array(items) => Some(Experience::Entries(
                items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .map(ExperienceEntry::from_value)
                    .collect(),
            )),
            Value::Object(_) => Some(Experience::Single(ExperienceEntry::from_value(value))),
            other => Some(Experience::Unstructured(other.to_string())),
        }
    }

    /// Structured entries, empty for free text
    pub fn entries(&self) -> Vec<&ExperienceEntry> {
        match self {
            Experience::Unstructured(_) => Vec::new(),
            Experience::Entries(entries) => entries.iter().collect(),
            Experience::Single(entry) => vec![entry],
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Experience::Unstructured(text) => text.trim().is_empty(),
            Experience::Entries(entries) => entries.is_empty(),
            Experience::Single(_) => false,
        }
    }

    /// Text for a table cell
    pub fn summary(&self) -> String {
        match self {
            Experience::Unstructured(text) => text.clone(),
            Experience::Entries(entries) => entries
                .iter()
                .map(ExperienceEntry::summary)
                .collect::<Vec<_>>()
                .join("; "),
            Experience::Single(entry) => entry.summary(),
        }
    }
}

impl<'de> Deserialize<'de> for Experience {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Experience::from_value(value).unwrap_or(Experience::Entries(Vec::new())))
    }
}
