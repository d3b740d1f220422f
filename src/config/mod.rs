//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::field::FieldFormat;
use crate::core::pluralize::Pluralizer;
use crate::core::status::DEFAULT_STATUS;
use crate::view::filters::ViewSchema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Configuration for one entity collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Singular name, also the single-record envelope key (e.g. "vacancy")
    pub singular: String,

    /// Collection envelope key; derived from `singular` when absent
    #[serde(default)]
    pub plural: Option<String>,

    /// Path below the base URL (e.g. "applicants")
    pub path: String,

    /// Field holding the record status
    #[serde(default = "default_status_field")]
    pub status_field: String,

    /// Allowed status values; empty means unconstrained
    #[serde(default)]
    pub statuses: Vec<String>,

    /// Fields matched by the free-text search (dotted paths allowed)
    #[serde(default)]
    pub search_fields: Vec<String>,

    /// Reference field used by the foreign-key filter
    #[serde(default)]
    pub foreign_key: Option<String>,

    /// Field name -> format (`email`, `phone`, `url`, `regex:<pattern>`)
    #[serde(default)]
    pub formats: IndexMap<String, String>,
}

fn default_status_field() -> String {
    "status".to_string()
}

impl EntityConfig {
    /// Minimal configuration for an entity
    pub fn new(singular: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: None,
            path: path.into(),
            status_field: default_status_field(),
            statuses: Vec::new(),
            search_fields: Vec::new(),
            foreign_key: None,
            formats: IndexMap::new(),
        }
    }

    pub fn with_statuses(mut self, statuses: &[&str]) -> Self {
        self.statuses = statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_foreign_key(mut self, field: impl Into<String>) -> Self {
        self.foreign_key = Some(field.into());
        self
    }

    pub fn with_format(mut self, field: impl Into<String>, format: impl Into<String>) -> Self {
        self.formats.insert(field.into(), format.into());
        self
    }

    /// Key of the collection envelope
    pub fn collection_key(&self) -> String {
        self.plural
            .clone()
            .unwrap_or_else(|| Pluralizer::pluralize(&self.singular))
    }

    /// Key of the single-record envelope
    pub fn record_key(&self) -> &str {
        &self.singular
    }

    /// Whether `status` belongs to this entity's enumeration
    pub fn allows_status(&self, status: &str) -> bool {
        self.statuses.is_empty() || self.statuses.iter().any(|s| s == status)
    }

    /// Status applied to records created without one
    ///
    /// Only entities with a status enumeration get a default. The same
    /// value stands in for a missing status when filtering and counting.
    pub fn default_status(&self) -> Option<&str> {
        if self.statuses.is_empty() {
            None
        } else if self.allows_status(DEFAULT_STATUS) {
            Some(DEFAULT_STATUS)
        } else {
            self.statuses.first().map(String::as_str)
        }
    }

    /// Parsed field formats
    pub fn field_formats(&self) -> Result<Vec<(String, FieldFormat)>, ConfigError> {
        self.formats
            .iter()
            .map(|(field, spec)| Ok((field.clone(), FieldFormat::parse(spec)?)))
            .collect()
    }

    /// Filter schema for a view-model over this entity
    pub fn schema(&self) -> ViewSchema {
        ViewSchema {
            entity: self.singular.clone(),
            status_field: self.status_field.clone(),
            default_status: self.default_status().unwrap_or(DEFAULT_STATUS).to_string(),
            search_fields: self.search_fields.clone(),
            foreign_key: self.foreign_key.clone(),
        }
    }
}

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST backend, e.g. `https://hr.example.edu/api`
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Entity collections exposed by the backend
    pub entities: Vec<EntityConfig>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject duplicate entities, empty paths and unparsable formats
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for entity in &self.entities {
            if !seen.insert(entity.singular.as_str()) {
                return Err(ConfigError::Invalid {
                    field: "entities".to_string(),
                    message: format!("entity '{}' defined twice", entity.singular),
                });
            }
            if entity.path.trim_matches('/').is_empty() {
                return Err(ConfigError::Invalid {
                    field: format!("entities.{}.path", entity.singular),
                    message: "must not be empty".to_string(),
                });
            }
            entity.field_formats()?;
        }
        Ok(())
    }

    /// Look up an entity by singular name
    pub fn entity(&self, name: &str) -> Result<&EntityConfig, ConfigError> {
        self.entities
            .iter()
            .find(|e| e.singular == name)
            .ok_or_else(|| ConfigError::UnknownEntity {
                name: name.to_string(),
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Replace the base URL, keeping everything else
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Entities of the university HR backend
    pub fn default_config() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: default_timeout_secs(),
            entities: vec![
                EntityConfig::new("applicant", "applicants")
                    .with_statuses(&["pending", "shortlisted", "interviewed", "selected", "rejected"])
                    .with_search_fields(&["fullName", "email", "vacancyId.position"])
                    .with_foreign_key("vacancyId")
                    .with_format("email", "email")
                    .with_format("phone", "phone"),
                EntityConfig::new("vacancy", "vacancies")
                    .with_search_fields(&["position", "department", "description"]),
                EntityConfig::new("vacancyRequest", "vacancy-requests")
                    .with_statuses(&["pending", "approved", "rejected"])
                    .with_search_fields(&["position", "department", "requestedBy.fullName"]),
                EntityConfig::new("employee", "employees")
                    .with_search_fields(&["fullName", "email", "position", "department"])
                    .with_format("email", "email")
                    .with_format("phone", "phone"),
            ],
        }
    }
}
