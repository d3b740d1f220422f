//! Typed views over records
//!
//! Lists work on untyped [`Record`]s. Detail screens and forms read them
//! into the structs below, which resolve the shapes the backend is loose
//! about: references that may or may not be populated, missing statuses
//! and free-form experience.

pub mod applicant;
pub mod employee;
pub mod vacancy;
pub mod vacancy_request;

pub use applicant::Applicant;
pub use employee::Employee;
pub use vacancy::{Vacancy, VacancyDraft, VacancyRef};
pub use vacancy_request::{PersonRef, VacancyRequest};

use crate::core::error::ValidationError;
use crate::core::record::Record;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// A struct that can be read from a [`Record`]
pub trait Projection: DeserializeOwned {
    /// Entity name used in errors (e.g. "applicant")
    const ENTITY: &'static str;

    fn from_record(record: &Record) -> Result<Self, ValidationError> {
        serde_json::from_value(record.to_value()).map_err(|e| ValidationError::InvalidRecord {
            entity: Self::ENTITY.to_string(),
            message: format!("{}: {}", record.id(), e),
        })
    }

    /// Read every record, stopping at the first one that does not fit
    fn from_records<'a>(
        records: impl IntoIterator<Item = &'a Record>,
    ) -> Result<Vec<Self>, ValidationError> {
        records.into_iter().map(Self::from_record).collect()
    }
}

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
