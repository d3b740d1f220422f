//! # HRMS admin client core
//!
//! List screens of a university HR admin client: applicants, vacancies,
//! vacancy requests and employees fetched from a REST backend, shown as
//! filtered lists and mutated through confirmed requests.
//!
//! ## Features
//!
//! - **List view-model**: canonical collection, conjunctive filters
//!   (status, search, foreign key), optional sort and paging
//! - **Remote sources**: REST (`reqwest`) and in-memory implementations of
//!   one async trait
//! - **Confirmed mutations**: local state changes only after the backend
//!   answered, with per-record in-flight tracking and modal gates
//! - **Events**: broadcast notifications for re-rendering
//! - **Configuration**: entities, paths, statuses and field formats in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hrms::prelude::*;
//! use std::sync::Arc;
//!
//! let config = ClientConfig::from_yaml_file("hrms.yaml")?;
//! SessionContext::global().init(token);
//!
//! let source = RestCollectionSource::new(&config, "applicant", SessionContext::global().clone())?;
//! let applicants = ListController::new(config.entity("applicant")?.clone(), Arc::new(source))?;
//!
//! applicants.refresh().await?;
//! applicants.set_filter(FilterKind::Status, "shortlisted");
//! applicants.update_status("app1", "interviewed").await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod storage;
pub mod telemetry;
pub mod view;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ActionKind, ActionModal, ApplicantStatus, ConfigError, DEFAULT_STATUS, ErrorReport,
        Experience, ExperienceEntry, FetchError, FieldFormat, Fields, HrmsError, HrmsResult,
        ListEvent, ListEventBus, ModalOutcome, MutationError, NotFoundError, Page, PageRequest,
        Patch, Record, RemoteCollectionSource, RequestStatus, SessionContext, SessionError,
        SortDirection, SortSpec, ValidationError,
    };

    // === View ===
    pub use crate::view::{
        FilterKind, ListController, ListViewModel, LoadOutcome, MutationOutcome, ProcessingSet,
        ViewSchema,
    };

    // === Entities ===
    pub use crate::entities::{
        Applicant, Employee, PersonRef, Projection, Vacancy, VacancyDraft, VacancyRef,
        VacancyRequest,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::{Fault, InMemoryCollectionSource};
    #[cfg(feature = "rest")]
    pub use crate::storage::RestCollectionSource;

    // === Config ===
    pub use crate::config::{ClientConfig, EntityConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};
}
