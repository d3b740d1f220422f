//! Core types shared by every list screen: records, errors, the source and
//! modal traits, session, events and status enumerations.

pub mod error;
pub mod events;
pub mod experience;
pub mod field;
pub mod modal;
pub mod pluralize;
pub mod query;
pub mod record;
pub mod service;
pub mod session;
pub mod status;

pub use error::{
    ConfigError, ErrorReport, FetchError, HrmsError, HrmsResult, MutationError, NotFoundError,
    SessionError, ValidationError,
};
pub use events::{EventEnvelope, ListEvent, ListEventBus};
pub use experience::{Experience, ExperienceEntry};
pub use field::FieldFormat;
pub use modal::{ActionKind, ActionModal, ModalOutcome};
pub use pluralize::Pluralizer;
pub use query::{Page, PageRequest, PaginationMeta, SortDirection, SortSpec};
pub use record::{Change, Fields, ID_FIELD, Patch, Record};
pub use service::RemoteCollectionSource;
pub use session::SessionContext;
pub use status::{ApplicantStatus, DEFAULT_STATUS, RequestStatus};
