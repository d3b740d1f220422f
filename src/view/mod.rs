//! List screens: filters, view-model, in-flight tracking and the controller
//! that drives mutations through a remote source.

pub mod controller;
pub mod filters;
pub mod model;
pub mod processing;

pub use controller::{FEEDBACK_FIELD, ListController, LoadOutcome, MutationOutcome};
pub use filters::{FilterKind, Predicate, ViewSchema};
pub use model::ListViewModel;
pub use processing::{ProcessingGuard, ProcessingSet};
