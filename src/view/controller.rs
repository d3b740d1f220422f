//! Mutation flow for one list screen
//!
//! [`ListController`] ties a [`RemoteCollectionSource`] to a
//! [`ListViewModel`]. Every mutation follows the same path:
//!
//! ```text
//! control ─▶ in-flight check ─▶ modal (optional) ─▶ source ─▶ ok? ─▶ view-model ─▶ event
//!                 │                    │                         │
//!                 └─ Busy              └─ Cancelled              └─ error: reported, nothing applied
//! ```
//!
//! Local state is only touched after the backend confirmed. Results that
//! arrive after [`detach`](ListController::detach) are dropped.

use crate::config::EntityConfig;
use crate::core::error::{
    ConfigError, FieldValidationError, HrmsError, MutationError, NotFoundError, ValidationError,
};
use crate::core::events::{ListEvent, ListEventBus};
use crate::core::field::FieldFormat;
use crate::core::modal::{ActionKind, ActionModal, ModalOutcome};
use crate::core::query::SortSpec;
use crate::core::record::{Fields, Patch, Record};
use crate::core::service::RemoteCollectionSource;
use crate::view::filters::FilterKind;
use crate::view::model::ListViewModel;
use crate::view::processing::{ProcessingGuard, ProcessingSet};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Field that receives the text collected by a feedback modal
pub const FEEDBACK_FIELD: &str = "feedback";

/// How a mutation request ended, when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backend confirmed and the local list was updated
    Applied,
    /// The modal was dismissed; nothing was sent
    Cancelled,
    /// A request for this record is already in flight; nothing was sent
    Busy,
    /// The controller was detached before the response arrived
    Discarded,
}

/// How a refresh ended, when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The collection was replaced; carries the record count
    Loaded(usize),
    /// The controller was detached before the response arrived
    Discarded,
}

/// One list screen: source, view-model, in-flight set and events
pub struct ListController {
    config: EntityConfig,
    formats: Vec<(String, FieldFormat)>,
    source: Arc<dyn RemoteCollectionSource>,
    model: RwLock<ListViewModel>,
    processing: ProcessingSet,
    events: ListEventBus,
    attached: AtomicBool,
}

impl ListController {
    /// Create a controller with an empty list
    pub fn new(
        config: EntityConfig,
        source: Arc<dyn RemoteCollectionSource>,
    ) -> Result<Self, ConfigError> {
        let formats = config.field_formats()?;
        let model = ListViewModel::new(config.schema());
        Ok(Self {
            config,
            formats,
            source,
            model: RwLock::new(model),
            processing: ProcessingSet::new(),
            events: ListEventBus::default(),
            attached: AtomicBool::new(true),
        })
    }

    /// Publish into an existing bus instead of a private one
    pub fn with_events(mut self, events: ListEventBus) -> Self {
        self.events = events;
        self
    }

    pub fn entity(&self) -> &str {
        &self.config.singular
    }

    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    pub fn events(&self) -> &ListEventBus {
        &self.events
    }

    /// Read access to the view-model
    ///
    /// Do not hold the guard across an `.await`.
    pub fn model(&self) -> RwLockReadGuard<'_, ListViewModel> {
        self.model.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn model_mut(&self) -> RwLockWriteGuard<'_, ListViewModel> {
        self.model.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Owned copy of the derived view
    pub fn view(&self) -> Vec<Record> {
        self.model().view().into_iter().cloned().collect()
    }

    /// Whether the controls for `id` should be disabled
    pub fn is_processing(&self, id: &str) -> bool {
        self.processing.is_processing(id)
    }

    pub fn processing(&self) -> &ProcessingSet {
        &self.processing
    }

    /// Stop applying results; call when the screen goes away
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
        tracing::debug!(entity = %self.entity(), "list controller detached");
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetch the collection and replace the local list
    ///
    /// On failure the local list keeps its previous content.
    pub async fn refresh(&self) -> Result<LoadOutcome, HrmsError> {
        let result = self.source.fetch_all().await;
        if !self.is_attached() {
            tracing::warn!(entity = %self.entity(), "discarding fetch result after detach");
            return Ok(LoadOutcome::Discarded);
        }

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                let err = HrmsError::from(e);
                tracing::error!(entity = %self.entity(), error = %err, "failed to load list");
                self.report(None, &err);
                return Err(err);
            }
        };

        let count = {
            let mut model = self.model_mut();
            model.load(records);
            model.len()
        };
        tracing::info!(entity = %self.entity(), count, "list loaded");
        self.events.publish(ListEvent::Loaded {
            entity: self.entity().to_string(),
            count,
        });
        Ok(LoadOutcome::Loaded(count))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Change a record's status
    pub async fn update_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<MutationOutcome, HrmsError> {
        self.check_status(status)?;
        let Some(guard) = self.processing.begin(id) else {
            return Ok(self.busy(id));
        };
        let known = self.model().contains(id);
        if !known {
            return Err(self.stale(self.not_found(id)).await);
        }
        let patch = Patch::new().set(self.config.status_field.clone(), status);
        self.dispatch_patch(id, patch, guard).await
    }

    /// Change a record's status and attach feedback collected by `modal`
    pub async fn update_status_with_feedback(
        &self,
        id: &str,
        status: &str,
        modal: &dyn ActionModal,
    ) -> Result<MutationOutcome, HrmsError> {
        self.check_status(status)?;
        let Some(guard) = self.processing.begin(id) else {
            return Ok(self.busy(id));
        };
        let target = self.model().get(id).cloned();
        let Some(target) = target else {
            return Err(self.stale(self.not_found(id)).await);
        };

        let action = ActionKind::Feedback {
            status: status.to_string(),
        };
        let feedback = match modal.request(&target, &action).await {
            ModalOutcome::Confirmed(text) => text,
            ModalOutcome::Cancelled => {
                tracing::debug!(entity = %self.entity(), id, "feedback modal cancelled");
                return Ok(MutationOutcome::Cancelled);
            }
        };
        if !self.is_attached() {
            return Ok(MutationOutcome::Discarded);
        }

        let patch = Patch::new()
            .set(self.config.status_field.clone(), status)
            .set(FEEDBACK_FIELD, feedback);
        self.dispatch_patch(id, patch, guard).await
    }

    /// Apply an arbitrary edit to a record
    pub async fn edit(&self, id: &str, patch: Patch) -> Result<MutationOutcome, HrmsError> {
        if patch.is_empty() {
            return Err(ValidationError::FieldError {
                field: "patch".to_string(),
                message: "nothing to update".to_string(),
            }
            .into());
        }
        self.check_fields(patch.iter())?;
        let Some(guard) = self.processing.begin(id) else {
            return Ok(self.busy(id));
        };
        let shape = self.model().get(id).map(|record| record.check_patch(&patch));
        match shape {
            None => return Err(self.stale(self.not_found(id)).await),
            Some(Err(invalid)) => {
                let err = HrmsError::from(invalid);
                self.report(Some(id), &err);
                return Err(err);
            }
            Some(Ok(())) => {}
        }
        self.dispatch_patch(id, patch, guard).await
    }

    /// Delete a record after `modal` confirmed
    pub async fn delete(
        &self,
        id: &str,
        modal: &dyn ActionModal,
    ) -> Result<MutationOutcome, HrmsError> {
        let Some(_guard) = self.processing.begin(id) else {
            return Ok(self.busy(id));
        };
        let target = self.model().get(id).cloned();
        let Some(target) = target else {
            return Err(self.stale(self.not_found(id)).await);
        };

        if modal
            .request(&target, &ActionKind::ConfirmDelete)
            .await
            .is_cancelled()
        {
            tracing::debug!(entity = %self.entity(), id, "delete cancelled");
            return Ok(MutationOutcome::Cancelled);
        }
        if !self.is_attached() {
            return Ok(MutationOutcome::Discarded);
        }

        let result = self.source.delete(id).await;
        if !self.is_attached() {
            tracing::warn!(entity = %self.entity(), id, "discarding delete result after detach");
            return Ok(MutationOutcome::Discarded);
        }
        if let Err(e) = result {
            let gone = matches!(e, MutationError::NotFound { .. });
            let err = HrmsError::from(e);
            tracing::error!(entity = %self.entity(), id, error = %err, "delete failed");
            self.report(Some(id), &err);
            if gone {
                self.reload("record deleted on the backend").await;
            }
            return Err(err);
        }

        let removed = self.model_mut().remove(id);
        match removed {
            Ok(_) => {
                tracing::debug!(entity = %self.entity(), id, "record removed");
                self.events.publish(ListEvent::Removed {
                    entity: self.entity().to_string(),
                    id: id.to_string(),
                });
                Ok(MutationOutcome::Applied)
            }
            Err(not_found) => Err(self.stale(not_found).await),
        }
    }

    /// Create a record, then reload the list
    ///
    /// The list is only ever changed by loads, patches and removals, so the
    /// new record shows up through the refresh.
    pub async fn create(&self, fields: Fields) -> Result<Record, HrmsError> {
        let mut fields = fields;
        if let Some(default) = self.config.default_status() {
            let status = fields
                .entry(self.config.status_field.clone())
                .or_insert_with(|| Value::String(default.to_string()));
            if status.is_null() {
                *status = Value::String(default.to_string());
            }
        }
        self.check_fields(fields.iter())?;

        let created = match self.source.create(fields).await {
            Ok(record) => record,
            Err(e) => {
                let err = HrmsError::from(e);
                tracing::error!(entity = %self.entity(), error = %err, "create failed");
                self.report(None, &err);
                return Err(err);
            }
        };
        tracing::debug!(entity = %self.entity(), id = %created.id(), "record created");

        if self.is_attached() {
            self.reload("record created").await;
        }
        Ok(created)
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn set_filter(&self, kind: FilterKind, value: &str) {
        let visible = {
            let mut model = self.model_mut();
            model.set_filter(kind, value);
            model.visible_len()
        };
        self.filters_changed(visible);
    }

    pub fn set_filter_named(&self, name: &str, value: &str) -> Result<(), ConfigError> {
        let kind = name.parse::<FilterKind>()?;
        self.set_filter(kind, value);
        Ok(())
    }

    pub fn set_sort(&self, sort: Option<SortSpec>) {
        let visible = {
            let mut model = self.model_mut();
            model.set_sort(sort);
            model.visible_len()
        };
        self.filters_changed(visible);
    }

    pub fn clear_filters(&self) {
        let visible = {
            let mut model = self.model_mut();
            model.clear_filters();
            model.visible_len()
        };
        self.filters_changed(visible);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn dispatch_patch(
        &self,
        id: &str,
        patch: Patch,
        _guard: ProcessingGuard,
    ) -> Result<MutationOutcome, HrmsError> {
        tracing::debug!(entity = %self.entity(), id, fields = patch.len(), "sending patch");
        let result = self.source.apply_patch(id, &patch).await;
        if !self.is_attached() {
            tracing::warn!(entity = %self.entity(), id, "discarding patch result after detach");
            return Ok(MutationOutcome::Discarded);
        }
        if let Err(e) = result {
            let gone = matches!(e, MutationError::NotFound { .. });
            let err = HrmsError::from(e);
            tracing::error!(entity = %self.entity(), id, error = %err, "patch failed");
            self.report(Some(id), &err);
            if gone {
                self.reload("record deleted on the backend").await;
            }
            return Err(err);
        }

        let applied = self.model_mut().update_field(id, &patch);
        match applied {
            Ok(()) => {
                self.events.publish(ListEvent::Updated {
                    entity: self.entity().to_string(),
                    id: id.to_string(),
                    patch: patch.to_value(),
                });
                Ok(MutationOutcome::Applied)
            }
            Err(not_found) => Err(self.stale(not_found).await),
        }
    }

    /// The local list no longer matches the backend: report and reload
    async fn stale(&self, not_found: NotFoundError) -> HrmsError {
        tracing::warn!(
            entity = %self.entity(),
            id = %not_found.id,
            "record missing from local list, reloading"
        );
        let id = not_found.id.clone();
        let err = HrmsError::NotFound(not_found);
        self.report(Some(&id), &err);
        self.reload("stale local list").await;
        err
    }

    /// Refresh whose failure is already reported through the event bus
    async fn reload(&self, reason: &str) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(entity = %self.entity(), reason, error = %e, "reload failed");
        }
    }

    fn busy(&self, id: &str) -> MutationOutcome {
        tracing::debug!(entity = %self.entity(), id, "request already in flight");
        MutationOutcome::Busy
    }

    fn not_found(&self, id: &str) -> NotFoundError {
        NotFoundError {
            entity: self.entity().to_string(),
            id: id.to_string(),
        }
    }

    fn check_status(&self, status: &str) -> Result<(), HrmsError> {
        if self.config.allows_status(status) {
            return Ok(());
        }
        let err = HrmsError::from(ValidationError::InvalidStatus {
            entity: self.entity().to_string(),
            value: status.to_string(),
        });
        self.report(None, &err);
        Err(err)
    }

    fn check_fields<'a>(
        &self,
        fields: impl Iterator<Item = (&'a String, &'a Value)>,
    ) -> Result<(), HrmsError> {
        let mut errors = Vec::new();
        for (field, value) in fields {
            if *field == self.config.status_field {
                match value.as_str() {
                    Some(status) if self.config.allows_status(status) => {}
                    _ => errors.push(FieldValidationError {
                        field: field.clone(),
                        message: format!("not a valid {} status", self.entity()),
                    }),
                }
                continue;
            }
            if let Some((_, format)) = self.formats.iter().find(|(f, _)| f == field) {
                if !format.validate(value) {
                    errors.push(FieldValidationError {
                        field: field.clone(),
                        message: format.describe().to_string(),
                    });
                }
            }
        }

        if errors.is_empty() {
            return Ok(());
        }
        let err = HrmsError::from(ValidationError::FieldErrors(errors));
        self.report(None, &err);
        Err(err)
    }

    fn report(&self, id: Option<&str>, err: &HrmsError) {
        self.events.publish(ListEvent::Failed {
            entity: self.entity().to_string(),
            id: id.map(str::to_string),
            code: err.error_code().to_string(),
            message: err.user_message(),
        });
    }

    fn filters_changed(&self, visible: usize) {
        tracing::debug!(entity = %self.entity(), visible, "filters changed");
        self.events.publish(ListEvent::FiltersChanged {
            entity: self.entity().to_string(),
            visible,
        });
    }
}
