//! Typed error handling for the HRMS client core
//!
//! Every failure the core can produce is one of a small set of categories,
//! so presentation code can match on them instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`FetchError`]: loading a collection or a single record failed
//! - [`MutationError`]: a patch, create or delete request failed
//! - [`NotFoundError`]: the view-model was asked to mutate an id it does not hold
//! - [`ConfigError`]: configuration parsing and lookup
//! - [`SessionError`]: no bearer token available
//! - [`ValidationError`]: a patch or draft was rejected before dispatch
//!
//! # Example
//!
//! ```rust,ignore
//! match controller.update_status("app1", "rejected").await {
//!     Ok(outcome) => tracing::debug!(?outcome, "status change finished"),
//!     Err(HrmsError::NotFound(e)) => show_banner(&format!("{e}, list refreshed")),
//!     Err(e) => show_banner(&e.user_message()),
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// The main error type for the HRMS client core
#[derive(Debug, Error)]
pub enum HrmsError {
    /// Loading data from the backend failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A mutation request failed; local state was not touched
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// The local view is stale relative to the backend
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session errors
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Client-side validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl HrmsError {
    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            HrmsError::Fetch(e) => e.error_code(),
            HrmsError::Mutation(e) => e.error_code(),
            HrmsError::NotFound(_) => "RECORD_NOT_FOUND",
            HrmsError::Config(_) => "CONFIG_ERROR",
            HrmsError::Session(_) => "SESSION_NOT_INITIALIZED",
            HrmsError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Message suitable for showing to the person using the admin screens
    pub fn user_message(&self) -> String {
        match self {
            HrmsError::Fetch(FetchError::Unauthorized { .. })
            | HrmsError::Mutation(MutationError::Unauthorized { .. })
            | HrmsError::Session(_) => "Your session has expired. Please sign in again.".to_string(),
            HrmsError::Fetch(e) => format!("Could not load data: {}", e),
            HrmsError::Mutation(e) => format!("The change was not saved: {}", e),
            HrmsError::NotFound(_) => {
                "This record changed on the server. The list has been refreshed.".to_string()
            }
            HrmsError::Config(e) => format!("Configuration problem: {}", e),
            HrmsError::Validation(e) => e.to_string(),
        }
    }

    /// Whether the presentation should offer a retry control
    ///
    /// Nothing is retried automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            HrmsError::Fetch(e) => e.is_retryable(),
            HrmsError::Mutation(e) => e.is_retryable(),
            HrmsError::NotFound(_) => true,
            _ => false,
        }
    }

    /// Convert to a serializable summary
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.error_code().to_string(),
            message: self.user_message(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            HrmsError::NotFound(NotFoundError { entity, id }) => Some(serde_json::json!({
                "entity": entity,
                "id": id,
            })),
            HrmsError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

/// Serializable error summary for the presentation layer
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors raised while loading records
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced an HTTP response
    #[error("failed to reach the {entity} endpoint: {message}")]
    Transport { entity: String, message: String },

    /// The backend answered with a non-success status
    #[error("{entity} request returned HTTP {status}: {message}")]
    Status {
        entity: String,
        status: u16,
        message: String,
    },

    /// The backend refused the credentials
    #[error("not authorized to read {entity}")]
    Unauthorized { entity: String },

    /// A single record was requested but does not exist
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    /// The envelope carried `success: false`
    #[error("backend rejected the {entity} request: {message}")]
    Rejected { entity: String, message: String },

    /// The body did not have the expected envelope shape
    #[error("malformed {entity} response: {message}")]
    MalformedEnvelope { entity: String, message: String },

    /// No session was available to authorize the request
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Failure injected by a test or development source
    #[error("{entity} fetch failed: {message}")]
    Other { entity: String, message: String },
}

impl FetchError {
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "FETCH_TRANSPORT_ERROR",
            FetchError::Status { .. } => "FETCH_HTTP_ERROR",
            FetchError::Unauthorized { .. } => "FETCH_UNAUTHORIZED",
            FetchError::NotFound { .. } => "FETCH_NOT_FOUND",
            FetchError::Rejected { .. } => "FETCH_REJECTED",
            FetchError::MalformedEnvelope { .. } => "FETCH_MALFORMED_RESPONSE",
            FetchError::Session(_) => "SESSION_NOT_INITIALIZED",
            FetchError::Other { .. } => "FETCH_FAILED",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } | FetchError::Other { .. } => true,
            FetchError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

// =============================================================================
// Mutation Errors
// =============================================================================

/// Errors raised while creating, patching or deleting a record
#[derive(Debug, Error)]
pub enum MutationError {
    /// The request never produced an HTTP response
    #[error("failed to {operation} {entity}: {message}")]
    Transport {
        entity: String,
        operation: String,
        message: String,
    },

    /// The backend answered with a non-success status
    #[error("{operation} {entity} returned HTTP {status}: {message}")]
    Status {
        entity: String,
        operation: String,
        status: u16,
        message: String,
    },

    /// The backend refused the credentials
    #[error("not authorized to {operation} {entity}")]
    Unauthorized { entity: String, operation: String },

    /// The backend does not know the record
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    /// The envelope carried `success: false`
    #[error("backend rejected {operation} {entity}: {message}")]
    Rejected {
        entity: String,
        operation: String,
        message: String,
    },

    /// The body did not have the expected envelope shape
    #[error("malformed {entity} response: {message}")]
    MalformedEnvelope { entity: String, message: String },

    /// No session was available to authorize the request
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Failure injected by a test or development source
    #[error("{operation} {entity} failed: {message}")]
    Other {
        entity: String,
        operation: String,
        message: String,
    },
}

impl MutationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            MutationError::Transport { .. } => "MUTATION_TRANSPORT_ERROR",
            MutationError::Status { .. } => "MUTATION_HTTP_ERROR",
            MutationError::Unauthorized { .. } => "MUTATION_UNAUTHORIZED",
            MutationError::NotFound { .. } => "MUTATION_NOT_FOUND",
            MutationError::Rejected { .. } => "MUTATION_REJECTED",
            MutationError::MalformedEnvelope { .. } => "MUTATION_MALFORMED_RESPONSE",
            MutationError::Session(_) => "SESSION_NOT_INITIALIZED",
            MutationError::Other { .. } => "MUTATION_FAILED",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            MutationError::Transport { .. } | MutationError::Other { .. } => true,
            MutationError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Re-label a fetch failure that happened while completing a mutation
    pub fn from_fetch(err: FetchError, operation: &str) -> Self {
        match err {
            FetchError::Transport { entity, message } => MutationError::Transport {
                entity,
                operation: operation.to_string(),
                message,
            },
            FetchError::Status {
                entity,
                status,
                message,
            } => MutationError::Status {
                entity,
                operation: operation.to_string(),
                status,
                message,
            },
            FetchError::Unauthorized { entity } => MutationError::Unauthorized {
                entity,
                operation: operation.to_string(),
            },
            FetchError::NotFound { entity, id } => MutationError::NotFound { entity, id },
            FetchError::Rejected { entity, message } => MutationError::Rejected {
                entity,
                operation: operation.to_string(),
                message,
            },
            FetchError::MalformedEnvelope { entity, message } => {
                MutationError::MalformedEnvelope { entity, message }
            }
            FetchError::Session(e) => MutationError::Session(e),
            FetchError::Other { entity, message } => MutationError::Other {
                entity,
                operation: operation.to_string(),
                message,
            },
        }
    }
}

// =============================================================================
// Not Found
// =============================================================================

/// The view-model does not hold a record with this identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} with id '{id}' is not in the current list")]
pub struct NotFoundError {
    pub entity: String,
    pub id: String,
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("failed to parse config{}: {message}", .file.as_deref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    Parse {
        file: Option<String>,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    Io { message: String },

    /// No entity with this name is configured
    #[error("unknown entity: {name}")]
    UnknownEntity { name: String },

    /// Filter name is not one of the supported predicates
    #[error("unknown filter '{name}' (expected status, search or foreignKey)")]
    UnknownFilter { name: String },

    /// Invalid value in configuration
    #[error("invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse {
            file: None,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Session Errors
// =============================================================================

/// Errors related to the bearer-token session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `init` was never called, or `clear` was called since
    #[error("no active session")]
    NotInitialized,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors raised before a request is dispatched
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    #[error("validation errors: {}", .0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<_>>().join(", "))]
    FieldErrors(Vec<FieldValidationError>),

    /// Status is not part of the entity's status enumeration
    #[error("'{value}' is not a valid {entity} status")]
    InvalidStatus { entity: String, value: String },

    /// Record could not be read into its typed form
    #[error("invalid {entity} record: {message}")]
    InvalidRecord { entity: String, message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

/// A specialized Result type for HRMS core operations
pub type HrmsResult<T> = Result<T, HrmsError>;
