//! Remote collection source trait

use crate::core::error::{FetchError, MutationError};
use crate::core::record::{Fields, Patch, Record};
use async_trait::async_trait;

/// Backend of record for one entity collection
///
/// Implementations never retry internally; a failed call is reported once
/// and the caller decides what to do. The list controller only touches its
/// local collection after one of these methods returned `Ok`.
#[async_trait]
pub trait RemoteCollectionSource: Send + Sync {
    /// Entity name used in logs and errors (e.g. "applicant")
    fn entity(&self) -> &str;

    /// Fetch the whole collection
    async fn fetch_all(&self) -> Result<Vec<Record>, FetchError>;

    /// Fetch a single record by identifier
    async fn fetch_one(&self, id: &str) -> Result<Record, FetchError>;

    /// Apply a partial update and return the stored record
    ///
    /// Covers status changes, attaching feedback and full-record edits.
    async fn apply_patch(&self, id: &str, patch: &Patch) -> Result<Record, MutationError>;

    /// Delete a record
    async fn delete(&self, id: &str) -> Result<(), MutationError>;

    /// Create a record; the backend assigns the identifier
    async fn create(&self, fields: Fields) -> Result<Record, MutationError>;
}
