//! In-memory implementation of RemoteCollectionSource for testing and development

use crate::core::error::{FetchError, MutationError};
use crate::core::record::{Fields, Patch, Record};
use crate::core::service::RemoteCollectionSource;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// A failure the next call should report instead of doing its work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// No response at all
    Transport(String),
    /// Non-success HTTP status with the backend's message
    Status(u16, String),
    /// Credentials refused
    Unauthorized,
    /// Any other failure, reported as-is
    Other(String),
}

impl Fault {
    fn into_fetch(self, entity: &str) -> FetchError {
        let entity = entity.to_string();
        match self {
            Fault::Transport(message) => FetchError::Transport { entity, message },
            Fault::Status(status, message) => FetchError::Status {
                entity,
                status,
                message,
            },
            Fault::Unauthorized => FetchError::Unauthorized { entity },
            Fault::Other(message) => FetchError::Other { entity, message },
        }
    }

    fn into_mutation(self, entity: &str, operation: &str) -> MutationError {
        MutationError::from_fetch(self.into_fetch(entity), operation)
    }
}

#[derive(Debug, Default)]
struct Faults {
    fetch: Option<Fault>,
    mutation: Option<Fault>,
}

/// In-memory collection source
///
/// Keeps records in insertion order, assigns UUIDs on create and can be told
/// to fail or to answer slowly. Clones share the same store.
#[derive(Clone)]
pub struct InMemoryCollectionSource {
    entity: String,
    records: Arc<RwLock<IndexMap<String, Record>>>,
    faults: Arc<Mutex<Faults>>,
    latency: Option<Duration>,
    mutations: Arc<AtomicUsize>,
    fetches: Arc<AtomicUsize>,
}

impl InMemoryCollectionSource {
    /// Create an empty source for `entity`
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            records: Arc::new(RwLock::new(IndexMap::new())),
            faults: Arc::new(Mutex::new(Faults::default())),
            latency: None,
            mutations: Arc::new(AtomicUsize::new(0)),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Seed the store
    pub fn with_records(self, records: impl IntoIterator<Item = Record>) -> Self {
        {
            let mut store = self.write();
            for record in records {
                store.insert(record.id().to_string(), record);
            }
        }
        self
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next fetch fail with `fault`
    pub fn fail_next_fetch(&self, fault: Fault) {
        self.lock_faults().fetch = Some(fault);
    }

    /// Make the next mutation fail with `fault`
    pub fn fail_next_mutation(&self, fault: Fault) {
        self.lock_faults().mutation = Some(fault);
    }

    /// Insert or replace a record without counting it as a mutation,
    /// the way another client would
    pub fn put(&self, record: Record) {
        self.write().insert(record.id().to_string(), record);
    }

    /// Remove a record without counting it as a mutation
    pub fn evict(&self, id: &str) -> Option<Record> {
        self.write().shift_remove(id)
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        self.read().get(id).cloned()
    }

    /// Stored records in insertion order
    pub fn snapshot(&self) -> Vec<Record> {
        self.read().values().cloned().collect()
    }

    /// Number of patch, delete and create calls received
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Number of fetch calls received
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, IndexMap<String, Record>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, IndexMap<String, Record>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    async fn begin_fetch(&self) -> Result<(), FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        let fault = self.lock_faults().fetch.take();
        match fault {
            Some(fault) => Err(fault.into_fetch(&self.entity)),
            None => Ok(()),
        }
    }

    async fn begin_mutation(&self, operation: &str) -> Result<(), MutationError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        let fault = self.lock_faults().mutation.take();
        match fault {
            Some(fault) => Err(fault.into_mutation(&self.entity, operation)),
            None => Ok(()),
        }
    }

    fn missing(&self, id: &str) -> MutationError {
        MutationError::NotFound {
            entity: self.entity.clone(),
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl RemoteCollectionSource for InMemoryCollectionSource {
    fn entity(&self) -> &str {
        &self.entity
    }

    async fn fetch_all(&self) -> Result<Vec<Record>, FetchError> {
        self.begin_fetch().await?;
        Ok(self.snapshot())
    }

    async fn fetch_one(&self, id: &str) -> Result<Record, FetchError> {
        self.begin_fetch().await?;
        self.get(id).ok_or_else(|| FetchError::NotFound {
            entity: self.entity.clone(),
            id: id.to_string(),
        })
    }

    async fn apply_patch(&self, id: &str, patch: &Patch) -> Result<Record, MutationError> {
        self.begin_mutation("update").await?;
        let mut store = self.write();
        let record = store.get_mut(id).ok_or_else(|| self.missing(id))?;
        record.apply_patch(patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), MutationError> {
        self.begin_mutation("delete").await?;
        self.write()
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| self.missing(id))
    }

    async fn create(&self, fields: Fields) -> Result<Record, MutationError> {
        self.begin_mutation("create").await?;
        let record = Record::new(Uuid::new_v4().to_string(), fields);
        self.write()
            .insert(record.id().to_string(), record.clone());
        Ok(record)
    }
}
