//! Remote collection sources for the different backends

#[cfg(feature = "in-memory")]
pub mod in_memory;
#[cfg(feature = "rest")]
pub mod rest;

#[cfg(feature = "in-memory")]
pub use in_memory::{Fault, InMemoryCollectionSource};
#[cfg(feature = "rest")]
pub use rest::RestCollectionSource;
