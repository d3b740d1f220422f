//! Log output setup
//!
//! The library only emits `tracing` events. Binaries and test harnesses
//! call [`init`] once to print them; the level comes from `RUST_LOG` and
//! defaults to `info`.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Install a formatting subscriber for the whole process
///
/// Fails if a global subscriber is already set.
pub fn init() -> anyhow::Result<()> {
    init_with(DEFAULT_FILTER)
}

/// Like [`init`] with an explicit fallback filter, e.g. `hrms=debug`
pub fn init_with(fallback: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}
