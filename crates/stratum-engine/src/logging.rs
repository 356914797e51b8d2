//! `tracing` subscriber setup.
//!
//! Library code only emits events; binaries and demos call
//! [`init_tracing`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::EngineError;

/// Install a `fmt` subscriber. `RUST_LOG` wins over `default_filter` when set.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| EngineError::Logging(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| EngineError::Logging(e.to_string()))
}
