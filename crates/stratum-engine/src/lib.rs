//! Stratum Engine -- the frame clock, configuration, and logging setup
//! around [`stratum_scene`].
//!
//! The scene crate knows nothing about time or process setup; this crate
//! supplies the fixed-timestep [`FrameLoop`](frame::FrameLoop) that advances
//! a [`World`](stratum_scene::world::World), routes queued key events into
//! it, and reports per-frame diagnostics.
//!
//! # Quick Start
//!
//! ```
//! use stratum_engine::prelude::*;
//!
//! let config = EngineConfig { fixed_dt: 1.0 / 30.0, headless: true, ..Default::default() };
//! let mut frames = FrameLoop::new(World::new(), config).unwrap();
//! frames.run_frames(30);
//! assert!((frames.sim_time() - 1.0).abs() < 1e-9);
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod frame;
pub mod logging;

/// Re-export the scene crate for convenience.
pub use stratum_scene;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while configuring or driving the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The config file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config document is not valid JSON for [`EngineConfig`](config::EngineConfig).
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// `fixed_dt` must be positive and finite.
    #[error("fixed_dt must be positive and finite, got {value}")]
    InvalidTimestep { value: f64 },

    /// Any other rejected configuration value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A scene operation failed.
    #[error(transparent)]
    Scene(#[from] stratum_scene::SceneError),

    /// The tracing subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use stratum_scene::prelude::*;

    pub use crate::config::EngineConfig;
    pub use crate::frame::{FrameDiagnostics, FrameLoop};
    pub use crate::logging::init_tracing;
    pub use crate::EngineError;
}
