//! Engine configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```
//! use stratum_engine::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "fixed_dt": 0.02, "debug": true }"#).unwrap();
//! assert_eq!(config.fixed_dt, 0.02);
//! assert!(config.debug);
//! assert!(!config.headless);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use stratum_scene::world::WorldConfig;

use crate::EngineError;

/// Settings for the frame loop and the world it drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds per frame. Must be positive and finite.
    pub fixed_dt: f64,
    /// Headless mode: no renderer attached, frames run back to back.
    pub headless: bool,
    /// Outline collision shapes when a renderer is attached.
    pub debug: bool,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Upper bound on frames run by one [`FrameLoop::advance`] call, so a long
    /// stall does not snowball into an ever longer catch-up.
    ///
    /// [`FrameLoop::advance`]: crate::frame::FrameLoop::advance
    pub max_catch_up_frames: u32,
}

impl Default for EngineConfig {
    /// 60 Hz, windowed, no debug outlines, `warn` logging.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            headless: false,
            debug: false,
            log_filter: "warn".to_owned(),
            max_catch_up_frames: 5,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Reject values the frame loop cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.fixed_dt > 0.0 && self.fixed_dt.is_finite()) {
            return Err(EngineError::InvalidTimestep {
                value: self.fixed_dt,
            });
        }
        if self.max_catch_up_frames == 0 {
            return Err(EngineError::InvalidConfig(
                "max_catch_up_frames must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// The scene-level part of this configuration.
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig { debug: self.debug }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_60hz() {
        let config = EngineConfig::default();
        assert!((config.fixed_dt - 1.0 / 60.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(
            EngineConfig::from_json_str("{}").unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn zero_dt_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "fixed_dt": 0.0 }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTimestep { .. }));
    }

    #[test]
    fn negative_dt_is_rejected() {
        let config = EngineConfig {
            fixed_dt: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidTimestep { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = EngineConfig::from_json_str("{ fixed_dt: ").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load("/definitely/not/here/stratum.json").unwrap_err();
        assert!(matches!(err, EngineError::ConfigIo { .. }));
    }

    #[test]
    fn debug_flag_reaches_world_config() {
        let config = EngineConfig {
            debug: true,
            ..Default::default()
        };
        assert!(config.world_config().debug);
    }
}
