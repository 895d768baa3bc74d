//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document on disk.
//!
//! - Load: missing file → `NotFound`, unparsable → `Corrupted`, then the
//!   same validation the engine applies on hot reload.
//! - Save: validate first, then write to a sibling temp file and rename it
//!   over the target so a crash never leaves a half-written config.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::EngineConfig;
use crate::error::ConfigError;

/// Config stored as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load, or fall back to defaults when nothing is stored yet.
    ///
    /// Corrupt or invalid files are still reported.
    pub fn load_or_default(&self) -> Result<EngineConfig, ConfigError> {
        match self.load() {
            Err(ConfigError::NotFound) => {
                info!("JsonConfigStore: no config at {}, using defaults", self.path.display());
                Ok(EngineConfig::default())
            }
            other => other,
        }
    }
}

impl ConfigPort for JsonConfigStore {
    fn load(&self) -> Result<EngineConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let config: EngineConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("JsonConfigStore: {} unparsable: {e}", self.path.display());
            ConfigError::Corrupted
        })?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self, config: &EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config).map_err(|_| ConfigError::IoError)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|_| ConfigError::IoError)?;
        fs::rename(&tmp, &self.path).map_err(|_| ConfigError::IoError)?;
        info!("JsonConfigStore: config saved to {}", self.path.display());
        Ok(())
    }
}
