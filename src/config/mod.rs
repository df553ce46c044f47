//! Engine configuration
//!
//! `EngineConfig` carries the settings that shape detection:
//!
//! - **Buffer size**: how many typed characters are remembered
//! - **End characters**: which characters close a pending trigger
//! - **Pointer reset**: whether a click inside the host clears typed context
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Files are JSON.
//!
//! # Example
//!
//! ```no_run
//! use hotstring_engine::config::EngineConfig;
//!
//! let config = EngineConfig::load("~/.config/hotstring/config.json")?;
//! println!("Buffer holds {} characters", config.max_buffer_len);
//! # Ok::<(), hotstring_engine::config::ConfigError>(())
//! ```

mod error;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use error::ConfigError;

use crate::engine::buffer::DEFAULT_MAX_LEN;

/// Characters that close a pending trigger unless configured otherwise
pub const DEFAULT_END_CHARS: &str = "-()[]{}':;\"/\\,.?!\n \t";

/// Upper bound accepted for `max_buffer_len`
const MAX_BUFFER_LIMIT: usize = 4096;

/// Detection settings for one engine instance.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of buffered characters (oldest dropped first)
    pub max_buffer_len: usize,

    /// End characters, replaced wholesale by `Engine::set_end_chars`
    pub end_chars: String,

    /// Clear the buffer when the pointer is pressed inside the host
    pub reset_on_pointer: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_buffer_len: DEFAULT_MAX_LEN,
            end_chars: DEFAULT_END_CHARS.to_string(),
            reset_on_pointer: true,
        }
    }
}

impl EngineConfig {
    /// Loads a config file, expanding a leading `~`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::Parse` if it isn't valid JSON for this struct and
    /// `ConfigError::ValidationFailed` if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = expand_path(path.as_ref())?;

        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }

        let content = fs::read_to_string(&path)?;
        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse { path, source })?;

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_buffer_len == 0 || self.max_buffer_len > MAX_BUFFER_LIMIT {
            return Err(ConfigError::ValidationFailed(format!(
                "max_buffer_len must be between 1 and {}, found {}",
                MAX_BUFFER_LIMIT, self.max_buffer_len
            )));
        }

        Ok(())
    }
}

/// Expands `~` and environment variables in a user-supplied path.
pub fn expand_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let raw = path
        .to_str()
        .ok_or_else(|| ConfigError::InvalidPath(path.display().to_string()))?;

    let expanded = shellexpand::full(raw)
        .map_err(|e| ConfigError::InvalidPath(e.to_string()))?;

    Ok(PathBuf::from(expanded.as_ref()))
}
