/// Search tuning knobs.
///
/// Every field has a default, so a JSON file only needs to name the values
/// it overrides.
use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default scanner window in bytes.
pub const DEFAULT_WINDOW_SIZE: usize = 4 * 1024;

/// How long a new search waits for the one it replaces to exit.
pub const DEFAULT_RETIRE_TIMEOUT_MS: u64 = 1_000;

/// Shortest search text the UI accepts.
pub const DEFAULT_MIN_PATTERN_LEN: usize = 3;

/// Maximum number of progress messages that may queue up in the channel.
///
/// The UI drains the channel once per frame. If it falls behind, the
/// worker stalls on `send` rather than consuming unbounded heap.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 4_096;

/// Largest accepted scanner window (64 MiB).
pub const MAX_WINDOW_SIZE: usize = 64 * 1024 * 1024;

/// Largest accepted channel capacity. The channel allocates its slots up front.
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Bytes read from a file per scanner window.
    pub window_size: usize,
    pub retire_timeout_ms: u64,
    /// Minimum number of characters before a search may start.
    pub min_pattern_len: usize,
    /// Encoding label preselected in the charset picker.
    pub default_encoding: String,
    /// Post a progress message every this many leaves.
    pub progress_stride: u64,
    pub channel_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            retire_timeout_ms: DEFAULT_RETIRE_TIMEOUT_MS,
            min_pattern_len: DEFAULT_MIN_PATTERN_LEN,
            default_encoding: crate::search::pattern::DEFAULT_ENCODING.to_string(),
            progress_stride: 16,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl SearchConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SearchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 || self.window_size > MAX_WINDOW_SIZE {
            return Err(SearchError::Config(format!(
                "window_size must be in 1..={MAX_WINDOW_SIZE}"
            )));
        }
        if self.channel_capacity == 0 || self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(SearchError::Config(format!(
                "channel_capacity must be in 1..={MAX_CHANNEL_CAPACITY}"
            )));
        }
        if self.progress_stride == 0 {
            return Err(SearchError::Config("progress_stride must be > 0".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn retire_timeout(&self) -> Duration {
        Duration::from_millis(self.retire_timeout_ms)
    }
}
