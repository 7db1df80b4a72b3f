//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! settle_ms = 1000       # Wait after the first change before regenerating
//! cooldown_ms = 2000     # Ignore further changes for this long afterwards
//! extensions = ["html", "htm", "j2", "jinja", "jinja2", "css"]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Settle delay in milliseconds (lets editors finish writing).
    pub settle_ms: u64,

    /// Cooldown window in milliseconds after a regeneration.
    pub cooldown_ms: u64,

    /// File extensions that trigger regeneration (without the dot).
    pub extensions: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            cooldown_ms: 2000,
            extensions: ["html", "htm", "j2", "jinja", "jinja2", "css"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl WatchConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Whether a change to `path` should trigger regeneration.
    pub fn is_watched(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|watched| watched.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}
