//! Template watch loop.
//!
//! Regenerates the remembered document whenever a template-side file changes.
//!
//! Architecture:
//! ```text
//! notify → TemplateWatcher (classify) → ChangeEvent → WatchLoop → WatchNotice
//!                                                        │
//!                                          spawn_blocking(Regenerate)
//! ```
//!
//! The loop alternates between two states:
//!
//! - `Idle`: the first change starts the settle delay. Changes arriving during
//!   the delay join the pending regeneration.
//! - `Cooldown`: entered after every regeneration attempt, successful or not.
//!   Changes are dropped until the window ends.

// Raw notify events -> ChangeEvent.
mod event;
// Idle/Cooldown state machine.
mod state;
// notify handle and watch-root lifecycle.
mod watcher;

#[cfg(test)]
mod tests;

pub use event::{ChangeEvent, ChangeKind, classify};
pub use state::{WatchLoop, WatchState};
pub use watcher::TemplateWatcher;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::WatchConfig;
use crate::error::Result;
use crate::regen::RegenerationCache;

/// Something that can re-run the last generation.
pub trait Regenerate: Send + Sync + 'static {
    /// `Ok(None)` when there is nothing to regenerate yet.
    fn regenerate(&self) -> Result<Option<Vec<u8>>>;
}

impl Regenerate for RegenerationCache {
    fn regenerate(&self) -> Result<Option<Vec<u8>>> {
        self.replay()
    }
}

/// Settle and cooldown windows of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchTiming {
    pub settle: Duration,
    pub cooldown: Duration,
}

impl Default for WatchTiming {
    fn default() -> Self {
        Self::from(&WatchConfig::default())
    }
}

impl From<&WatchConfig> for WatchTiming {
    fn from(config: &WatchConfig) -> Self {
        Self {
            settle: config.settle(),
            cooldown: config.cooldown(),
        }
    }
}

/// Outcome of one regeneration attempt, delivered to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchNotice {
    Regenerated { trigger: PathBuf, bytes: Vec<u8> },
    Failed { trigger: PathBuf, error: String },
    NothingRemembered { trigger: PathBuf },
}

impl WatchNotice {
    pub fn trigger(&self) -> &Path {
        match self {
            Self::Regenerated { trigger, .. }
            | Self::Failed { trigger, .. }
            | Self::NothingRemembered { trigger } => trigger,
        }
    }
}
