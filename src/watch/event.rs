use std::path::PathBuf;

use notify::EventKind;
use notify::event::ModifyKind;

use crate::config::WatchConfig;
use crate::debug;
use crate::utils::path::{is_temp_file, normalize_path};

/// What happened to a watched file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
        }
    }
}

/// A template-side file change that may trigger regeneration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Modified,
        }
    }
}

/// Turn a raw notify event into change events worth reacting to.
///
/// Drops metadata-only changes (mtime/atime/chmod noise), removals,
/// editor temp files and files whose extension is not watched.
pub fn classify(event: &notify::Event, config: &WatchConfig) -> Vec<ChangeEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(_) => ChangeKind::Modified,
        _ => return Vec::new(),
    };

    debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

    event
        .paths
        .iter()
        .filter(|path| !is_temp_file(path) && config.is_watched(path))
        .map(|path| ChangeEvent {
            path: normalize_path(path),
            kind,
        })
        .collect()
}
