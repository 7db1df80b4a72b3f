use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

use super::event::{ChangeEvent, classify};
use crate::config::WatchConfig;
use crate::{debug, log};

/// Filesystem watcher feeding change events into the watch loop.
///
/// notify invokes its callback on its own thread; events are classified
/// there and forwarded over a channel, so nothing else runs on that thread.
pub struct TemplateWatcher {
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    roots: WatchRoots,
}

impl TemplateWatcher {
    /// Start watching `roots`, sending relevant changes to `events`.
    ///
    /// Roots that do not exist yet are attached later by [`Self::maintain`].
    pub fn new(
        roots: Vec<PathBuf>,
        config: WatchConfig,
        events: mpsc::Sender<ChangeEvent>,
    ) -> notify::Result<Self> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for change in classify(&event, &config) {
                        // A full channel means a burst is already queued.
                        if events.try_send(change).is_err() {
                            debug!("watch"; "event channel full or closed, dropping event");
                        }
                    }
                }
                Err(e) => log!("watch"; "notify error: {}", e),
            }
        })?;

        let mut roots = WatchRoots::new(roots);
        roots.attach_existing(&mut watcher)?;

        Ok(Self { watcher, roots })
    }

    /// Re-attach roots that were removed and recreated.
    pub fn maintain(&mut self) {
        self.roots.maintain(&mut self.watcher);
    }

    pub fn attached(&self) -> usize {
        self.roots.attached.len()
    }
}

/// Watch-root consistency manager.
///
/// Responsibility:
/// - Attach existing roots at startup
/// - Re-attach roots that were removed and recreated
struct WatchRoots {
    desired: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            desired: paths,
            attached: FxHashSet::default(),
        }
    }

    fn attach_existing(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        for path in &self.desired {
            if !path.exists() {
                continue;
            }
            watcher.watch(path, RecursiveMode::Recursive)?;
            self.attached.insert(path.clone());
        }

        Ok(())
    }

    fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop stale handles for roots that no longer exist.
        self.attached.retain(|path| path.exists());

        for path in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }

            if watcher.watch(path, RecursiveMode::Recursive).is_ok() {
                self.attached.insert(path.clone());
                debug!("watch"; "re-attached watch: {}", path.display());
            }
        }
    }
}
