use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};

use super::{ChangeEvent, Regenerate, WatchNotice, WatchTiming};
use crate::{debug, log};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Cooldown { until: Instant },
}

/// Settle → regenerate → cooldown loop.
pub struct WatchLoop<R> {
    regen: Arc<R>,
    timing: WatchTiming,
    state: WatchState,
    notices: mpsc::Sender<WatchNotice>,
}

impl<R: Regenerate> WatchLoop<R> {
    pub fn new(regen: Arc<R>, timing: WatchTiming, notices: mpsc::Sender<WatchNotice>) -> Self {
        Self {
            regen,
            timing,
            state: WatchState::Idle,
            notices,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Consume change events until the sender side closes or the notice
    /// receiver is dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<ChangeEvent>) {
        while let Some(event) = events.recv().await {
            self.expire_cooldown();
            if let WatchState::Cooldown { .. } = self.state {
                debug!("watch"; "cooldown, dropping {} ({})", event.path.display(), event.kind.label());
                continue;
            }

            debug!("watch"; "{} {}, settling", event.path.display(), event.kind.label());
            let open = self.settle(&mut events).await;

            let notice = self.regenerate(event.path).await;
            self.state = WatchState::Cooldown {
                until: Instant::now() + self.timing.cooldown,
            };

            if self.notices.send(notice).await.is_err() {
                debug!("watch"; "notice receiver dropped, stopping");
                break;
            }
            if !open {
                break;
            }
        }

        debug!("watch"; "watch loop finished");
    }

    fn expire_cooldown(&mut self) {
        if let WatchState::Cooldown { until } = self.state
            && Instant::now() >= until
        {
            self.state = WatchState::Idle;
        }
    }

    /// Wait out the settle delay, absorbing events that arrive meanwhile.
    ///
    /// Returns `false` if the event channel closed during the wait.
    async fn settle(&self, events: &mut mpsc::Receiver<ChangeEvent>) -> bool {
        let deadline = sleep(self.timing.settle);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;
                _ = &mut deadline => return true,
                next = events.recv() => match next {
                    Some(event) => {
                        debug!("watch"; "coalescing {}", event.path.display());
                    }
                    None => {
                        (&mut deadline).await;
                        return false;
                    }
                },
            }
        }
    }

    /// Run the regeneration on the blocking pool. Errors and panics both
    /// become `Failed`.
    async fn regenerate(&self, trigger: PathBuf) -> WatchNotice {
        let regen = Arc::clone(&self.regen);

        match tokio::task::spawn_blocking(move || regen.regenerate()).await {
            Ok(Ok(Some(bytes))) => {
                debug!("watch"; "regenerated {} bytes", bytes.len());
                WatchNotice::Regenerated { trigger, bytes }
            }
            Ok(Ok(None)) => {
                debug!("watch"; "change in {}, but nothing generated yet", trigger.display());
                WatchNotice::NothingRemembered { trigger }
            }
            Ok(Err(e)) => {
                log!("error"; "regeneration failed: {}", e);
                WatchNotice::Failed {
                    trigger,
                    error: e.to_string(),
                }
            }
            Err(join) => {
                log!("error"; "regeneration panicked: {}", join);
                WatchNotice::Failed {
                    trigger,
                    error: format!("regeneration panicked: {join}"),
                }
            }
        }
    }
}
