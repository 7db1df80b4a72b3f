//! Watch loop timing tests on a paused tokio clock.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};

use super::*;
use crate::error::{PipelineError, Result};
use crate::pipeline::tests::{ASSESSMENT_ID, assessment, fixture};
use crate::regen::RegenerationCache;

type Script = Box<dyn Fn(usize) -> Result<Option<Vec<u8>>> + Send + Sync>;

/// Regenerator driven by a closure over the call number.
struct Scripted {
    calls: AtomicUsize,
    script: Script,
}

impl Scripted {
    fn new(script: impl Fn(usize) -> Result<Option<Vec<u8>>> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script: Box::new(script),
        })
    }

    fn ok() -> Arc<Self> {
        Self::new(|n| Ok(Some(format!("%PDF-{n}").into_bytes())))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Regenerate for Scripted {
    fn regenerate(&self) -> Result<Option<Vec<u8>>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(n)
    }
}

struct Harness {
    events: mpsc::Sender<ChangeEvent>,
    notices: mpsc::Receiver<WatchNotice>,
    handle: JoinHandle<()>,
}

impl Harness {
    async fn change(&self, path: &str) {
        self.events.send(ChangeEvent::modified(path)).await.unwrap();
    }

    async fn next(&mut self) -> WatchNotice {
        self.notices.recv().await.unwrap()
    }

    /// Close the event channel and collect whatever is still emitted.
    async fn finish(self) -> Vec<WatchNotice> {
        let Harness {
            events,
            mut notices,
            handle,
        } = self;
        drop(events);
        handle.await.unwrap();

        let mut rest = Vec::new();
        while let Some(notice) = notices.recv().await {
            rest.push(notice);
        }
        rest
    }
}

fn start<R: Regenerate>(regen: Arc<R>) -> Harness {
    let (events, event_rx) = mpsc::channel(16);
    let (notice_tx, notices) = mpsc::channel(16);
    let watch = WatchLoop::new(regen, WatchTiming::default(), notice_tx);
    let handle = tokio::spawn(watch.run(event_rx));
    Harness {
        events,
        notices,
        handle,
    }
}

fn trigger(path: &str) -> PathBuf {
    PathBuf::from(path)
}

#[test]
fn test_default_timing() {
    let timing = WatchTiming::default();
    assert_eq!(timing.settle, Duration::from_millis(1000));
    assert_eq!(timing.cooldown, Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn test_burst_during_settle_regenerates_once() {
    let regen = Scripted::ok();
    let mut harness = start(Arc::clone(&regen));
    let started = Instant::now();

    harness.change("templates/caries_risk.html").await;
    sleep(Duration::from_millis(100)).await;
    harness.change("templates/shared.css").await;

    let notice = harness.next().await;
    assert!(started.elapsed() >= Duration::from_millis(1000));
    assert_eq!(
        notice,
        WatchNotice::Regenerated {
            trigger: trigger("templates/caries_risk.html"),
            bytes: b"%PDF-0".to_vec(),
        }
    );

    assert!(harness.finish().await.is_empty());
    assert_eq!(regen.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_changes_during_cooldown_are_dropped() {
    let regen = Scripted::ok();
    let mut harness = start(Arc::clone(&regen));

    harness.change("a.html").await;
    assert_eq!(harness.next().await.trigger(), Path::new("a.html"));

    // Inside the cooldown window.
    harness.change("b.html").await;
    sleep(Duration::from_millis(2500)).await;

    harness.change("c.html").await;
    assert_eq!(harness.next().await.trigger(), Path::new("c.html"));

    assert!(harness.finish().await.is_empty());
    assert_eq!(regen.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failure_still_returns_to_idle() {
    let regen = Scripted::new(|n| match n {
        0 => Err(PipelineError::Conversion("converter exited with status 1".into())),
        n => Ok(Some(vec![n as u8])),
    });
    let mut harness = start(Arc::clone(&regen));

    harness.change("a.html").await;
    match harness.next().await {
        WatchNotice::Failed { trigger: t, error } => {
            assert_eq!(t, trigger("a.html"));
            assert!(error.contains("converter exited with status 1"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    sleep(Duration::from_millis(2100)).await;
    harness.change("a.html").await;
    assert!(matches!(harness.next().await, WatchNotice::Regenerated { .. }));

    harness.finish().await;
    assert_eq!(regen.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_panic_is_reported_as_failure() {
    let regen = Scripted::new(|_| panic!("renderer blew up"));
    let mut harness = start(Arc::clone(&regen));

    harness.change("a.html").await;
    match harness.next().await {
        WatchNotice::Failed { error, .. } => assert!(error.contains("panicked")),
        other => panic!("expected failure, got {other:?}"),
    }

    harness.finish().await;
}

#[tokio::test(start_paused = true)]
async fn test_closing_during_settle_still_regenerates() {
    let regen = Scripted::ok();
    let harness = start(Arc::clone(&regen));

    harness.change("a.html").await;
    let rest = harness.finish().await;

    assert_eq!(rest.len(), 1);
    assert!(matches!(rest[0], WatchNotice::Regenerated { .. }));
    assert_eq!(regen.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_replays_remembered_request() {
    let fx = fixture();
    let cache = Arc::new(RegenerationCache::new(Arc::clone(&fx.pipeline)));
    let mut harness = start(Arc::clone(&cache));

    harness.change("caries_risk.html").await;
    assert_eq!(
        harness.next().await,
        WatchNotice::NothingRemembered {
            trigger: trigger("caries_risk.html")
        }
    );

    cache.remember(Arc::new(assessment()), ASSESSMENT_ID);
    sleep(Duration::from_millis(2100)).await;
    harness.change("caries_risk.html").await;

    let expected = fx.pipeline.generate(&assessment(), ASSESSMENT_ID).unwrap();
    match harness.next().await {
        WatchNotice::Regenerated { bytes, .. } => assert_eq!(bytes, expected),
        other => panic!("expected regeneration, got {other:?}"),
    }

    harness.finish().await;
}
