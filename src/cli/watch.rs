//! `docpress watch`: render once, then regenerate on template changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use docpress::config::PressConfig;
use docpress::logger::{status_error, status_success, status_warning};
use docpress::pipeline::DocumentPipeline;
use docpress::regen::RegenerationCache;
use docpress::watch::{TemplateWatcher, WatchLoop, WatchNotice, WatchTiming};
use docpress::{debug, log};
use tokio::sync::{Notify, mpsc};

use super::{RenderArgs, load_record, write_output};

/// How often vanished watch roots are checked for re-attachment.
const MAINTAIN_INTERVAL: Duration = Duration::from_secs(2);

pub fn watch_document(config: &PressConfig, args: &RenderArgs) -> Result<()> {
    let pipeline = Arc::new(DocumentPipeline::from_config(config)?);
    let cache = Arc::new(RegenerationCache::new(pipeline));
    let record = load_record(args)?;
    let output = args.output_path();

    match cache.generate(Arc::clone(&record), &args.template) {
        Ok(bytes) => {
            write_output(&output, &bytes)?;
            status_success(&format!("wrote {}", output.display()));
        }
        Err(e) => {
            // Keep the request so fixing the template retries it.
            cache.remember(record, &args.template);
            status_error("initial render failed", &e.to_string());
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(config, cache, &output))
}

async fn run(config: &PressConfig, cache: Arc<RegenerationCache>, output: &Path) -> Result<()> {
    let shutdown = Arc::new(Notify::new());
    let handler = Arc::clone(&shutdown);
    ctrlc::set_handler(move || handler.notify_one())
        .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))?;

    let (event_tx, event_rx) = mpsc::channel(64);
    let (notice_tx, mut notice_rx) = mpsc::channel(8);

    let roots = watch_roots(config);
    let mut watcher = TemplateWatcher::new(roots.clone(), config.watch.clone(), event_tx)
        .context("Failed to start file watcher")?;
    for root in &roots {
        debug!("watch"; "watching {}", root.display());
    }
    log!("watch"; "watching {} for changes (Ctrl+C to stop)", config.template_dir().display());

    let watch = WatchLoop::new(cache, WatchTiming::from(&config.watch), notice_tx);
    let loop_handle = tokio::spawn(watch.run(event_rx));

    let mut maintain = tokio::time::interval(MAINTAIN_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                log!("watch"; "shutting down...");
                break;
            }
            _ = maintain.tick() => watcher.maintain(),
            notice = notice_rx.recv() => match notice {
                Some(notice) => report(notice, output)?,
                None => break,
            },
        }
    }

    loop_handle.abort();
    Ok(())
}

fn report(notice: WatchNotice, output: &Path) -> Result<()> {
    match notice {
        WatchNotice::Regenerated { trigger, bytes } => {
            write_output(output, &bytes)?;
            status_success(&format!(
                "{} changed, wrote {}",
                display_name(&trigger),
                output.display()
            ));
        }
        WatchNotice::Failed { trigger, error } => {
            status_error(&format!("{} changed, regeneration failed", display_name(&trigger)), &error);
        }
        WatchNotice::NothingRemembered { trigger } => {
            status_warning(&format!("{} changed, nothing to regenerate", display_name(&trigger)));
        }
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Template dir, stylesheet dir and asset dir, without nested duplicates.
fn watch_roots(config: &PressConfig) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = [
        Some(config.template_dir()),
        config.stylesheet().parent(),
        Some(config.assets_dir()),
    ]
    .into_iter()
    .flatten()
    .map(Path::to_path_buf)
    .collect();

    roots.sort();
    roots.dedup();

    let all = roots.clone();
    roots.retain(|root| !all.iter().any(|other| other != root && root.starts_with(other)));
    roots
}
