//! Watch command - recompute estimates while the slot is edited
//!
//! The slot is mirrored to a Markdown file. Saving that file writes the
//! content back to the slot and queues a debounced recompute.

use anyhow::{Context, Result};
use notify::event::{AccessKind, AccessMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

use super::{open_store, slot_export_path, PromptArgs, PromptPlan};
use crate::config::Config;
use crate::core::EditorBuffer;
use crate::prompt::{Debouncer, Prompt};
use crate::ui;

pub async fn run(config: Config, args: &PromptArgs) -> Result<()> {
    let plan = PromptPlan::from_args(&config, args).await?;
    let store = open_store(&config)?;
    let mut buffer = EditorBuffer::load(&store, plan.module.slot())?;

    let path = slot_export_path(&config, buffer.slot())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    std::fs::write(&path, buffer.content())
        .with_context(|| format!("Failed to export slot to {:?}", path))?;

    let locale = config.general.locale.clone();
    ui::print_header(&format!("Watching {}", path.display()));

    let (event_tx, mut event_rx) = mpsc::channel(64);
    let _watcher = create_watcher(&path, event_tx)?;

    let recompute = plan.clone();
    let mut current = Prompt::empty(plan.template_text(), plan.model);
    let debouncer = Debouncer::new(
        Duration::from_millis(config.prompt.debounce_ms),
        Duration::from_millis(config.prompt.max_wait_ms),
        move |content: String| {
            let next = recompute.prepare(&content);
            if current.is_empty() || next.text != current.text {
                ui::print_summary(&next, &locale);
                current = next;
            }
        },
    );

    // First summary right away
    debouncer.call(buffer.content().to_string());
    debouncer.flush();

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    Ok(event) if finished_writing(&event, &path) => debouncer.flush(),
                    Ok(event) if touches(&event, &path) => {
                        let content = match tokio::fs::read_to_string(&path).await {
                            Ok(content) => content,
                            Err(e) => {
                                tracing::debug!("Skipping unreadable {:?}: {}", path, e);
                                continue;
                            }
                        };
                        if content != buffer.content() {
                            buffer.set(content.clone())?;
                            debouncer.call(content);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Watch error: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Interrupted, stopping watch");
                break;
            }
        }
    }

    debouncer.finish().await;
    ui::print_success(&format!("Slot '{}' saved", buffer.slot()));
    Ok(())
}

fn create_watcher(
    path: &Path,
    event_tx: mpsc::Sender<notify::Result<Event>>,
) -> Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = event_tx.blocking_send(res);
        },
        notify::Config::default(),
    )
    .context("Failed to create file watcher")?;

    // Editors often replace the file on save, so watch its directory
    let dir = path.parent().unwrap_or(path);
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {:?}", dir))?;
    tracing::info!("Watching path: {:?}", path);
    Ok(watcher)
}

fn touches(event: &Event, path: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) && names(event, path)
}

/// The editor closed the file after writing, so the pending recompute can run now
fn finished_writing(event: &Event, path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
    ) && names(event, path)
}

fn names(event: &Event, path: &Path) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name() == path.file_name())
}
