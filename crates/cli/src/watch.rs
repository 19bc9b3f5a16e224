//! Watch mode: poll a directory and explain every new deck that appears.
//!
//! A deck counts as processed once its report exists. A deck that fails is
//! remembered with its size and modification time, and is only tried again
//! once the file on disk changes (e.g. a copy that was still in progress).

use crate::pipeline::Pipeline;
use anyhow::{bail, Context, Result};
use explainer_core::{output_path, PresentationFormat};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::time::MissedTickBehavior;

/// Size and modification time of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    /// Stamp of the file at `path`, if it can be read.
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Decks that failed, with the stamp they had when they were tried.
pub type FailedDecks = HashMap<PathBuf, FileStamp>;

/// Poll `dir` every `interval` until Ctrl-C.
pub async fn watch(dir: &Path, pipeline: &Pipeline, interval: Duration) -> Result<()> {
    if !dir.is_dir() {
        bail!("Watch directory not found: {}", dir.display());
    }

    log::info!(
        "Watching {} every {:?} (Ctrl-C to stop)",
        dir.display(),
        interval
    );

    let mut failed = FailedDecks::new();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("Stopping watch");
                return Ok(());
            }
        }

        poll_once(dir, pipeline, &mut failed).await?;
    }
}

/// Process every pending deck in `dir` once. Returns how many reports were
/// written.
pub async fn poll_once(dir: &Path, pipeline: &Pipeline, failed: &mut FailedDecks) -> Result<usize> {
    let pending = pending_decks(dir, pipeline.output_dir(), failed)?;
    if pending.is_empty() {
        log::info!("No unprocessed files found. Waiting for new files...");
        return Ok(0);
    }

    let mut written = 0;
    for path in pending {
        // Stamp before loading, so a write that lands mid-run counts as a change.
        let stamp = FileStamp::of(&path);

        log::info!("Processing file {}", path.display());
        match pipeline.process_to_file(&path).await {
            Ok(report) => {
                log::info!("File processed successfully: {}", report.display());
                failed.remove(&path);
                written += 1;
            }
            Err(e) => {
                log::error!("Error processing file {}: {:#}", path.display(), e);
                if let Some(stamp) = stamp {
                    failed.insert(path, stamp);
                }
            }
        }
    }

    Ok(written)
}

/// Decks in `dir` that have no report yet, sorted by path.
///
/// Office lock files (`~$name.pptx`) are ignored, as is any deck in
/// `failed` that has not changed since it was tried.
pub fn pending_decks(
    dir: &Path,
    output_dir: Option<&Path>,
    failed: &FailedDecks,
) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut pending = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !is_deck(&path) || output_path(&path, output_dir).exists() {
            continue;
        }
        if let Some(stamp) = failed.get(&path) {
            if FileStamp::of(&path).as_ref() == Some(stamp) {
                continue;
            }
            log::debug!("{} changed since it failed; retrying", path.display());
        }
        pending.push(path);
    }

    pending.sort();
    Ok(pending)
}

fn is_deck(path: &Path) -> bool {
    let is_pptx = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(PresentationFormat::from_extension)
        == Some(PresentationFormat::Pptx);
    let is_lock_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"));

    is_pptx && !is_lock_file && path.is_file()
}
