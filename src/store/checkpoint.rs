// src/store/checkpoint.rs
// =============================================================================
// Saves and restores crawl progress in `<output>/_progress/progress.json`.
//
// There is exactly one slot per output directory. Every save overwrites it.
// A checkpoint is only honoured if it was written for the same start URL
// (plain string equality), otherwise the new crawl starts from scratch.
//
// File format:
//   {
//     "start_url": "https://wiki.example.com/display/Proj",
//     "visited_urls": ["...", "..."],
//     "timestamp": 1760000000.123,
//     "pending": [{ "url": "...", "depth": 1 }]
//   }
// `pending` is optional when reading.
//
// Rust concepts:
// - #[serde(default)]: older progress files without `pending` still parse
// - Option<Checkpoint>: every reason to start fresh collapses into None
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::crawl::FrontierEntry;
use crate::error::CheckpointError;

pub const PROGRESS_DIR: &str = "_progress";
const PROGRESS_FILE: &str = "progress.json";

/// One saved snapshot of a crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub start_url: String,
    pub visited_urls: Vec<String>,
    /// Unix time in seconds when the snapshot was written
    pub timestamp: f64,
    /// Frontier entries that were still waiting when the snapshot was written
    #[serde(default)]
    pub pending: Vec<FrontierEntry>,
}

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// `output_dir` is the crawl's output root; the store lives in its `_progress` child.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: output_dir.as_ref().join(PROGRESS_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(PROGRESS_FILE)
    }

    /// Overwrites the checkpoint with the given progress.
    pub fn save(
        &self,
        start_url: &str,
        visited_urls: &[String],
        pending: &[FrontierEntry],
    ) -> Result<(), CheckpointError> {
        let checkpoint = Checkpoint {
            start_url: start_url.to_string(),
            visited_urls: visited_urls.to_vec(),
            timestamp: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
            pending: pending.to_vec(),
        };

        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(&checkpoint)?;

        // Write next to the target and rename, so a crash mid-write never
        // leaves a truncated progress file behind
        let tmp = self.dir.join(format!("{PROGRESS_FILE}.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.path())?;

        debug!(
            visited = checkpoint.visited_urls.len(),
            pending = checkpoint.pending.len(),
            "checkpoint saved"
        );
        Ok(())
    }

    /// Returns the stored checkpoint if it belongs to `start_url`.
    ///
    /// Missing, unreadable or foreign checkpoints all yield `None`.
    pub fn load(&self, start_url: &str) -> Option<Checkpoint> {
        let path = self.path();
        if !path.exists() {
            return None;
        }

        let checkpoint = match read_checkpoint(&path) {
            Ok(checkpoint) => checkpoint,
            Err(e) => {
                warn!(path = %path.display(), "ignoring unreadable checkpoint: {}", e);
                return None;
            }
        };

        if checkpoint.start_url != start_url {
            info!(
                stored = %checkpoint.start_url,
                requested = start_url,
                "checkpoint belongs to a different start URL, starting fresh"
            );
            return None;
        }

        Some(checkpoint)
    }
}

fn read_checkpoint(path: &Path) -> Result<Checkpoint, CheckpointError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
