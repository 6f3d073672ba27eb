use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, Utc};
use teloxide::types::MessageId;

use crate::config::MIB;

use super::progress::{self, DEFAULT_BAR_LENGTH};

/// Progress must advance at least this much between edits, even for small files.
pub const MIN_UPDATE_STEP: u64 = 10 * MIB;

/// At or above this percentage every poll is worth an edit.
pub const NEAR_COMPLETE_PERCENT: f64 = 99.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub downloaded: u64,
    pub percent: f64,
    pub bar: String,
}

impl ProgressSnapshot {
    pub fn new(downloaded: u64, percent: f64) -> Self {
        Self {
            downloaded,
            percent,
            bar: progress::render_bar(percent, DEFAULT_BAR_LENGTH),
        }
    }
}

/// State of one download, owned by the task that runs it.
#[derive(Debug)]
pub struct DownloadSession {
    pub total_size: u64,
    pub file_name: String,
    pub status_message: MessageId,
    update_threshold: u64,
    last_reported: u64,
    edits_issued: u32,
    edit_budget: u32,
}

impl DownloadSession {
    pub fn new(total_size: u64, file_name: String, status_message: MessageId, edit_budget: u32) -> Self {
        Self {
            total_size,
            file_name,
            status_message,
            update_threshold: (total_size / 5).max(MIN_UPDATE_STEP),
            last_reported: 0,
            edits_issued: 0,
            edit_budget,
        }
    }

    pub fn update_threshold(&self) -> u64 {
        self.update_threshold
    }

    pub fn edits_issued(&self) -> u32 {
        self.edits_issued
    }

    /// Returns the snapshot to publish if `downloaded` warrants an edit.
    pub fn due_snapshot(&self, downloaded: u64) -> Option<ProgressSnapshot> {
        if self.edits_issued >= self.edit_budget {
            return None;
        }

        let percent = progress::percent(downloaded, self.total_size);
        let advanced = downloaded.saturating_sub(self.last_reported);

        if advanced >= self.update_threshold || percent >= NEAR_COMPLETE_PERCENT {
            Some(ProgressSnapshot::new(downloaded, percent))
        } else {
            None
        }
    }

    pub fn record_edit(&mut self, downloaded: u64) {
        self.last_reported = downloaded;
        self.edits_issued += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedMedia {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub completed_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl DownloadedMedia {
    pub fn label(&self) -> &str {
        &self.file_name
    }
}
