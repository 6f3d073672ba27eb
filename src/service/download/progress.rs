//! Human-readable sizes, durations, the block progress bar, and the status
//! texts built from them.

use std::time::Duration;

use teloxide::utils::html;

use super::model::ProgressSnapshot;

pub const DEFAULT_BAR_LENGTH: usize = 10;

const FILLED_BLOCK: &str = "▰";
const EMPTY_BLOCK: &str = "▱";

pub fn format_bytes(size: u64) -> String {
    let mut size = size as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1}{}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1}TB", size)
}

/// `floor(percent / (100 / length))` filled blocks, clamped to the bar.
pub fn render_bar(percent: f64, length: usize) -> String {
    let filled = if length == 0 {
        0
    } else {
        let step = 100.0 / length as f64;
        ((percent / step).floor().max(0.0) as usize).min(length)
    };

    format!(
        "[{}{}]",
        FILLED_BLOCK.repeat(filled),
        EMPTY_BLOCK.repeat(length - filled)
    )
}

pub fn percent(downloaded: u64, total: u64) -> f64 {
    downloaded as f64 / total.max(1) as f64 * 100.0
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

pub fn started_text(file_name: &str, total_size: u64) -> String {
    t!(
        "download.started",
        file_name = html::escape(file_name),
        size = format_bytes(total_size)
    )
    .to_string()
}

pub fn progress_text(file_name: &str, total_size: u64, snapshot: &ProgressSnapshot) -> String {
    t!(
        "download.progress",
        file_name = html::escape(file_name),
        size = format_bytes(total_size),
        percent = format!("{:.1}", snapshot.percent),
        bar = snapshot.bar.clone(),
        downloaded = format_bytes(snapshot.downloaded)
    )
    .to_string()
}

pub fn completed_text(file_name: &str, total_size: u64, elapsed: Duration) -> String {
    t!(
        "download.completed",
        file_name = html::escape(file_name),
        size = format_bytes(total_size),
        elapsed = format_duration(elapsed)
    )
    .to_string()
}

pub fn failed_text(file_name: &str, error: &str) -> String {
    t!(
        "download.failed",
        file_name = html::escape(file_name),
        error = html::escape(error)
    )
    .to_string()
}
