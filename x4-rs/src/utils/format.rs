//! Formatting utilities

use chrono::{Local, TimeZone};
use humansize::{DECIMAL, format_size};
use x4_cat::ExtractionSummary;

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a catalog entry timestamp (seconds since the Unix epoch)
pub fn format_timestamp(epoch: i64) -> String {
    match Local.timestamp_opt(epoch, 0) {
        chrono::LocalResult::Single(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => format!("invalid ({epoch})"),
    }
}

/// One-line description of an extraction run
pub fn format_summary(summary: &ExtractionSummary) -> String {
    format!(
        "{} written ({}), {} up to date, {} removed",
        summary.written,
        format_bytes(summary.bytes_written),
        summary.skipped,
        summary.removed
    )
}
