//! CSV export of the current (filtered, sorted) view.
//!
//! The format targets spreadsheet import: UTF-8 with a byte-order mark,
//! comma separated, no quoting. Commas inside free text (title, channel,
//! tags) are replaced with spaces instead of being escaped.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::record::MediaRecord;

/// UTF-8 byte-order mark, so spreadsheet tools pick the right encoding.
pub const BOM: &str = "\u{FEFF}";

pub const HEADER: [&str; 10] = [
    "title",
    "channel",
    "views",
    "vph",
    "subscribers",
    "date",
    "duration",
    "ratio",
    "influence",
    "tags",
];

/// Render the view as CSV. `None` when there is nothing to export.
pub fn to_csv(records: &[MediaRecord]) -> Option<String> {
    if records.is_empty() {
        return None;
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADER.join(","));
    lines.extend(records.iter().map(row));

    Some(format!("{BOM}{}", lines.join("\n")))
}

fn row(record: &MediaRecord) -> String {
    [
        strip_commas(record.title()),
        strip_commas(record.channel_title()),
        record.view_count().to_string(),
        record.vph().to_string(),
        record.subscriber_count().to_string(),
        record.published_date().to_string(),
        record.duration().to_string(),
        format!("{:.2}", record.performance_ratio() * 100.0),
        record.influence_tier().label().to_string(),
        record
            .tags()
            .iter()
            .map(|tag| strip_commas(tag))
            .collect::<Vec<_>>()
            .join(";"),
    ]
    .join(",")
}

fn strip_commas(text: &str) -> String {
    text.replace(',', " ")
}

/// Suggested download name: `youtube_analysis_{query}_{YYYY-MM-DD}.csv`.
pub fn export_file_name(query: &str, today: NaiveDate) -> String {
    format!("youtube_analysis_{}_{}.csv", query, today.format("%Y-%m-%d"))
}

/// Write the view to `path`. Returns `Ok(None)` without touching the
/// filesystem when the view is empty.
pub fn write_csv(records: &[MediaRecord], path: &Path) -> Result<Option<PathBuf>> {
    let Some(csv) = to_csv(records) else {
        return Ok(None);
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context("failed to create export directory")?;
    }
    fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(Some(path.to_path_buf()))
}
