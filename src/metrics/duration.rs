//! Duration codes: `PT1H2M3S` style content durations as returned by the
//! YouTube `contentDetails.duration` field.
//!
//! The parse is lossy on purpose: anything it cannot read becomes zero
//! seconds rather than an error, so one odd record never fails a batch.

use std::sync::LazyLock;

use regex::Regex;

/// Matches the time part of an ISO 8601 duration. Unanchored, so the first
/// `PT` occurrence wins and a leading day component (`P1DT…`) is skipped.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration regex must compile")
});

/// Convert a duration code into whole seconds.
///
/// Missing components count as zero; input without a `PT` marker yields 0.
pub fn parse_duration(code: &str) -> u64 {
    let Some(caps) = DURATION_RE.captures(code) else {
        return 0;
    };

    let component = |idx: usize| -> u64 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    component(1)
        .saturating_mul(3600)
        .saturating_add(component(2).saturating_mul(60))
        .saturating_add(component(3))
}

/// Render seconds as `m:ss` or `h:mm:ss` for table output.
pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
