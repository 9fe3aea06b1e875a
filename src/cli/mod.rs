//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `tubestat search <query>`: fetch, filter, sort and summarize
//! - `tubestat key set|show|clear`: manage the stored YouTube API key
//! - `tubestat config show|init|set|reset`: configuration management
//! - `tubestat history`: past searches from the event log
//! - `tubestat web`: start the dashboard server

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;

use crate::analytics::events::events_log_path;
use crate::analytics::reporter::{self, HistoryStats};
use crate::analytics::{Event, EventLog};
use crate::config::{self, credential};
use crate::export;
use crate::metrics::InfluenceTier;
use crate::metrics::duration::format_duration;
use crate::pipeline::{FilterCriteria, SortSpec, View};
use crate::session::Session;
use crate::summarizer::Summarizer;
use crate::youtube::{SourceError, YouTubeClient};

/// Output format for `search` and `history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// tubestat search
// ---------------------------------------------------------------------------

/// Everything `tubestat search` accepts, already split from clap.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub query: String,
    pub video_type: Option<String>,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub influence: Vec<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub format: OutputFormat,
    pub summary: bool,
    pub export: Option<PathBuf>,
}

/// Run one search end to end and print the resulting view.
pub fn run_search(opts: &SearchOptions) -> Result<()> {
    let query = opts.query.trim();
    if query.is_empty() {
        anyhow::bail!("search query is empty");
    }

    let cfg = config::load();
    let log = EventLog::from_config(&cfg.logging);

    // Validate view options before spending API quota.
    let criteria = FilterCriteria::parse(
        opts.video_type.as_deref(),
        opts.date.as_deref(),
        opts.from.as_deref(),
        opts.to.as_deref(),
        &opts.influence,
    )?;
    let spec = SortSpec::parse(
        opts.sort.as_deref(),
        opts.order.as_deref(),
        cfg.dashboard.default_sort_spec(),
    )?;

    let api_key = credential::load_api_key().unwrap_or_default();
    let client = YouTubeClient::from_config(&cfg.youtube, &api_key)?;

    let mut session = Session::new();
    let ticket = session.begin_search(query);

    let start = Instant::now();
    let fetched = client.fetch(query, Utc::now());
    let latency_ms = start.elapsed().as_millis() as u64;

    let records = match fetched {
        Ok(records) => records,
        Err(e) => {
            let message = e.to_string();
            log.record(&Event::search(query, "cli", Err(&message), latency_ms));
            session.fail_search(ticket, &message);
            return Err(e).with_context(|| format!("search for '{query}' failed"));
        }
    };
    log.record(&Event::search(query, "cli", Ok(records.len()), latency_ms));
    session.complete_search(ticket, records);

    if opts.summary && cfg.summarizer.enabled && !session.records().is_empty() {
        let summarizer = Summarizer::from_config(&cfg.summarizer);
        if opts.format == OutputFormat::Table {
            eprintln!("{}", "Generating AI trend summary...".dimmed());
        }
        let summary = summarizer.summarize(session.records());
        log.record(&Event::summary(query, "cli", &summary));
        session.apply_summary(ticket, summary.text);
    }

    let view = session.view(&criteria, spec, cfg.dashboard.keyword_limit, Utc::now());

    match opts.format {
        OutputFormat::Json => print_view_json(query, spec, &view)?,
        OutputFormat::Csv => print_view_csv(&view),
        OutputFormat::Table => print_view_table(query, session.records().len(), spec, &view),
    }

    if let Some(target) = &opts.export {
        let path = export_path(target, query);
        match export::write_csv(&view.records, &path)? {
            Some(written) => eprintln!(
                "{} Exported {} rows to {}",
                "✓".green().bold(),
                view.records.len(),
                written.display()
            ),
            None => eprintln!("{}", "Nothing to export: the view is empty.".yellow()),
        }
    }

    Ok(())
}

/// A directory target gets the suggested file name appended.
fn export_path(target: &Path, query: &str) -> PathBuf {
    if target.is_dir() {
        target.join(export::export_file_name(query, Utc::now().date_naive()))
    } else {
        target.to_path_buf()
    }
}

fn print_view_table(query: &str, fetched: usize, spec: SortSpec, view: &View) {
    println!("{}", format!("YouTube analysis: \"{query}\"").bold().cyan());
    println!("{}", "=".repeat(78));

    let Some(stats) = &view.stats else {
        if fetched == 0 {
            println!("{}", "No videos found for this query.".yellow());
        } else {
            println!(
                "{}",
                format!("{fetched} videos fetched, none match the current filters.").yellow()
            );
        }
        return;
    };

    println!(
        "  {} {} of {} fetched",
        "Videos:      ".bold(),
        view.records.len(),
        fetched
    );
    println!("  {} {}", "Avg views:   ".bold(), format_number(stats.avg_views));
    println!("  {} {}", "Avg VPH:     ".bold(), format_number(stats.avg_vph));
    println!(
        "  {} {:.1}%",
        "Avg ratio:   ".bold(),
        stats.avg_performance_ratio * 100.0
    );

    let ratio = &stats.type_ratio;
    println!(
        "  {} Shorts: {} ({}%)  Mid: {} ({}%)  Long: {} ({}%)",
        "Formats:     ".bold(),
        ratio.shorts,
        ratio.pct(ratio.shorts),
        ratio.mid,
        ratio.pct(ratio.mid),
        ratio.long,
        ratio.pct(ratio.long),
    );

    if !stats.top_tags.is_empty() {
        let tags: Vec<String> = stats
            .top_tags
            .iter()
            .map(|t| format!("#{} ({})", t.tag, t.count))
            .collect();
        println!("  {} {}", "Top tags:    ".bold(), tags.join("  "));
    }

    if !view.keywords.is_empty() {
        let words: Vec<&str> = view.keywords.iter().map(|k| k.word.as_str()).collect();
        println!("  {} {}", "Keywords:    ".bold(), words.join(", ").dimmed());
    }
    println!();

    if let Some(analysis) = &stats.ai_analysis {
        println!("{}", "AI Trend Summary".bold().cyan());
        println!("  {analysis}");
        println!();
    }

    println!(
        "{}",
        format!("Videos (sorted by {} {})", spec.field, spec.order)
            .bold()
            .cyan()
    );
    println!(
        "  {:<36} {:<16} {:>10} {:>8} {:>9} {:<9} {:>8} {:<10}",
        "Title", "Channel", "Views", "VPH", "Ratio", "Tier", "Length", "Date"
    );
    println!("  {}", "-".repeat(114));

    for (i, record) in view.records.iter().enumerate() {
        let line = format!(
            "  {:<36} {:<16} {:>10} {:>8} {:>8.1}% {:<9} {:>8} {:<10}",
            truncate(record.title(), 36),
            truncate(record.channel_title(), 16),
            format_number(record.view_count()),
            format_number(record.vph()),
            record.performance_ratio() * 100.0,
            colorize_tier(record.influence_tier()),
            format_duration(record.duration_sec()),
            record.published_date(),
        );

        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_view_json(query: &str, spec: SortSpec, view: &View) -> Result<()> {
    let value = serde_json::json!({
        "query": query,
        "sort": spec,
        "records": view.records,
        "stats": view.stats,
        "keywords": view.keywords,
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_view_csv(view: &View) {
    if let Some(csv) = export::to_csv(&view.records) {
        println!("{}", csv.trim_start_matches(export::BOM));
    }
}

// ---------------------------------------------------------------------------
// tubestat key set | show | clear
// ---------------------------------------------------------------------------

pub fn run_key_set(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        anyhow::bail!("API key is empty");
    }
    let path = credential::save_api_key(key)?;
    println!("{} API key saved to {}", "✓".green().bold(), path.display());
    Ok(())
}

pub fn run_key_show() -> Result<()> {
    match credential::load_api_key() {
        Some(key) => println!("{} {}", "API key:".bold(), credential::mask(&key)),
        None => println!("{}", SourceError::MissingCredential.to_string().yellow()),
    }
    Ok(())
}

pub fn run_key_clear() -> Result<()> {
    let path = credential::clear_api_key()?;
    println!("{} API key removed from {}", "✓".green().bold(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// tubestat config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective tubestat Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(config::global_config_file(), "~/.tubestat/config.toml");
    print_source(config::project_config_file(), ".tubestat.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "TUBESTAT_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(path: Option<PathBuf>, label: &str) {
    if path.is_some_and(|p| p.exists()) {
        println!("  {} {}", "✓".green(), label.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{label} (not found)").dimmed());
    }
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// tubestat history
// ---------------------------------------------------------------------------

pub fn run_history(format: OutputFormat, days: Option<u32>, limit: usize) -> Result<()> {
    // Read even when new writes are disabled.
    let log = match events_log_path() {
        Some(path) => EventLog::at(path),
        None => EventLog::disabled(),
    };
    let events = reporter::since_days(log.read(), days, Utc::now());

    if events.is_empty() {
        println!(
            "{}",
            "No searches logged yet. Run `tubestat search <query>` first.".yellow()
        );
        return Ok(());
    }

    let stats = reporter::build_history(&events, limit);
    match format {
        OutputFormat::Json => print_history_json(&stats)?,
        OutputFormat::Csv => print_history_csv(&stats),
        OutputFormat::Table => print_history_table(&stats, &events, limit),
    }

    Ok(())
}

fn print_history_table(stats: &HistoryStats, events: &[Event], limit: usize) {
    println!("{}", "tubestat Search History".bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "  {} {} ({} failed)",
        "Searches: ".bold(),
        stats.searches,
        stats.failed_searches
    );
    println!(
        "  {} {} ms avg",
        "Fetch:    ".bold(),
        format_number(stats.avg_search_latency_ms)
    );
    println!(
        "  {} {} ({} failed, {} ms avg)",
        "Summaries:".bold(),
        stats.summaries,
        stats.failed_summaries,
        format_number(stats.avg_summary_latency_ms)
    );
    println!();

    if !stats.top_queries.is_empty() {
        println!("{}", "Top Queries".bold().cyan());
        println!("  {:<32} {:>8} {:>12}", "Query", "Searches", "Last count");
        println!("  {}", "-".repeat(54));
        for q in &stats.top_queries {
            println!(
                "  {:<32} {:>8} {:>12}",
                truncate(&q.query, 32),
                q.searches,
                q.last_records
            );
        }
        println!();
    }

    println!("{}", "Recent Events".bold().cyan());
    for event in events.iter().rev().take(limit) {
        let outcome = if event.success {
            "ok".green()
        } else {
            "failed".red()
        };
        let detail = event
            .error
            .as_deref()
            .or(event.status.as_deref())
            .unwrap_or_default();
        println!(
            "  {:<20} {:<8} {:<24} {:<7} {}",
            event.timestamp.get(..19).unwrap_or(&event.timestamp),
            format!("{:?}", event.kind).to_lowercase(),
            truncate(&event.query, 24),
            outcome,
            detail.dimmed()
        );
    }
}

fn print_history_json(stats: &HistoryStats) -> Result<()> {
    let value = serde_json::json!({
        "searches": stats.searches,
        "failed_searches": stats.failed_searches,
        "avg_search_latency_ms": stats.avg_search_latency_ms,
        "summaries": stats.summaries,
        "failed_summaries": stats.failed_summaries,
        "avg_summary_latency_ms": stats.avg_summary_latency_ms,
        "top_queries": stats.top_queries.iter().map(|q| serde_json::json!({
            "query": q.query,
            "searches": q.searches,
            "last_records": q.last_records,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_history_csv(stats: &HistoryStats) {
    println!("query,searches,last_records");
    for q in &stats.top_queries {
        println!("{},{},{}", q.query.replace(',', " "), q.searches, q.last_records);
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate to `max_len` characters, appending "…" if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn colorize_tier(tier: InfluenceTier) -> colored::ColoredString {
    let label = format!("{:<9}", tier.label());
    match tier {
        InfluenceTier::VeryHigh => label.red().bold(),
        InfluenceTier::High => label.yellow(),
        InfluenceTier::Normal => label.normal(),
        InfluenceTier::Low | InfluenceTier::VeryLow => label.dimmed(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("요리 브이로그", 3), "요리…");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("xml")), OutputFormat::Table);
    }

    #[test]
    fn export_path_uses_suggested_name_for_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_path(dir.path(), "rust");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("youtube_analysis_rust_"));
        assert!(name.ends_with(".csv"));

        let file = dir.path().join("out.csv");
        assert_eq!(export_path(&file, "rust"), file);
    }
}
