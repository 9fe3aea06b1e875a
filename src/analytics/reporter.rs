//! History reporter: aggregates the event log for `tubestat history`.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::analytics::events::{Event, EventKind};

// ---------------------------------------------------------------------------
// Aggregated history
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct HistoryStats {
    pub searches: usize,
    pub failed_searches: usize,
    /// Mean fetch latency over successful searches.
    pub avg_search_latency_ms: u64,
    pub summaries: usize,
    pub failed_summaries: usize,
    pub avg_summary_latency_ms: u64,
    /// Most frequent queries, most searched first.
    pub top_queries: Vec<QueryStat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryStat {
    pub query: String,
    pub searches: usize,
    /// Records returned by the latest successful search for this query.
    pub last_records: usize,
}

/// Keep events newer than `days` days. `None` keeps everything.
pub fn since_days(events: Vec<Event>, days: Option<u32>, now: DateTime<Utc>) -> Vec<Event> {
    let Some(days) = days else {
        return events;
    };
    let cutoff = now - Duration::days(i64::from(days));
    events
        .into_iter()
        .filter(|e| e.time().is_some_and(|t| t >= cutoff))
        .collect()
}

pub fn build_history(events: &[Event], top: usize) -> HistoryStats {
    let searches: Vec<&Event> = events.iter().filter(|e| e.kind == EventKind::Search).collect();
    let summaries: Vec<&Event> = events.iter().filter(|e| e.kind == EventKind::Summary).collect();

    HistoryStats {
        searches: searches.len(),
        failed_searches: searches.iter().filter(|e| !e.success).count(),
        avg_search_latency_ms: mean_latency(searches.iter().filter(|e| e.success).copied()),
        summaries: summaries.len(),
        failed_summaries: summaries.iter().filter(|e| !e.success).count(),
        avg_summary_latency_ms: mean_latency(summaries.iter().copied()),
        top_queries: top_queries(&searches, top),
    }
}

fn mean_latency<'a>(events: impl Iterator<Item = &'a Event>) -> u64 {
    let (sum, count) = events.fold((0u64, 0u64), |(s, c), e| (s + e.latency_ms, c + 1));
    if count == 0 { 0 } else { (sum as f64 / count as f64).round() as u64 }
}

/// Group searches by case-folded query. Ties keep first-searched order.
fn top_queries(searches: &[&Event], top: usize) -> Vec<QueryStat> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut stats: Vec<QueryStat> = Vec::new();

    for event in searches {
        let key = event.query.trim().to_lowercase();
        let i = *index.entry(key).or_insert_with(|| {
            stats.push(QueryStat {
                query: event.query.trim().to_string(),
                searches: 0,
                last_records: 0,
            });
            stats.len() - 1
        });
        stats[i].searches += 1;
        if event.success {
            stats[i].last_records = event.records;
        }
    }

    stats.sort_by(|a, b| b.searches.cmp(&a.searches));
    stats.truncate(top);
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
