//! One dashboard session: the fetched collection, its summary, and a search
//! generation counter.
//!
//! A search is two steps. The fetch lands first and the dashboard renders
//! immediately; the summary arrives later. Every search bumps the generation
//! and hands out a [`SearchTicket`]; results carrying an older ticket are
//! dropped, so a slow summary never lands on a newer search.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::{FilterCriteria, SortSpec, View, build_view};
use crate::record::MediaRecord;

/// Proof of which search a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchTicket {
    generation: u64,
}

impl SearchTicket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Where the current search stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    #[default]
    Idle,
    Fetching,
    Ready,
    Failed,
}

#[derive(Debug, Default)]
pub struct Session {
    query: String,
    generation: u64,
    state: SearchState,
    records: Vec<MediaRecord>,
    summary: Option<String>,
    error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new search. The previous collection, summary and error are
    /// cleared right away.
    pub fn begin_search(&mut self, query: &str) -> SearchTicket {
        self.generation += 1;
        self.query = query.trim().to_string();
        self.state = SearchState::Fetching;
        self.records.clear();
        self.summary = None;
        self.error = None;
        SearchTicket {
            generation: self.generation,
        }
    }

    /// Install the fetched collection. Returns `false` if a newer search has
    /// started since `ticket` was issued.
    pub fn complete_search(&mut self, ticket: SearchTicket, records: Vec<MediaRecord>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.records = records;
        self.state = SearchState::Ready;
        true
    }

    /// Record a failed fetch. No partial collection is kept.
    pub fn fail_search(&mut self, ticket: SearchTicket, error: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.records.clear();
        self.summary = None;
        self.error = Some(error.into());
        self.state = SearchState::Failed;
        true
    }

    /// Attach the summary for `ticket`'s search. Stale summaries are dropped.
    pub fn apply_summary(&mut self, ticket: SearchTicket, summary: impl Into<String>) -> bool {
        if !self.is_current(ticket) || self.state != SearchState::Ready {
            return false;
        }
        self.summary = Some(summary.into());
        true
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Ticket for the latest search, if it matches `generation`.
    pub fn ticket_for(&self, generation: u64) -> Option<SearchTicket> {
        (generation == self.generation && generation > 0).then_some(SearchTicket { generation })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Derive the dashboard view from the current collection.
    pub fn view(
        &self,
        criteria: &FilterCriteria,
        spec: SortSpec,
        keyword_limit: usize,
        now: DateTime<Utc>,
    ) -> View {
        build_view(
            &self.records,
            criteria,
            spec,
            self.summary.clone(),
            keyword_limit,
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::record::RecordInput;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn records(n: usize) -> Vec<MediaRecord> {
        (0..n)
            .map(|i| {
                MediaRecord::derive(
                    RecordInput {
                        id: format!("v{i}"),
                        view_count: i as u64,
                        ..Default::default()
                    },
                    now(),
                )
            })
            .collect()
    }

    #[test]
    fn search_lifecycle() {
        let mut session = Session::new();
        assert_eq!(session.state(), SearchState::Idle);

        let ticket = session.begin_search("  rust ");
        assert_eq!(session.query(), "rust");
        assert_eq!(session.state(), SearchState::Fetching);

        assert!(session.complete_search(ticket, records(3)));
        assert_eq!(session.records().len(), 3);
        assert!(session.apply_summary(ticket, "trend"));
        assert_eq!(session.summary(), Some("trend"));
    }

    #[test]
    fn stale_summary_is_dropped() {
        let mut session = Session::new();
        let first = session.begin_search("a");
        session.complete_search(first, records(1));

        let second = session.begin_search("b");
        session.complete_search(second, records(2));

        assert!(!session.apply_summary(first, "old"));
        assert_eq!(session.summary(), None);
        assert!(session.apply_summary(second, "new"));
        assert_eq!(session.summary(), Some("new"));
    }

    #[test]
    fn stale_fetch_is_dropped() {
        let mut session = Session::new();
        let first = session.begin_search("a");
        let second = session.begin_search("b");

        assert!(!session.complete_search(first, records(5)));
        assert!(session.records().is_empty());
        assert!(session.complete_search(second, records(1)));
    }

    #[test]
    fn failure_clears_everything() {
        let mut session = Session::new();
        let first = session.begin_search("a");
        session.complete_search(first, records(2));
        session.apply_summary(first, "s");

        let second = session.begin_search("b");
        assert!(session.fail_search(second, "quota exceeded"));
        assert!(session.records().is_empty());
        assert_eq!(session.summary(), None);
        assert_eq!(session.error(), Some("quota exceeded"));
        assert!(!session.apply_summary(second, "late"));
    }

    #[test]
    fn ticket_lookup_by_generation() {
        let mut session = Session::new();
        assert!(session.ticket_for(0).is_none());
        let ticket = session.begin_search("a");
        assert_eq!(session.ticket_for(ticket.generation()), Some(ticket));
        session.begin_search("b");
        assert!(session.ticket_for(ticket.generation()).is_none());
    }

    #[test]
    fn view_carries_summary() {
        let mut session = Session::new();
        let ticket = session.begin_search("a");
        session.complete_search(ticket, records(3));
        session.apply_summary(ticket, "insight");

        let view = session.view(&FilterCriteria::default(), SortSpec::default(), 15, now());
        assert_eq!(view.records.len(), 3);
        assert_eq!(view.records[0].id(), "v2");
        assert_eq!(view.stats.unwrap().ai_analysis.as_deref(), Some("insight"));
    }
}
