/// Search lifecycle tests: generation tickets, stale results and the
/// summary hand-off into the dashboard view.
use chrono::{DateTime, TimeZone, Utc};

use tubestat::export;
use tubestat::pipeline::{FilterCriteria, SortSpec};
use tubestat::record::{MediaRecord, RecordInput};
use tubestat::session::{SearchState, Session};
use tubestat::summarizer::{self, Summarizer};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn record(id: &str, title: &str, views: u64) -> MediaRecord {
    MediaRecord::derive(
        RecordInput {
            id: id.to_string(),
            title: title.to_string(),
            channel_title: "Chan, Inc".to_string(),
            published_at: "2025-05-30T12:00:00Z".to_string(),
            duration: "PT2M".to_string(),
            view_count: views,
            subscriber_count: 100,
            tags: vec!["rust".to_string(), "cli".to_string()],
            ..Default::default()
        },
        now(),
    )
}

#[test]
fn late_results_from_a_superseded_search_are_dropped() {
    let mut session = Session::new();
    let first = session.begin_search("rust");
    let second = session.begin_search("go");

    assert!(!session.complete_search(first, vec![record("r", "rust", 1)]));
    assert_eq!(session.state(), SearchState::Fetching);
    assert!(session.records().is_empty());

    assert!(session.complete_search(second, vec![record("g", "go", 2)]));
    assert_eq!(session.query(), "go");
    assert_eq!(session.records()[0].id(), "g");
}

#[test]
fn stale_summary_never_lands_on_a_newer_search() {
    let mut session = Session::new();
    let first = session.begin_search("rust");
    session.complete_search(first, vec![record("r", "rust", 1)]);

    let second = session.begin_search("go");
    session.complete_search(second, vec![record("g", "go", 2)]);

    assert!(!session.apply_summary(first, "about rust"));
    assert!(session.summary().is_none());
    assert!(session.ticket_for(first.generation()).is_none());

    assert!(session.apply_summary(second, "about go"));
    let view = session.view(&FilterCriteria::default(), SortSpec::default(), 5, now());
    assert_eq!(
        view.stats.and_then(|s| s.ai_analysis).as_deref(),
        Some("about go")
    );
}

#[test]
fn failure_clears_the_previous_collection() {
    let mut session = Session::new();
    let ok = session.begin_search("rust");
    session.complete_search(ok, vec![record("r", "rust", 1)]);

    let failing = session.begin_search("rust again");
    assert!(session.fail_search(failing, "quota exceeded"));
    assert_eq!(session.state(), SearchState::Failed);
    assert_eq!(session.error(), Some("quota exceeded"));
    assert!(session.records().is_empty());

    let view = session.view(&FilterCriteria::default(), SortSpec::default(), 5, now());
    assert!(view.stats.is_none());
}

#[test]
fn disabled_summarizer_yields_fixed_text() {
    let summary = Summarizer::disabled().summarize(&[record("r", "rust", 1)]);
    assert_eq!(summary.text, summarizer::DISABLED);
}

#[test]
fn exported_view_follows_the_sort_and_strips_commas() {
    let mut session = Session::new();
    let ticket = session.begin_search("rust");
    session.complete_search(
        ticket,
        vec![record("a", "small, video", 10), record("b", "big video", 500)],
    );

    let view = session.view(&FilterCriteria::default(), SortSpec::default(), 0, now());
    let csv = export::to_csv(&view.records).unwrap();
    assert!(csv.starts_with(export::BOM));

    let lines: Vec<&str> = csv.trim_start_matches(export::BOM).lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], export::HEADER.join(","));
    assert!(lines[1].starts_with("big video,Chan  Inc,500,"));
    assert!(lines[2].starts_with("small  video,Chan  Inc,10,"));
    assert!(lines[1].ends_with(",rust;cli"));
}
