/// End-to-end pipeline tests: metrics derivation, filtering, sorting and
/// aggregation over small hand-built collections.
use chrono::{DateTime, Duration, TimeZone, Utc};

use tubestat::metrics::{self, InfluenceTier};
use tubestat::pipeline::{
    self, DateRange, FilterCriteria, SortField, SortOrder, SortSpec, VideoType,
};
use tubestat::record::{MediaRecord, RecordInput};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn record(id: &str, duration: &str, age: Duration, views: u64, subs: u64) -> MediaRecord {
    MediaRecord::derive(
        RecordInput {
            id: id.to_string(),
            title: format!("video {id}"),
            duration: duration.to_string(),
            published_at: (now() - age).to_rfc3339(),
            view_count: views,
            subscriber_count: subs,
            channel_title: "channel".to_string(),
            ..Default::default()
        },
        now(),
    )
}

/// 90s short, 10min mid, 30min long; all two days old, 100 subscribers.
fn collection() -> Vec<MediaRecord> {
    vec![
        record("a", "PT1M30S", Duration::days(2), 10, 100),
        record("b", "PT10M", Duration::days(2), 300, 100),
        record("c", "PT30M", Duration::days(2), 20, 100),
    ]
}

fn ids(records: &[MediaRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id()).collect()
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[test]
fn derived_metrics_on_the_fixture() {
    let records = collection();
    assert_eq!(records[0].duration_sec(), 90);
    assert_eq!(records[1].duration_sec(), 600);
    assert_eq!(records[2].duration_sec(), 1800);

    // 48 hours old: 300 / 48 = 6.25
    assert_eq!(records[1].vph(), 6);
    assert_eq!(records[0].vph(), 0);

    assert_eq!(records[0].influence_tier(), InfluenceTier::Low);
    assert_eq!(records[1].influence_tier(), InfluenceTier::VeryHigh);
    // 0.2 sits on the boundary and falls to the lower tier
    assert_eq!(records[2].influence_tier(), InfluenceTier::Low);
}

#[test]
fn tier_boundaries_are_strict() {
    assert_eq!(InfluenceTier::from_ratio(1.01), InfluenceTier::VeryHigh);
    assert_eq!(InfluenceTier::from_ratio(1.0), InfluenceTier::High);
    assert_eq!(InfluenceTier::from_ratio(0.5), InfluenceTier::Normal);
    assert_eq!(InfluenceTier::from_ratio(0.2), InfluenceTier::Low);
    assert_eq!(InfluenceTier::from_ratio(0.05), InfluenceTier::VeryLow);
    assert_eq!(InfluenceTier::from_ratio(0.0), InfluenceTier::VeryLow);
}

#[test]
fn velocity_floors_age_at_one_hour() {
    let fresh = now() - Duration::minutes(10);
    assert_eq!(metrics::hours_since_upload(Some(fresh), now()), 1.0);
    assert_eq!(metrics::hours_since_upload(None, now()), 1.0);

    let r = record("fresh", "PT1M", Duration::minutes(10), 500, 0);
    assert_eq!(r.vph(), 500);
    assert_eq!(r.performance_ratio(), 0.0);
    assert_eq!(r.influence_tier(), InfluenceTier::VeryLow);
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[test]
fn type_filter_excludes_mid_length_from_both_selectors() {
    let records = collection();
    let only = |video_type| {
        let criteria = FilterCriteria {
            video_type,
            ..Default::default()
        };
        ids(&pipeline::filter(&records, &criteria, now()))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    assert_eq!(only(VideoType::Short), vec!["a"]);
    assert_eq!(only(VideoType::Long), vec!["c"]);
    assert_eq!(only(VideoType::All), vec!["a", "b", "c"]);
}

#[test]
fn filters_compose_with_and() {
    let records = collection();

    let long_low = FilterCriteria {
        video_type: VideoType::Long,
        influence: vec![InfluenceTier::Low],
        ..Default::default()
    };
    assert_eq!(ids(&pipeline::filter(&records, &long_low, now())), vec!["c"]);

    let short_very_high = FilterCriteria {
        video_type: VideoType::Short,
        influence: vec![InfluenceTier::VeryHigh],
        ..Default::default()
    };
    assert!(pipeline::filter(&records, &short_very_high, now()).is_empty());
}

/// Mixed durations, ages and tiers so every filter family removes something.
fn varied() -> Vec<MediaRecord> {
    vec![
        record("s-new-hot", "PT45S", Duration::days(1), 5000, 1000),
        record("s-old-low", "PT2M", Duration::days(40), 100, 1000),
        record("m-new-low", "PT8M", Duration::days(3), 80, 1000),
        record("m-old-hot", "PT12M", Duration::days(20), 900, 300),
        record("l-new-normal", "PT25M", Duration::days(6), 300, 1000),
        record("l-old-hot", "PT1H", Duration::days(60), 8000, 1000),
        record("l-new-zero", "PT40M", Duration::hours(2), 50, 0),
    ]
}

#[test]
fn sequential_filters_equal_the_combined_filter() {
    let records = varied();
    let type_only = FilterCriteria {
        video_type: VideoType::Long,
        ..Default::default()
    };
    let date_only = FilterCriteria {
        date_range: DateRange::Last7Days,
        ..Default::default()
    };
    let influence_only = FilterCriteria {
        influence: vec![InfluenceTier::VeryHigh, InfluenceTier::Normal],
        ..Default::default()
    };

    let pairs = [
        (&type_only, &date_only),
        (&type_only, &influence_only),
        (&date_only, &influence_only),
    ];
    for (first, second) in pairs {
        let combined = FilterCriteria {
            video_type: if first.video_type != VideoType::All {
                first.video_type
            } else {
                second.video_type
            },
            date_range: if first.date_range != DateRange::All {
                first.date_range
            } else {
                second.date_range
            },
            influence: if first.influence.is_empty() {
                second.influence.clone()
            } else {
                first.influence.clone()
            },
        };

        let chained = pipeline::filter(&pipeline::filter(&records, first, now()), second, now());
        let reversed = pipeline::filter(&pipeline::filter(&records, second, now()), first, now());
        let direct = pipeline::filter(&records, &combined, now());

        assert_eq!(chained, direct, "{first:?} then {second:?}");
        assert_eq!(reversed, direct, "{second:?} then {first:?}");
    }

    // Each family actually narrows the fixture.
    for criteria in [&type_only, &date_only, &influence_only] {
        let kept = pipeline::filter(&records, criteria, now()).len();
        assert!(kept > 0 && kept < records.len(), "{criteria:?}");
    }
}

#[test]
fn partition_sums_to_view_size_under_any_filter() {
    let records = varied();
    let settings = [
        FilterCriteria::default(),
        FilterCriteria {
            video_type: VideoType::Short,
            ..Default::default()
        },
        FilterCriteria {
            video_type: VideoType::Long,
            date_range: DateRange::Last30Days,
            ..Default::default()
        },
        FilterCriteria {
            influence: vec![InfluenceTier::Low, InfluenceTier::VeryLow],
            ..Default::default()
        },
        FilterCriteria {
            date_range: DateRange::Last7Days,
            ..Default::default()
        },
    ];

    for criteria in &settings {
        let view = pipeline::filter(&records, criteria, now());
        let Some(stats) = pipeline::aggregate(&view, None) else {
            assert!(view.is_empty());
            continue;
        };
        assert_eq!(stats.type_ratio.total(), view.len(), "{criteria:?}");
    }

    let all = pipeline::aggregate(&records, None).unwrap().type_ratio;
    assert_eq!((all.shorts, all.mid, all.long), (2, 2, 3));
}

#[test]
fn relative_date_window_drops_older_videos() {
    let mut records = collection();
    records.push(record("old", "PT5M", Duration::days(10), 1000, 100));

    let week = FilterCriteria {
        date_range: DateRange::Last7Days,
        ..Default::default()
    };
    assert_eq!(
        ids(&pipeline::filter(&records, &week, now())),
        vec!["a", "b", "c"]
    );

    let month = FilterCriteria {
        date_range: DateRange::Last30Days,
        ..Default::default()
    };
    assert_eq!(pipeline::filter(&records, &month, now()).len(), 4);
}

#[test]
fn custom_range_needs_both_bounds() {
    let mut records = collection();
    records.push(record("old", "PT5M", Duration::days(10), 1000, 100));

    let both = FilterCriteria::parse(None, Some("custom"), Some("2025-05-20"), Some("2025-05-25"), &[])
        .unwrap();
    assert_eq!(ids(&pipeline::filter(&records, &both, now())), vec!["old"]);

    let one = FilterCriteria::parse(None, Some("custom"), Some("2025-05-20"), None, &[]).unwrap();
    assert_eq!(pipeline::filter(&records, &one, now()).len(), 4);
}

#[test]
fn filtering_does_not_touch_the_input() {
    let records = collection();
    let before = records.clone();
    let criteria = FilterCriteria {
        video_type: VideoType::Long,
        ..Default::default()
    };
    let _ = pipeline::filter(&records, &criteria, now());
    assert_eq!(records, before);
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

#[test]
fn asc_then_desc_then_asc_is_stable() {
    let records = collection();
    let asc = SortSpec::new(SortField::ViewCount, SortOrder::Asc);
    let desc = asc.clicked(SortField::ViewCount);
    assert_eq!(desc.order, SortOrder::Desc);

    let first = pipeline::sort(&records, asc);
    let second = pipeline::sort(&pipeline::sort(&first, desc), desc.clicked(SortField::ViewCount));

    assert_eq!(ids(&first), vec!["a", "c", "b"]);
    assert_eq!(ids(&first), ids(&second));
}

#[test]
fn new_column_starts_descending() {
    let spec = SortSpec::new(SortField::ViewCount, SortOrder::Asc).clicked(SortField::Vph);
    assert_eq!(spec, SortSpec::new(SortField::Vph, SortOrder::Desc));
}

#[test]
fn equal_keys_keep_input_order() {
    let records = vec![
        record("x", "PT1M", Duration::days(1), 50, 100),
        record("y", "PT1M", Duration::days(1), 50, 100),
        record("z", "PT1M", Duration::days(1), 50, 100),
    ];
    for order in [SortOrder::Asc, SortOrder::Desc] {
        let sorted = pipeline::sort(&records, SortSpec::new(SortField::ViewCount, order));
        assert_eq!(ids(&sorted), vec!["x", "y", "z"]);
    }
}

// ---------------------------------------------------------------------------
// Aggregate + full view
// ---------------------------------------------------------------------------

#[test]
fn empty_view_has_no_stats() {
    assert!(pipeline::aggregate(&[], None).is_none());

    let criteria = FilterCriteria {
        influence: vec![InfluenceTier::High],
        ..Default::default()
    };
    let view = pipeline::build_view(&collection(), &criteria, SortSpec::default(), None, 10, now());
    assert!(view.records.is_empty());
    assert!(view.stats.is_none());
    assert!(view.keywords.is_empty());
}

#[test]
fn partition_covers_every_record() {
    let stats = pipeline::aggregate(&collection(), None).unwrap();
    let ratio = stats.type_ratio;
    assert_eq!((ratio.shorts, ratio.mid, ratio.long), (1, 1, 1));
    assert_eq!(ratio.total(), 3);
}

#[test]
fn full_view_over_all_and_long() {
    let records = collection();

    let all = pipeline::build_view(
        &records,
        &FilterCriteria::default(),
        SortSpec::default(),
        Some("trend".to_string()),
        10,
        now(),
    );
    assert_eq!(ids(&all.records), vec!["b", "c", "a"]);
    let stats = all.stats.unwrap();
    assert_eq!(stats.avg_views, 110);
    assert_eq!(stats.avg_vph, 2);
    assert!((stats.avg_performance_ratio - 1.1).abs() < 1e-9);
    assert_eq!(stats.ai_analysis.as_deref(), Some("trend"));

    let long = FilterCriteria {
        video_type: VideoType::Long,
        ..Default::default()
    };
    let view = pipeline::build_view(&records, &long, SortSpec::default(), None, 10, now());
    assert_eq!(ids(&view.records), vec!["c"]);
    let stats = view.stats.unwrap();
    assert_eq!(stats.avg_views, 20);
    assert_eq!(stats.type_ratio.long, 1);
    assert_eq!(stats.type_ratio.total(), 1);
}
