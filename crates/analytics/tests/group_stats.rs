use analytics::stats::{percentile, percentile_sorted};
use analytics::AggregationEngine;
use chrono::{TimeZone, Utc};
use core_types::{Measurement, Partition, PartitionKey, WideRecord};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn wide(entity: &str, team: &str, load: Option<f64>) -> WideRecord {
    WideRecord {
        entity_id: entity.to_string(),
        group_key: team.to_string(),
        timestamp: Utc.with_ymd_and_hms(2023, 11, 2, 18, 0, 0).unwrap(),
        values: load
            .map(|v| BTreeMap::from([("accel_load_accum".to_string(), v)]))
            .unwrap_or_default(),
    }
}

#[test]
fn wide_rows_and_long_rows_agree() {
    let ts = Utc.with_ymd_and_hms(2023, 11, 2, 18, 0, 0).unwrap();
    let long = vec![
        Measurement::new("P1", "Womens Basketball", "accel_load_accum", Some(10.0), ts).unwrap(),
        Measurement::new("P2", "Womens Basketball", "accel_load_accum", Some(30.0), ts).unwrap(),
    ];
    let rows = vec![
        wide("P1", "Womens Basketball", Some(10.0)),
        wide("P2", "Womens Basketball", Some(30.0)),
    ];
    let engine = AggregationEngine::default();
    let from_long = engine
        .group_stats(&long, PartitionKey::Gender, "accel_load_accum", 0.9)
        .unwrap();
    let from_wide = engine
        .group_stats(&rows, PartitionKey::Gender, "accel_load_accum", 0.9)
        .unwrap();
    assert_eq!(from_long, from_wide);

    let borrowed: Vec<&WideRecord> = rows.iter().collect();
    let from_refs = engine
        .group_stats(&borrowed, PartitionKey::Gender, "accel_load_accum", 0.9)
        .unwrap();
    assert_eq!(from_refs, from_wide);

    let female = &from_wide[&Partition::new("Female")];
    assert_eq!(female.mean, Ok(20.0));
    assert_eq!(female.percentile_value, Ok(28.0));
}

#[test]
fn wide_rows_missing_the_metric_count_as_null() {
    let rows = vec![wide("P1", "Mens Basketball", None)];
    let stats = AggregationEngine::default()
        .group_stats(&rows, PartitionKey::Team, "accel_load_accum", 0.5)
        .unwrap();
    let team = &stats[&Partition::new("Mens Basketball")];
    assert_eq!((team.count, team.nulls), (0, 1));
}

proptest! {
    #[test]
    fn median_of_odd_sample_is_middle_element(
        mut values in proptest::collection::vec(-1.0e6f64..1.0e6, 0..40).prop_map(|mut v| {
            if v.len() % 2 == 0 {
                v.push(0.0);
            }
            v
        })
    ) {
        let median = percentile(&values, 0.5).unwrap();
        values.sort_by(f64::total_cmp);
        prop_assert_eq!(median, values[values.len() / 2]);
    }

    #[test]
    fn percentile_stays_within_sample_range(
        values in proptest::collection::vec(-1.0e6f64..1.0e6, 1..40),
        p in 0.0f64..=1.0,
    ) {
        let mut sorted = values.clone();
        sorted.sort_by(f64::total_cmp);
        let value = percentile_sorted(&sorted, p).unwrap();
        prop_assert!(value >= sorted[0] - 1e-6);
        prop_assert!(value <= sorted[sorted.len() - 1] + 1e-6);
    }
}
