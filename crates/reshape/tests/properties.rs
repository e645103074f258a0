use chrono::{DateTime, Duration, TimeZone, Utc};
use core_types::Measurement;
use proptest::prelude::*;
use reshape::pivot;
use std::collections::HashSet;

const METRICS: [&str; 5] = [
    "accel_load_accum",
    "leftMaxForce",
    "rightMaxForce",
    "distance_total",
    "Peak Velocity(m/s)",
];
const REQUESTED: [&str; 3] = ["accel_load_accum", "leftMaxForce", "rightMaxForce"];

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, 16, 12, 0, 0).unwrap()
}

fn measurement() -> impl Strategy<Value = Measurement> {
    (
        0usize..4,
        0usize..METRICS.len(),
        proptest::option::of(-1_000.0f64..1_000.0),
        0i64..4,
        prop_oneof![Just("Mens Basketball"), Just("Women's Basketball")],
    )
        .prop_map(|(entity, metric, value, hour, team)| Measurement {
            entity_id: format!("PLAYER_{entity:03}"),
            group_key: team.to_string(),
            metric: METRICS[metric].to_string(),
            value,
            timestamp: base() + Duration::hours(hour),
        })
}

proptest! {
    #[test]
    fn rows_never_exceed_requested_columns(rows in proptest::collection::vec(measurement(), 0..60)) {
        let table = pivot(&rows, &REQUESTED);
        let mut keys = HashSet::new();
        for row in table.rows() {
            prop_assert!(row.values.len() <= REQUESTED.len());
            prop_assert!(!row.values.is_empty());
            prop_assert!(row.values.keys().all(|k| REQUESTED.contains(&k.as_str())));
            prop_assert!(keys.insert((row.entity_id.clone(), row.timestamp)));
        }
    }

    #[test]
    fn pivot_is_idempotent(rows in proptest::collection::vec(measurement(), 0..60)) {
        let first = pivot(&rows, &REQUESTED);
        let second = pivot(&rows, &REQUESTED);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn cells_are_the_mean_of_their_readings(rows in proptest::collection::vec(measurement(), 1..60)) {
        let table = pivot(&rows, &REQUESTED);
        for row in table.rows() {
            for (metric, cell) in &row.values {
                let readings: Vec<f64> = rows
                    .iter()
                    .filter(|m| m.entity_id == row.entity_id && m.timestamp == row.timestamp && &m.metric == metric)
                    .filter_map(|m| m.value)
                    .collect();
                prop_assert!(!readings.is_empty());
                let mean = readings.iter().sum::<f64>() / readings.len() as f64;
                prop_assert!((mean - cell).abs() < 1e-9);
            }
        }
    }
}
