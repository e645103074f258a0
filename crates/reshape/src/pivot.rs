use crate::table::WideTable;
use chrono::{DateTime, Utc};
use core_types::{EntityRecord, Measurement, WideRecord};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone, Copy)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        self.sum / self.count as f64
    }
}

struct Cell<'a> {
    group_key: &'a str,
    metrics: BTreeMap<&'a str, RunningMean>,
}

/// Requested metric names without duplicates, in request order.
fn columns<S: AsRef<str>>(metrics: &[S]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let metric = metric.as_ref();
        if !columns.iter().any(|c| c == metric) {
            columns.push(metric.to_string());
        }
    }
    columns
}

/// Pivots long-format measurements into one row per (athlete, timestamp).
///
/// Only the requested metrics are kept and null readings are skipped. When
/// the same athlete has several readings of one metric at the same timestamp
/// the cell holds their arithmetic mean; this is the collision policy, not
/// first-wins or last-wins. If an athlete's readings at one timestamp carry
/// different group keys, the lexicographically smallest is kept.
pub fn pivot<S: AsRef<str>>(measurements: &[Measurement], metrics: &[S]) -> WideTable {
    pivot_rows(measurements.iter(), metrics)
}

/// The wide view of a single athlete.
pub fn pivot_entity<S: AsRef<str>>(
    measurements: &[Measurement],
    entity_id: &str,
    metrics: &[S],
) -> WideTable {
    pivot_rows(
        measurements.iter().filter(|m| m.entity_id == entity_id),
        metrics,
    )
}

fn pivot_rows<'a, I, S>(measurements: I, metrics: &[S]) -> WideTable
where
    I: Iterator<Item = &'a Measurement>,
    S: AsRef<str>,
{
    let columns = columns(metrics);
    let wanted: BTreeSet<&str> = columns.iter().map(String::as_str).collect();

    let mut cells: BTreeMap<(&'a str, DateTime<Utc>), Cell<'a>> = BTreeMap::new();
    let mut collisions = 0usize;

    for m in measurements {
        if !wanted.contains(m.metric.as_str()) {
            continue;
        }
        let Some(value) = m.reading() else {
            continue;
        };
        let cell = cells
            .entry((m.entity_id.as_str(), m.timestamp))
            .or_insert_with(|| Cell {
                group_key: m.group_key.as_str(),
                metrics: BTreeMap::new(),
            });
        if m.group_key.as_str() < cell.group_key {
            cell.group_key = m.group_key.as_str();
        }
        let mean = cell.metrics.entry(m.metric.as_str()).or_default();
        if mean.count > 0 {
            collisions += 1;
        }
        mean.push(value);
    }

    if collisions > 0 {
        tracing::debug!(collisions, "Averaged readings sharing athlete, metric and timestamp");
    }

    let rows = cells
        .into_iter()
        .map(|((entity_id, timestamp), cell)| WideRecord {
            entity_id: entity_id.to_string(),
            group_key: cell.group_key.to_string(),
            timestamp,
            values: cell
                .metrics
                .into_iter()
                .map(|(metric, mean)| (metric.to_string(), mean.value()))
                .collect(),
        })
        .collect();

    WideTable::new(columns, rows)
}

/// Averages each athlete's readings over every timestamp.
///
/// Athletes without a single non-null reading of a requested metric are left out.
pub fn aggregate_by_entity<S: AsRef<str>>(
    measurements: &[Measurement],
    metrics: &[S],
) -> Vec<EntityRecord> {
    struct Entity<'a> {
        group_key: &'a str,
        latest: DateTime<Utc>,
        metrics: BTreeMap<&'a str, RunningMean>,
    }

    let columns = columns(metrics);
    let wanted: BTreeSet<&str> = columns.iter().map(String::as_str).collect();
    let mut entities: BTreeMap<&str, Entity<'_>> = BTreeMap::new();

    for m in measurements {
        if !wanted.contains(m.metric.as_str()) {
            continue;
        }
        let Some(value) = m.reading() else {
            continue;
        };
        let entity = entities
            .entry(m.entity_id.as_str())
            .or_insert_with(|| Entity {
                group_key: m.group_key.as_str(),
                latest: m.timestamp,
                metrics: BTreeMap::new(),
            });
        if m.group_key.as_str() < entity.group_key {
            entity.group_key = m.group_key.as_str();
        }
        entity.latest = entity.latest.max(m.timestamp);
        entity.metrics.entry(m.metric.as_str()).or_default().push(value);
    }

    entities
        .into_iter()
        .map(|(entity_id, entity)| EntityRecord {
            entity_id: entity_id.to_string(),
            group_key: entity.group_key.to_string(),
            latest_timestamp: entity.latest,
            values: entity
                .metrics
                .iter()
                .map(|(metric, mean)| (metric.to_string(), mean.value()))
                .collect(),
            observations: entity
                .metrics
                .iter()
                .map(|(metric, mean)| (metric.to_string(), mean.count))
                .collect(),
        })
        .collect()
}

/// Each athlete's most recent row that carries every `required` metric.
///
/// Athletes with no such row are absent. Output is ordered by athlete.
pub fn latest_per_entity<'t, S: AsRef<str>>(
    table: &'t WideTable,
    required: &[S],
) -> Vec<&'t WideRecord> {
    let mut latest: BTreeMap<&str, &WideRecord> = BTreeMap::new();
    for row in table.rows() {
        if !row.has_all(required) {
            continue;
        }
        match latest.get(row.entity_id.as_str()) {
            Some(current) if current.timestamp >= row.timestamp => {}
            _ => {
                latest.insert(row.entity_id.as_str(), row);
            }
        }
    }
    latest.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, day, 17, 55, 56).unwrap()
    }

    fn m(entity: &str, metric: &str, value: Option<f64>, day: u32) -> Measurement {
        Measurement::new(entity, "Mens Basketball", metric, value, at(day)).unwrap()
    }

    #[test]
    fn duplicate_readings_are_averaged() {
        let rows = vec![
            m("P5", "leftMaxForce", Some(450.0), 1),
            m("P5", "leftMaxForce", Some(475.0), 1),
            m("P5", "rightMaxForce", Some(375.75), 1),
        ];
        let table = pivot(&rows, &["leftMaxForce", "rightMaxForce"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("leftMaxForce"), Some(462.5));
        assert_eq!(table.rows()[0].get("rightMaxForce"), Some(375.75));
    }

    #[test]
    fn nulls_are_skipped_but_zero_is_kept() {
        let rows = vec![
            m("P14", "accel_load_accum", None, 2),
            m("P14", "accel_load_accum", Some(0.0), 3),
        ];
        let table = pivot(&rows, &["accel_load_accum"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].timestamp, at(3));
        assert_eq!(table.rows()[0].get("accel_load_accum"), Some(0.0));
    }

    #[test]
    fn absent_metrics_are_missing_not_zero() {
        let rows = vec![
            m("P14", "accel_load_accum", Some(607.07), 1),
            m("P14", "leftMaxForce", Some(400.0), 2),
        ];
        let table = pivot(&rows, &["accel_load_accum", "leftMaxForce", "rightMaxForce"]);
        assert_eq!(table.columns(), ["accel_load_accum", "leftMaxForce", "rightMaxForce"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get("leftMaxForce"), None);
        assert_eq!(table.rows()[1].get("accel_load_accum"), None);
        assert_eq!(table.rows()[1].get("rightMaxForce"), None);
    }

    #[test]
    fn unrequested_metrics_are_ignored() {
        let rows = vec![
            m("P1", "Peak Velocity(m/s)", Some(3.1), 1),
            m("P1", "distance_total", Some(5100.0), 1),
        ];
        let table = pivot(&rows, &["distance_total"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].values.len(), 1);

        let none = pivot(&rows, &["leftMaxForce"]);
        assert!(none.is_empty());
    }

    #[test]
    fn rows_are_ordered_by_athlete_then_time() {
        let rows = vec![
            m("P2", "distance_total", Some(1.0), 3),
            m("P1", "distance_total", Some(2.0), 5),
            m("P1", "distance_total", Some(3.0), 1),
        ];
        let table = pivot(&rows, &["distance_total"]);
        let keys: Vec<(&str, DateTime<Utc>)> = table
            .rows()
            .iter()
            .map(|r| (r.entity_id.as_str(), r.timestamp))
            .collect();
        assert_eq!(keys, vec![("P1", at(1)), ("P1", at(5)), ("P2", at(3))]);
        assert_eq!(table.entities().len(), 2);
        assert_eq!(table.for_entity("P1").count(), 2);
    }

    #[test]
    fn single_athlete_view() {
        let rows = vec![
            m("P5", "leftMaxForce", Some(351.0), 1),
            m("P15", "leftMaxForce", Some(467.75), 1),
        ];
        let table = pivot_entity(&rows, "P5", &["leftMaxForce"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].entity_id, "P5");
    }

    #[test]
    fn latest_row_with_both_sides() {
        let rows = vec![
            m("P5", "leftMaxForce", Some(351.0), 1),
            m("P5", "rightMaxForce", Some(312.75), 1),
            m("P5", "leftMaxForce", Some(462.5), 2),
            m("P5", "rightMaxForce", Some(375.75), 2),
            m("P5", "leftMaxForce", Some(480.0), 3),
        ];
        let table = pivot(&rows, &["leftMaxForce", "rightMaxForce"]);
        let latest = latest_per_entity(&table, &["leftMaxForce", "rightMaxForce"]);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].timestamp, at(2));

        let any = latest_per_entity(&table, &["leftMaxForce"]);
        assert_eq!(any[0].timestamp, at(3));
    }

    #[test]
    fn entity_averages() {
        let rows = vec![
            m("P15", "leftMaxForce", Some(467.75), 1),
            m("P15", "leftMaxForce", Some(394.5), 2),
            m("P15", "leftMaxForce", None, 4),
            m("P15", "rightMaxForce", Some(442.0), 1),
            m("P9", "rightMaxForce", None, 1),
        ];
        let records = aggregate_by_entity(&rows, &["leftMaxForce", "rightMaxForce"]);
        assert_eq!(records.len(), 1);
        let p15 = &records[0];
        assert_eq!(p15.get("leftMaxForce"), Some((467.75 + 394.5) / 2.0));
        assert_eq!(p15.observations["leftMaxForce"], 2);
        assert_eq!(p15.get("rightMaxForce"), Some(442.0));
        assert_eq!(p15.latest_timestamp, at(2));
    }
}
