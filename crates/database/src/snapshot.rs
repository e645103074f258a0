use core_types::Measurement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why an input row was left out of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    BlankEntity,
    BlankMetric,
    InvalidValue,
    NonFiniteValue,
    InvalidTimestamp,
    /// The record itself could not be decoded.
    Malformed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DropReason::BlankEntity => "blank athlete id",
            DropReason::BlankMetric => "blank metric name",
            DropReason::InvalidValue => "non-numeric value",
            DropReason::NonFiniteValue => "non-finite value",
            DropReason::InvalidTimestamp => "unparseable timestamp",
            DropReason::Malformed => "malformed record",
        };
        f.write_str(label)
    }
}

/// What happened to the rows of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub loaded: usize,
    /// Rows kept with a null value.
    pub null_values: usize,
    pub dropped: BTreeMap<DropReason, usize>,
}

impl LoadSummary {
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    pub(crate) fn record(&mut self, outcome: &Result<Measurement, DropReason>) {
        self.rows_read += 1;
        match outcome {
            Ok(m) => {
                self.loaded += 1;
                if m.value.is_none() {
                    self.null_values += 1;
                }
            }
            Err(reason) => *self.dropped.entry(*reason).or_default() += 1,
        }
    }

    pub(crate) fn log(&self, source: &str) {
        tracing::info!(
            source,
            rows = self.rows_read,
            loaded = self.loaded,
            nulls = self.null_values,
            "Loaded measurement snapshot."
        );
        for (reason, count) in &self.dropped {
            tracing::warn!(source, %reason, count, "Dropped malformed rows.");
        }
    }
}

/// The in-memory measurement table an analysis runs over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub measurements: Vec<Measurement>,
    pub summary: LoadSummary,
}

impl Snapshot {
    pub(crate) fn push(&mut self, outcome: Result<Measurement, DropReason>) {
        self.summary.record(&outcome);
        if let Ok(m) = outcome {
            self.measurements.push(m);
        }
    }
}

/// Parses a value cell. Empty, `NULL` and `NA` mean a missing reading.
pub fn parse_value(text: &str) -> Result<Option<f64>, DropReason> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("null") || text.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    let value: f64 = text.parse().map_err(|_| DropReason::InvalidValue)?;
    finite(Some(value))
}

pub(crate) fn finite(value: Option<f64>) -> Result<Option<f64>, DropReason> {
    match value {
        Some(v) if !v.is_finite() => Err(DropReason::NonFiniteValue),
        other => Ok(other),
    }
}

/// Builds a measurement from already-typed fields, classifying what is wrong with it.
pub(crate) fn build(
    entity_id: &str,
    group_key: &str,
    metric: &str,
    value: Option<f64>,
    timestamp: Option<DateTime<Utc>>,
) -> Result<Measurement, DropReason> {
    let entity_id = entity_id.trim();
    if entity_id.is_empty() {
        return Err(DropReason::BlankEntity);
    }
    let metric = metric.trim();
    if metric.is_empty() {
        return Err(DropReason::BlankMetric);
    }
    let value = finite(value)?;
    let timestamp = timestamp.ok_or(DropReason::InvalidTimestamp)?;
    Measurement::new(entity_id, group_key.trim(), metric, value, timestamp)
        .map_err(|_| DropReason::Malformed)
}
