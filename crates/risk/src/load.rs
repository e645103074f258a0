use crate::outcome::{FlagOutcome, NotEvaluableReason};
use analytics::stats::percent_difference;
use chrono::{DateTime, Utc};
use core_types::{Derived, Partition};
use serde::{Deserialize, Serialize};

/// An athlete's load reading set against the percentile of their partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReading {
    pub value: f64,
    pub partition: Partition,
    pub percentile: f64,
    pub threshold: f64,
    /// How far above (or below) the threshold the reading sits, in percent.
    pub pct_above_threshold: Derived,
    pub timestamp: DateTime<Utc>,
}

/// The load threshold of one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadThreshold {
    pub partition: Partition,
    pub percentile: f64,
    /// Readings the percentile was computed over.
    pub sample_size: usize,
    pub value: Derived,
}

/// Flags the reading when it strictly exceeds the partition threshold.
pub fn evaluate_load(
    value: Option<f64>,
    threshold: &LoadThreshold,
    timestamp: DateTime<Utc>,
) -> FlagOutcome<LoadReading> {
    let Some(value) = value else {
        return FlagOutcome::NotEvaluable(NotEvaluableReason::NoReadings);
    };
    let limit = match threshold.value {
        Ok(limit) => limit,
        Err(reason) => return FlagOutcome::NotEvaluable(NotEvaluableReason::Undefined(reason)),
    };
    let reading = LoadReading {
        value,
        partition: threshold.partition.clone(),
        percentile: threshold.percentile,
        threshold: limit,
        pct_above_threshold: percent_difference(value, limit),
        timestamp,
    };
    FlagOutcome::from_check(value > limit, reading)
}
