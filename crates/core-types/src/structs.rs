use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One long-format observation: a single metric reading for one athlete at one time.
///
/// `value` is `None` when the source recorded a missing reading. Zero is a
/// real reading and is kept as `Some(0.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub entity_id: String,
    pub group_key: String,
    pub metric: String,
    pub value: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Measurement {
    /// Builds a measurement, rejecting non-finite values.
    pub fn new(
        entity_id: impl Into<String>,
        group_key: impl Into<String>,
        metric: impl Into<String>,
        value: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(CoreError::InvalidInput(
                    "value".to_string(),
                    format!("{v} is not a finite number"),
                ));
            }
        }
        let entity_id = entity_id.into();
        if entity_id.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "entity_id".to_string(),
                "must not be blank".to_string(),
            ));
        }
        let metric = metric.into();
        if metric.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "metric".to_string(),
                "must not be blank".to_string(),
            ));
        }
        Ok(Self {
            entity_id,
            group_key: group_key.into(),
            metric,
            value,
            timestamp,
        })
    }

    /// The reading, if present and finite.
    pub fn reading(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

/// One wide-format row: every requested metric for an athlete at one timestamp.
///
/// Metrics without a reading at this timestamp are absent from `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideRecord {
    pub entity_id: String,
    pub group_key: String,
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
}

impl WideRecord {
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }

    pub fn has_all<S: AsRef<str>>(&self, metrics: &[S]) -> bool {
        metrics.iter().all(|m| self.values.contains_key(m.as_ref()))
    }
}

/// Per-athlete averages over every timestamp in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity_id: String,
    pub group_key: String,
    /// Most recent timestamp among the readings that were averaged.
    pub latest_timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
    /// Number of readings behind each averaged value.
    pub observations: BTreeMap<String, usize>,
}

impl EntityRecord {
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}

/// Anything that can be bucketed by its group key and asked for a metric value.
///
/// `observe` returns `None` when the observation does not carry the metric at
/// all, and `Some(None)` when it belongs to the metric's population but the
/// reading is missing. The distinction keeps all-null partitions visible as
/// "no data" instead of silently vanishing.
pub trait Observation {
    fn group_key(&self) -> &str;
    fn observe(&self, metric: &str) -> Option<Option<f64>>;
}

impl<T: Observation + ?Sized> Observation for &T {
    fn group_key(&self) -> &str {
        (**self).group_key()
    }

    fn observe(&self, metric: &str) -> Option<Option<f64>> {
        (**self).observe(metric)
    }
}

impl Observation for Measurement {
    fn group_key(&self) -> &str {
        &self.group_key
    }

    fn observe(&self, metric: &str) -> Option<Option<f64>> {
        (self.metric == metric).then(|| self.reading())
    }
}

impl Observation for WideRecord {
    fn group_key(&self) -> &str {
        &self.group_key
    }

    fn observe(&self, metric: &str) -> Option<Option<f64>> {
        Some(self.get(metric))
    }
}

impl Observation for EntityRecord {
    fn group_key(&self) -> &str {
        &self.group_key
    }

    fn observe(&self, metric: &str) -> Option<Option<f64>> {
        Some(self.get(metric))
    }
}
