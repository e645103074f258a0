use crate::stats::SampleStats;
use chrono::{DateTime, Utc};
use core_types::{Derived, Partition};
use serde::{Deserialize, Serialize};

/// Summary of one metric within one partition.
///
/// Recomputed per run from the snapshot, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStat {
    pub partition: Partition,
    pub metric: String,
    /// Non-null readings behind the statistics.
    pub count: usize,
    /// Null readings seen for this metric in the partition.
    pub nulls: usize,
    pub mean: Derived,
    pub std_dev: Derived,
    /// The fraction `percentile_value` was computed at.
    pub percentile: f64,
    pub percentile_value: Derived,
}

impl GroupStat {
    pub fn sample(&self) -> SampleStats {
        SampleStats {
            count: self.count,
            mean: self.mean,
            std_dev: self.std_dev,
        }
    }

    pub fn z_score(&self, value: f64) -> Derived {
        self.sample().z_score(value)
    }
}

/// One reading placed against its partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeMeasurement {
    pub entity_id: String,
    pub group_key: String,
    pub partition: Partition,
    pub metric: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub group_mean: Derived,
    pub pct_diff_from_group: Derived,
    pub z_score: Derived,
}

/// Spread of the defined percent differences for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PctDiffSummary {
    pub metric: String,
    pub count: usize,
    /// Readings whose percent difference was undefined.
    pub undefined: usize,
    pub min: Derived,
    pub max: Derived,
    pub mean: Derived,
    pub std_dev: Derived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyMean {
    pub year: i32,
    pub metric: String,
    pub count: usize,
    pub mean: Derived,
}
