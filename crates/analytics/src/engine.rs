use crate::error::AnalyticsError;
use crate::report::{GroupStat, PctDiffSummary, RelativeMeasurement};
use crate::stats::{self, SampleStats};
use core_types::{Measurement, Observation, Partition, PartitionKey, TeamDirectory};
use std::collections::BTreeMap;

/// Readings of one metric collected for one partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionSample {
    pub values: Vec<f64>,
    pub nulls: usize,
}

/// A stateless calculator for partition-relative statistics.
///
/// The only thing it holds is the team directory used to turn free-text
/// group keys into gender and sport partitions.
#[derive(Debug, Clone, Default)]
pub struct AggregationEngine {
    directory: TeamDirectory,
}

impl AggregationEngine {
    pub fn new(directory: TeamDirectory) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &TeamDirectory {
        &self.directory
    }

    pub fn partition_of(&self, key: PartitionKey, group_key: &str) -> Partition {
        self.directory.partition(key, group_key)
    }

    /// Buckets the readings of `metric` by partition.
    ///
    /// A partition whose readings are all null still gets an (empty) entry so
    /// that it surfaces as "no data" downstream.
    pub fn partition_values<T: Observation>(
        &self,
        observations: &[T],
        key: PartitionKey,
        metric: &str,
    ) -> BTreeMap<Partition, PartitionSample> {
        let mut partitions: BTreeMap<Partition, PartitionSample> = BTreeMap::new();
        for observation in observations {
            let Some(reading) = observation.observe(metric) else {
                continue;
            };
            let sample = partitions
                .entry(self.partition_of(key, observation.group_key()))
                .or_default();
            match reading {
                Some(value) => sample.values.push(value),
                None => sample.nulls += 1,
            }
        }
        partitions
    }

    /// Count, mean, sample standard deviation and the `p`-th percentile of
    /// `metric` in every partition under `key`.
    pub fn group_stats<T: Observation>(
        &self,
        observations: &[T],
        key: PartitionKey,
        metric: &str,
        p: f64,
    ) -> Result<BTreeMap<Partition, GroupStat>, AnalyticsError> {
        validate_percentile(p)?;
        let stats = self
            .partition_values(observations, key, metric)
            .into_iter()
            .map(|(partition, sample)| {
                let stat = group_stat(partition.clone(), metric, &sample, p);
                (partition, stat)
            })
            .collect();
        Ok(stats)
    }

    /// [`Self::group_stats`] for several metrics, ordered by partition and
    /// then by metric in request order.
    pub fn group_stats_all<T: Observation, S: AsRef<str>>(
        &self,
        observations: &[T],
        key: PartitionKey,
        metrics: &[S],
        p: f64,
    ) -> Result<Vec<GroupStat>, AnalyticsError> {
        validate_percentile(p)?;
        let mut rows: BTreeMap<(Partition, usize), GroupStat> = BTreeMap::new();
        for (position, metric) in metrics.iter().enumerate() {
            for (partition, stat) in self.group_stats(observations, key, metric.as_ref(), p)? {
                rows.insert((partition, position), stat);
            }
        }
        Ok(rows.into_values().collect())
    }

    /// Places every non-null reading of the requested metrics against the
    /// mean and spread of its own partition.
    ///
    /// Output follows input order. Null readings produce no row.
    pub fn compare_to_group<S: AsRef<str>>(
        &self,
        measurements: &[Measurement],
        key: PartitionKey,
        metrics: &[S],
    ) -> Vec<RelativeMeasurement> {
        let mut samples: BTreeMap<(Partition, &str), SampleStats> = BTreeMap::new();
        for metric in metrics {
            let metric = metric.as_ref();
            for (partition, sample) in self.partition_values(measurements, key, metric) {
                samples.insert((partition, metric), SampleStats::from_values(&sample.values));
            }
        }

        let mut relative = Vec::new();
        for m in measurements {
            let Some(value) = m.reading() else {
                continue;
            };
            let partition = self.partition_of(key, &m.group_key);
            let Some(sample) = samples.get(&(partition.clone(), m.metric.as_str())) else {
                continue;
            };
            relative.push(RelativeMeasurement {
                entity_id: m.entity_id.clone(),
                group_key: m.group_key.clone(),
                partition,
                metric: m.metric.clone(),
                value,
                timestamp: m.timestamp,
                group_mean: sample.mean,
                pct_diff_from_group: sample.percent_difference(value),
                z_score: sample.z_score(value),
            });
        }
        tracing::debug!(rows = relative.len(), "Compared readings to their partition");
        relative
    }
}

fn validate_percentile(p: f64) -> Result<(), AnalyticsError> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidPercentile(p))
    }
}

fn group_stat(partition: Partition, metric: &str, sample: &PartitionSample, p: f64) -> GroupStat {
    GroupStat {
        partition,
        metric: metric.to_string(),
        count: sample.values.len(),
        nulls: sample.nulls,
        mean: stats::mean(&sample.values),
        std_dev: stats::sample_std_dev(&sample.values),
        percentile: p,
        percentile_value: stats::percentile(&sample.values, p),
    }
}

/// Min, max, mean and spread of the defined percent differences per metric,
/// ordered by metric name.
pub fn summarize_pct_diff(relative: &[RelativeMeasurement]) -> Vec<PctDiffSummary> {
    let mut by_metric: BTreeMap<&str, (Vec<f64>, usize)> = BTreeMap::new();
    for row in relative {
        let (values, undefined) = by_metric.entry(row.metric.as_str()).or_default();
        match row.pct_diff_from_group {
            Ok(pct) => values.push(pct),
            Err(_) => *undefined += 1,
        }
    }

    by_metric
        .into_iter()
        .map(|(metric, (values, undefined))| {
            let sorted = {
                let mut sorted = values.clone();
                sorted.sort_by(f64::total_cmp);
                sorted
            };
            PctDiffSummary {
                metric: metric.to_string(),
                count: values.len(),
                undefined,
                min: stats::percentile_sorted(&sorted, 0.0),
                max: stats::percentile_sorted(&sorted, 1.0),
                mean: stats::mean(&values),
                std_dev: stats::sample_std_dev(&values),
            }
        })
        .collect()
}
