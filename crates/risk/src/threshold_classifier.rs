use crate::RiskClassifier;
use crate::asymmetry::{AsymmetryReading, evaluate_asymmetry};
use crate::classifier::{self, FlagSet};
use crate::distribution::RiskDistribution;
use crate::error::RiskError;
use crate::load::{LoadReading, LoadThreshold, evaluate_load};
use crate::outcome::{FlagOutcome, NotEvaluableReason};
use crate::report::{RiskAssessment, RiskReport};
use analytics::AggregationEngine;
use chrono::Utc;
use configuration::{AnalysisConfig, AsymmetryParams, LoadParams, ReadingSelection, Scope};
use core_types::{Measurement, Observation, Partition, RiskLabel, Sport, Undefined};
use reshape::{aggregate_by_entity, latest_per_entity, pivot};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// A concrete implementation of the `RiskClassifier` trait.
///
/// Flags bilateral asymmetry above a fixed percentage and load above a
/// percentile of the athlete's partition, then labels every athlete with the
/// classification table.
#[derive(Debug, Clone)]
pub struct ThresholdRiskClassifier {
    asymmetry: AsymmetryParams,
    load: LoadParams,
    scope: Scope,
    engine: AggregationEngine,
}

impl ThresholdRiskClassifier {
    /// Creates a classifier from the analysis configuration, validating it first.
    pub fn new(config: &AnalysisConfig) -> Result<Self, RiskError> {
        config
            .validate()
            .map_err(|e| RiskError::InvalidParameters(e.to_string()))?;
        Ok(Self {
            asymmetry: config.asymmetry.clone(),
            load: config.load.clone(),
            scope: config.scope.clone(),
            engine: AggregationEngine::new(config.team_directory()),
        })
    }

    /// Restricts the classifier to a single sport. Athletes whose sport is
    /// unknown are still assessed.
    pub fn for_sport(mut self, sport: Sport) -> Self {
        self.scope.sports = vec![sport];
        self
    }

    pub fn sports(&self) -> &[Sport] {
        &self.scope.sports
    }

    fn in_scope(&self, group_key: &str) -> bool {
        self.scope
            .includes(self.engine.directory().profile(group_key).sport)
    }

    fn metrics(&self) -> [&str; 3] {
        [
            self.asymmetry.left_metric.as_str(),
            self.asymmetry.right_metric.as_str(),
            self.load.metric.as_str(),
        ]
    }

    fn load_thresholds<T: Observation>(
        &self,
        observations: &[T],
    ) -> Result<BTreeMap<Partition, LoadThreshold>, RiskError> {
        let stats = self.engine.group_stats(
            observations,
            self.load.partition,
            &self.load.metric,
            self.load.percentile,
        )?;
        Ok(stats
            .into_iter()
            .map(|(partition, stat)| {
                let threshold = LoadThreshold {
                    partition: partition.clone(),
                    percentile: stat.percentile,
                    sample_size: stat.count,
                    value: stat.percentile_value,
                };
                (partition, threshold)
            })
            .collect())
    }

    fn threshold_for(
        &self,
        thresholds: &BTreeMap<Partition, LoadThreshold>,
        group_key: &str,
    ) -> LoadThreshold {
        let partition = self.engine.partition_of(self.load.partition, group_key);
        thresholds.get(&partition).cloned().unwrap_or(LoadThreshold {
            partition,
            percentile: self.load.percentile,
            sample_size: 0,
            value: Err(Undefined::MissingData),
        })
    }

    fn assess(
        &self,
        entity_id: &str,
        group_key: &str,
        asymmetry: FlagOutcome<AsymmetryReading>,
        load: FlagOutcome<LoadReading>,
    ) -> RiskAssessment {
        let profile = self.engine.directory().profile(group_key);
        let flags = FlagSet {
            high_asymmetry: asymmetry.is_flagged(),
            high_load: load.is_flagged(),
        };
        let evaluated_at = [
            asymmetry.reading().map(|r| r.timestamp),
            load.reading().map(|r| r.timestamp),
        ]
        .into_iter()
        .flatten()
        .max();
        RiskAssessment {
            entity_id: entity_id.to_string(),
            group_key: group_key.to_string(),
            gender: profile.gender,
            sport: profile.sport,
            label: classifier::classify(&flags),
            asymmetry,
            load,
            evaluated_at,
        }
    }

    /// Flags each athlete's most recent readings. Asymmetry uses the latest
    /// timestamp with both sides recorded; the load threshold is taken over
    /// every reading in the partition.
    fn assess_latest(
        &self,
        scoped: &[Measurement],
    ) -> Result<(BTreeMap<Partition, LoadThreshold>, Vec<RiskAssessment>), RiskError> {
        let [left, right, load_metric] = self.metrics();
        let table = pivot(scoped, &self.metrics());
        let thresholds = self.load_thresholds(scoped)?;

        let pairs: BTreeMap<&str, _> = latest_per_entity(&table, &[left, right])
            .into_iter()
            .map(|row| (row.entity_id.as_str(), row))
            .collect();
        let loads: BTreeMap<&str, _> = latest_per_entity(&table, &[load_metric])
            .into_iter()
            .map(|row| (row.entity_id.as_str(), row))
            .collect();

        let mut assessments = Vec::new();
        for entity_id in table.entities() {
            let Some(latest) = table.for_entity(entity_id).last() else {
                continue;
            };
            let group_key = latest.group_key.as_str();

            let asymmetry = match pairs.get(entity_id) {
                Some(row) => evaluate_asymmetry(
                    row.get(left),
                    row.get(right),
                    self.asymmetry.threshold_pct,
                    row.timestamp,
                ),
                None => {
                    let one_side = table
                        .for_entity(entity_id)
                        .any(|row| row.get(left).is_some() || row.get(right).is_some());
                    FlagOutcome::NotEvaluable(if one_side {
                        NotEvaluableReason::MissingPair
                    } else {
                        NotEvaluableReason::NoReadings
                    })
                }
            };

            let load = match loads.get(entity_id) {
                Some(row) => evaluate_load(
                    row.get(load_metric),
                    &self.threshold_for(&thresholds, &row.group_key),
                    row.timestamp,
                ),
                None => FlagOutcome::NotEvaluable(NotEvaluableReason::NoReadings),
            };

            assessments.push(self.assess(entity_id, group_key, asymmetry, load));
        }
        Ok((thresholds, assessments))
    }

    /// Flags per-athlete averages; the load threshold is taken over the
    /// partition's athlete averages.
    fn assess_mean(
        &self,
        scoped: &[Measurement],
    ) -> Result<(BTreeMap<Partition, LoadThreshold>, Vec<RiskAssessment>), RiskError> {
        let [left, right, load_metric] = self.metrics();
        let records = aggregate_by_entity(scoped, &self.metrics());
        let thresholds = self.load_thresholds(&records)?;

        let assessments = records
            .iter()
            .map(|record| {
                let asymmetry = evaluate_asymmetry(
                    record.get(left),
                    record.get(right),
                    self.asymmetry.threshold_pct,
                    record.latest_timestamp,
                );
                let load = evaluate_load(
                    record.get(load_metric),
                    &self.threshold_for(&thresholds, &record.group_key),
                    record.latest_timestamp,
                );
                self.assess(&record.entity_id, &record.group_key, asymmetry, load)
            })
            .collect();
        Ok((thresholds, assessments))
    }
}

impl RiskClassifier for ThresholdRiskClassifier {
    fn classify(&self, snapshot: &[Measurement]) -> Result<RiskReport, RiskError> {
        let metrics = self.metrics();
        let mut scoped: Vec<Measurement> = Vec::new();
        let mut excluded: BTreeSet<&str> = BTreeSet::new();
        for m in snapshot.iter().filter(|m| metrics.contains(&m.metric.as_str())) {
            if self.in_scope(&m.group_key) {
                scoped.push(m.clone());
            } else {
                excluded.insert(m.entity_id.as_str());
            }
        }

        let (load_thresholds, assessments) = match self.load.selection {
            ReadingSelection::Latest => self.assess_latest(&scoped)?,
            ReadingSelection::Mean => self.assess_mean(&scoped)?,
        };

        let fully_evaluable = assessments.iter().filter(|a| a.is_fully_evaluable()).count();
        let assessed: BTreeSet<&str> = assessments.iter().map(|a| a.entity_id.as_str()).collect();
        let out_of_scope = excluded.difference(&assessed).count();
        let report = RiskReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            selection: self.load.selection,
            sports: self.scope.sports.clone(),
            asymmetry_threshold_pct: self.asymmetry.threshold_pct,
            load_thresholds,
            distribution: RiskDistribution::from_assessments(&assessments),
            not_fully_evaluable: assessments.len() - fully_evaluable,
            fully_evaluable,
            out_of_scope,
            assessments,
        };

        tracing::info!(
            run_id = %report.run_id,
            athletes = report.assessments.len(),
            combined = report.with_label(RiskLabel::CombinedRisk).count(),
            not_fully_evaluable = report.not_fully_evaluable,
            out_of_scope = report.out_of_scope,
            "Risk classification complete."
        );
        Ok(report)
    }
}
