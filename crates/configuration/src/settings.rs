use crate::error::ConfigError;
use core_types::metrics::{
    ACCEL_LOAD_ACCUM, DEFAULT_METRICS, JUMP_HEIGHT, LEFT_MAX_FORCE, PEAK_PROPULSIVE_FORCE,
    RIGHT_MAX_FORCE,
};
use core_types::{Gender, PartitionKey, Sport, TeamDirectory, TeamProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// The root configuration for one analysis run.
///
/// Every top-level call takes this (or one of its sections) as an argument;
/// nothing reads settings from process-wide state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Metric names recognised by this analysis. Anything else in the snapshot is ignored.
    pub metrics: Vec<String>,
    pub asymmetry: AsymmetryParams,
    pub load: LoadParams,
    pub scope: Scope,
    /// Explicit team classifications, consulted before inferring from the team name.
    pub teams: Vec<TeamEntry>,
    pub research: ResearchParams,
    pub logging: LoggingConfig,
}

/// Parameters for the bilateral asymmetry flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsymmetryParams {
    pub left_metric: String,
    pub right_metric: String,
    /// Flag when asymmetry is strictly greater than this percentage.
    pub threshold_pct: f64,
}

/// Parameters for the high-load flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadParams {
    pub metric: String,
    /// Percentile of the comparison partition, as a fraction (0.90 = 90th).
    pub percentile: f64,
    pub partition: PartitionKey,
    pub selection: ReadingSelection,
}

/// Which of an athlete's readings the flags look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ReadingSelection {
    /// The most recent timestamp; thresholds come from every reading in the partition.
    Latest,
    /// Per-athlete averages; thresholds come from the partition's athlete averages.
    Mean,
}

/// Which athletes a run covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scope {
    /// Sports to include. Empty means every sport.
    pub sports: Vec<Sport>,
}

impl Scope {
    /// Whether athletes of `sport` belong to the run.
    ///
    /// Teams whose sport cannot be told from the name (`Sport::Unknown`) are
    /// always kept, so they surface in the Unknown buckets instead of
    /// vanishing behind a sport filter.
    pub fn includes(&self, sport: Sport) -> bool {
        self.sports.is_empty() || sport == Sport::Unknown || self.sports.contains(&sport)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub name: String,
    pub gender: Gender,
    pub sport: Sport,
}

/// Thresholds for the research question flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchParams {
    /// Metrics compared between men and women.
    pub comparison_metrics: Vec<String>,
    pub correlation_x: String,
    pub correlation_y: String,
    /// Minimum pooled-SD effect size that counts as a gender difference.
    pub min_effect_size: f64,
    /// Minimum athletes per gender before a difference is trusted.
    pub min_group_size: usize,
    /// Minimum paired athletes before a correlation is reported.
    pub min_correlation_pairs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---
// These allow a user to omit any section from their toml and still get the
// monitoring program's standard thresholds.

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            metrics: DEFAULT_METRICS.iter().map(|m| m.to_string()).collect(),
            asymmetry: AsymmetryParams::default(),
            load: LoadParams::default(),
            scope: Scope::default(),
            teams: Vec::new(),
            research: ResearchParams::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AsymmetryParams {
    fn default() -> Self {
        Self {
            left_metric: LEFT_MAX_FORCE.to_string(),
            right_metric: RIGHT_MAX_FORCE.to_string(),
            threshold_pct: 10.0,
        }
    }
}

impl Default for LoadParams {
    fn default() -> Self {
        Self {
            metric: ACCEL_LOAD_ACCUM.to_string(),
            percentile: 0.90,
            partition: PartitionKey::Gender,
            selection: ReadingSelection::Latest,
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            sports: vec![Sport::Basketball],
        }
    }
}

impl Default for ResearchParams {
    fn default() -> Self {
        Self {
            comparison_metrics: vec![JUMP_HEIGHT.to_string(), PEAK_PROPULSIVE_FORCE.to_string()],
            correlation_x: JUMP_HEIGHT.to_string(),
            correlation_y: PEAK_PROPULSIVE_FORCE.to_string(),
            min_effect_size: 0.2,
            min_group_size: 30,
            min_correlation_pairs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl AnalysisConfig {
    /// Checks that the thresholds and metric names are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics.is_empty() {
            return Err(invalid("metrics must not be empty"));
        }
        let mut seen = HashSet::new();
        for metric in &self.metrics {
            if metric.trim().is_empty() {
                return Err(invalid("metric names must not be blank"));
            }
            if !seen.insert(metric.as_str()) {
                return Err(invalid(format!("metric '{metric}' is listed twice")));
            }
        }

        let asym = &self.asymmetry;
        if asym.left_metric.trim().is_empty() || asym.right_metric.trim().is_empty() {
            return Err(invalid("asymmetry metrics must not be blank"));
        }
        if asym.left_metric == asym.right_metric {
            return Err(invalid("asymmetry left and right metrics must differ"));
        }
        if !asym.threshold_pct.is_finite() || asym.threshold_pct < 0.0 {
            return Err(invalid(format!(
                "asymmetry.threshold_pct must be a non-negative number, got {}",
                asym.threshold_pct
            )));
        }

        if self.load.metric.trim().is_empty() {
            return Err(invalid("load.metric must not be blank"));
        }
        if !self.load.percentile.is_finite() || !(0.0..=1.0).contains(&self.load.percentile) {
            return Err(invalid(format!(
                "load.percentile must be within [0, 1], got {}",
                self.load.percentile
            )));
        }

        let research = &self.research;
        if !research.min_effect_size.is_finite() || research.min_effect_size < 0.0 {
            return Err(invalid("research.min_effect_size must be a non-negative number"));
        }
        if research.min_group_size < 2 {
            return Err(invalid("research.min_group_size must be at least 2"));
        }
        if research.min_correlation_pairs < 3 {
            return Err(invalid("research.min_correlation_pairs must be at least 3"));
        }

        for team in &self.teams {
            if team.name.trim().is_empty() {
                return Err(invalid("team entries need a name"));
            }
        }

        Ok(())
    }

    /// Builds the team lookup: explicit entries first, name inference as fallback.
    pub fn team_directory(&self) -> TeamDirectory {
        TeamDirectory::new(self.teams.iter().map(|team| {
            (
                team.name.as_str(),
                TeamProfile {
                    gender: team.gender,
                    sport: team.sport,
                },
            )
        }))
    }

    pub fn in_scope(&self, profile: &TeamProfile) -> bool {
        self.scope.includes(profile.sport)
    }

    /// Every metric name any part of the analysis reads, without duplicates.
    pub fn tracked_metrics(&self) -> Vec<String> {
        let mut tracked: Vec<String> = Vec::new();
        let candidates = self
            .metrics
            .iter()
            .chain([
                &self.asymmetry.left_metric,
                &self.asymmetry.right_metric,
                &self.load.metric,
                &self.research.correlation_x,
                &self.research.correlation_y,
            ])
            .chain(self.research.comparison_metrics.iter());
        for metric in candidates {
            if !tracked.contains(metric) {
                tracked.push(metric.clone());
            }
        }
        tracked
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}
