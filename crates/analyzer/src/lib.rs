//! # perfmon Research Analyzer
//!
//! Answers the monitoring program's five research questions as a pure,
//! ordered decision table over computed `Findings`. Rendering the answers is
//! the caller's job.

use crate::error::AnalyzerError;
use configuration::AnalysisConfig;
use core_types::{Measurement, RiskLabel};
use reshape::aggregate_by_entity;
use risk::{RiskClassifier, ThresholdRiskClassifier};

pub mod error;
pub mod findings;
pub mod rules;

pub use findings::{Correlation, Findings, LoadByAsymmetry, MetricComparison, Prevalence};
pub use rules::{
    GenderDifference, Question, RESEARCH_RULES, Recommendation, ResearchAnswer, ResearchOutcome,
    ResearchRule,
};

/// The main analysis engine.
pub struct Analyzer {
    config: AnalysisConfig,
    classifier: ThresholdRiskClassifier,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalyzerError> {
        let classifier = ThresholdRiskClassifier::new(&config)?;
        Ok(Self { config, classifier })
    }

    /// Computes the findings for the in-scope athletes of `snapshot`.
    pub fn findings(&self, snapshot: &[Measurement]) -> Result<Findings, AnalyzerError> {
        let directory = self.config.team_directory();
        let scoped: Vec<Measurement> = snapshot
            .iter()
            .filter(|m| self.config.in_scope(&directory.profile(&m.group_key)))
            .cloned()
            .collect();
        let records = aggregate_by_entity(&scoped, &self.config.tracked_metrics());

        let report = self.classifier.classify(snapshot)?;
        let combined: Vec<String> = report
            .with_label(RiskLabel::CombinedRisk)
            .map(|a| a.entity_id.clone())
            .collect();

        tracing::debug!(
            athletes = records.len(),
            combined = combined.len(),
            "Computed research findings."
        );
        Ok(Findings::compute(&records, &directory, &self.config, combined))
    }

    /// Computes the findings and runs the research table over them.
    pub fn run(&self, snapshot: &[Measurement]) -> Result<Vec<ResearchAnswer>, AnalyzerError> {
        let findings = self.findings(snapshot)?;
        Ok(rules::evaluate(&findings, &self.config.research))
    }
}
