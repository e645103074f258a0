use crate::asymmetry::AsymmetryReading;
use crate::distribution::RiskDistribution;
use crate::load::{LoadReading, LoadThreshold};
use crate::outcome::FlagOutcome;
use chrono::{DateTime, Utc};
use configuration::ReadingSelection;
use core_types::{Gender, Partition, RiskLabel, Sport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// The classification of one athlete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub entity_id: String,
    pub group_key: String,
    pub gender: Gender,
    pub sport: Sport,
    pub label: RiskLabel,
    pub asymmetry: FlagOutcome<AsymmetryReading>,
    pub load: FlagOutcome<LoadReading>,
    /// Most recent timestamp among the readings that were evaluated.
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl RiskAssessment {
    /// Both flag conditions could be checked.
    pub fn is_fully_evaluable(&self) -> bool {
        self.asymmetry.is_evaluable() && self.load.is_evaluable()
    }
}

/// Everything one classification run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub selection: ReadingSelection,
    /// Sports the run was restricted to; empty means every sport.
    pub sports: Vec<Sport>,
    pub asymmetry_threshold_pct: f64,
    pub load_thresholds: BTreeMap<Partition, LoadThreshold>,
    /// Ordered by athlete.
    pub assessments: Vec<RiskAssessment>,
    pub distribution: RiskDistribution,
    pub fully_evaluable: usize,
    pub not_fully_evaluable: usize,
    /// Athletes with readings only on teams outside the sport scope.
    pub out_of_scope: usize,
}

impl RiskReport {
    pub fn with_label(&self, label: RiskLabel) -> impl Iterator<Item = &RiskAssessment> + '_ {
        self.assessments.iter().filter(move |a| a.label == label)
    }

    pub fn assessment(&self, entity_id: &str) -> Option<&RiskAssessment> {
        self.assessments.iter().find(|a| a.entity_id == entity_id)
    }
}
