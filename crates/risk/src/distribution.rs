use crate::report::RiskAssessment;
use core_types::{Derived, Gender, RiskLabel, Undefined};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Athletes per risk label, split by gender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDistribution {
    counts: BTreeMap<Gender, BTreeMap<RiskLabel, usize>>,
}

/// One cell of the distribution table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionCell {
    pub gender: Gender,
    pub label: RiskLabel,
    pub count: usize,
    pub pct: Derived,
}

impl RiskDistribution {
    pub fn from_assessments(assessments: &[RiskAssessment]) -> Self {
        let mut counts: BTreeMap<Gender, BTreeMap<RiskLabel, usize>> = BTreeMap::new();
        for assessment in assessments {
            let row = counts
                .entry(assessment.gender)
                .or_insert_with(|| RiskLabel::ALL.iter().map(|label| (*label, 0)).collect());
            *row.entry(assessment.label).or_default() += 1;
        }
        Self { counts }
    }

    pub fn genders(&self) -> impl Iterator<Item = Gender> + '_ {
        self.counts.keys().copied()
    }

    pub fn count(&self, gender: Gender, label: RiskLabel) -> usize {
        self.counts
            .get(&gender)
            .and_then(|row| row.get(&label))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self, gender: Gender) -> usize {
        self.counts.get(&gender).map_or(0, |row| row.values().sum())
    }

    /// Share of the gender's athletes carrying `label`, in percent.
    pub fn pct(&self, gender: Gender, label: RiskLabel) -> Derived {
        let total = self.total(gender);
        if total == 0 {
            return Err(Undefined::MissingData);
        }
        Ok(self.count(gender, label) as f64 / total as f64 * 100.0)
    }

    /// Every cell, genders in order and labels in reporting order.
    pub fn cells(&self) -> Vec<DistributionCell> {
        self.genders()
            .flat_map(|gender| {
                RiskLabel::ALL.into_iter().map(move |label| (gender, label))
            })
            .map(|(gender, label)| DistributionCell {
                gender,
                label,
                count: self.count(gender, label),
                pct: self.pct(gender, label),
            })
            .collect()
    }
}
