use crate::findings::{Correlation, Findings, LoadByAsymmetry, Prevalence};
use configuration::ResearchParams;
use core_types::Gender;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Question {
    Q1,
    Q2,
    Q3,
    Q4,
    Q5,
}

impl Question {
    pub fn text(&self) -> &'static str {
        match self {
            Question::Q1 => "Do men and women differ in jump height or peak propulsive force?",
            Question::Q2 => "Which group shows more bilateral asymmetry, or how do jump and force relate?",
            Question::Q3 => "Do high-asymmetry athletes carry more acceleration load?",
            Question::Q4 => "Which athletes exceed the combined risk thresholds?",
            Question::Q5 => "Who should be targeted for monitoring or intervention?",
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenderDifference {
    Found { metric: String, effect_size: f64 },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Recommendation {
    /// Combined-risk athletes exist; act on them individually.
    TargetIntervention { entities: Vec<String> },
    /// No combined risk, but one group stands out on asymmetry.
    MonitorCohort { gender: Gender, prevalence_pct: f64 },
    RoutineMonitoring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResearchOutcome {
    GenderDifference(GenderDifference),
    AsymmetryPrevalence {
        by_gender: BTreeMap<Gender, Prevalence>,
        higher: Option<Gender>,
    },
    PerformanceCorrelation {
        by_gender: BTreeMap<Gender, Correlation>,
    },
    AsymmetryLoad(LoadByAsymmetry),
    CombinedRisk {
        entities: Vec<String>,
    },
    Recommendation(Recommendation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchAnswer {
    pub question: Question,
    pub outcome: ResearchOutcome,
}

/// One row of the research table: when it applies and what it answers.
#[derive(Debug, Clone, Copy)]
pub struct ResearchRule {
    pub question: Question,
    pub applies: fn(&Findings, &ResearchParams) -> bool,
    pub answer: fn(&Findings, &ResearchParams) -> ResearchOutcome,
}

/// The question flow. Rows are evaluated in order and every applicable row
/// contributes one answer; the two Q2 rows are mutually exclusive.
pub const RESEARCH_RULES: [ResearchRule; 6] = [
    ResearchRule {
        question: Question::Q1,
        applies: always,
        answer: |f: &Findings, p: &ResearchParams| {
            ResearchOutcome::GenderDifference(gender_difference(f, p))
        },
    },
    ResearchRule {
        question: Question::Q2,
        applies: |f: &Findings, p: &ResearchParams| difference_found(f, p),
        answer: |f: &Findings, _: &ResearchParams| ResearchOutcome::AsymmetryPrevalence {
            by_gender: f.prevalence.clone(),
            higher: f.highest_prevalence().map(|(gender, _)| gender),
        },
    },
    ResearchRule {
        question: Question::Q2,
        applies: |f: &Findings, p: &ResearchParams| !difference_found(f, p),
        answer: |f: &Findings, _: &ResearchParams| ResearchOutcome::PerformanceCorrelation {
            by_gender: f.correlations.clone(),
        },
    },
    ResearchRule {
        question: Question::Q3,
        applies: always,
        answer: |f: &Findings, _: &ResearchParams| ResearchOutcome::AsymmetryLoad(f.load_by_asymmetry),
    },
    ResearchRule {
        question: Question::Q4,
        applies: always,
        answer: |f: &Findings, _: &ResearchParams| ResearchOutcome::CombinedRisk {
            entities: f.combined_risk.clone(),
        },
    },
    ResearchRule {
        question: Question::Q5,
        applies: always,
        answer: |f: &Findings, _: &ResearchParams| ResearchOutcome::Recommendation(recommend(f)),
    },
];

fn always(_: &Findings, _: &ResearchParams) -> bool {
    true
}

/// The first comparison metric whose effect size reaches the minimum with
/// both groups at the minimum size.
pub fn gender_difference(findings: &Findings, params: &ResearchParams) -> GenderDifference {
    findings
        .comparisons
        .iter()
        .find_map(|c| {
            let effect = c.effect_size.ok()?;
            let large_enough =
                c.male.count >= params.min_group_size && c.female.count >= params.min_group_size;
            (large_enough && effect >= params.min_effect_size).then(|| GenderDifference::Found {
                metric: c.metric.clone(),
                effect_size: effect,
            })
        })
        .unwrap_or(GenderDifference::NotFound)
}

fn difference_found(findings: &Findings, params: &ResearchParams) -> bool {
    matches!(gender_difference(findings, params), GenderDifference::Found { .. })
}

pub fn recommend(findings: &Findings) -> Recommendation {
    if !findings.combined_risk.is_empty() {
        return Recommendation::TargetIntervention {
            entities: findings.combined_risk.clone(),
        };
    }
    match findings.highest_prevalence() {
        Some((gender, prevalence_pct)) => Recommendation::MonitorCohort {
            gender,
            prevalence_pct,
        },
        None => Recommendation::RoutineMonitoring,
    }
}

/// Runs the research table over the findings.
pub fn evaluate(findings: &Findings, params: &ResearchParams) -> Vec<ResearchAnswer> {
    RESEARCH_RULES
        .iter()
        .filter(|rule| (rule.applies)(findings, params))
        .map(|rule| ResearchAnswer {
            question: rule.question,
            outcome: (rule.answer)(findings, params),
        })
        .collect()
}
