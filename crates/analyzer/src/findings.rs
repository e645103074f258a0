use analytics::SampleStats;
use analytics::stats::{effect_size, pearson, percent_difference};
use configuration::AnalysisConfig;
use core_types::{Derived, EntityRecord, Gender, TeamDirectory, Undefined};
use risk::{FlagOutcome, evaluate_asymmetry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Men versus women on one metric, over per-athlete averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: String,
    pub male: SampleStats,
    pub female: SampleStats,
    pub effect_size: Derived,
}

/// Share of evaluable athletes whose asymmetry exceeds the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prevalence {
    pub evaluated: usize,
    pub high: usize,
    pub pct: Derived,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub pairs: usize,
    pub r: Derived,
}

/// Load of high-asymmetry athletes compared with everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadByAsymmetry {
    pub high: SampleStats,
    pub low: SampleStats,
    /// `(mean(high) - mean(low)) / mean(low) * 100`.
    pub pct_difference: Derived,
}

/// Everything the research questions are answered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    /// In-scope athletes.
    pub athletes: usize,
    pub comparisons: Vec<MetricComparison>,
    pub prevalence: BTreeMap<Gender, Prevalence>,
    pub correlations: BTreeMap<Gender, Correlation>,
    pub load_by_asymmetry: LoadByAsymmetry,
    /// Athletes labelled combined risk, ordered by id.
    pub combined_risk: Vec<String>,
}

impl Findings {
    /// Computes the findings from per-athlete averages.
    ///
    /// `records` is expected to be in scope already; `combined_risk` comes
    /// from the flagging run over the same snapshot.
    pub fn compute(
        records: &[EntityRecord],
        directory: &TeamDirectory,
        config: &AnalysisConfig,
        mut combined_risk: Vec<String>,
    ) -> Self {
        let genders: Vec<Gender> = records
            .iter()
            .map(|r| directory.profile(&r.group_key).gender)
            .collect();
        combined_risk.sort();

        Self {
            athletes: records.len(),
            comparisons: compare_genders(records, &genders, config),
            prevalence: asymmetry_prevalence(records, &genders, config),
            correlations: correlations(records, &genders, config),
            load_by_asymmetry: load_by_asymmetry(records, config),
            combined_risk,
        }
    }

    /// The gender with the highest defined, non-zero asymmetry prevalence.
    /// Ties go to the first gender in order.
    pub fn highest_prevalence(&self) -> Option<(Gender, f64)> {
        let mut best: Option<(Gender, f64)> = None;
        for (gender, prevalence) in &self.prevalence {
            let Ok(pct) = prevalence.pct else {
                continue;
            };
            if pct > 0.0 && best.is_none_or(|(_, top)| pct > top) {
                best = Some((*gender, pct));
            }
        }
        best
    }
}

fn values_for(records: &[EntityRecord], genders: &[Gender], gender: Gender, metric: &str) -> Vec<f64> {
    records
        .iter()
        .zip(genders)
        .filter(|(_, g)| **g == gender)
        .filter_map(|(record, _)| record.get(metric))
        .collect()
}

fn compare_genders(
    records: &[EntityRecord],
    genders: &[Gender],
    config: &AnalysisConfig,
) -> Vec<MetricComparison> {
    config
        .research
        .comparison_metrics
        .iter()
        .map(|metric| {
            let male = values_for(records, genders, Gender::Male, metric);
            let female = values_for(records, genders, Gender::Female, metric);
            MetricComparison {
                metric: metric.clone(),
                male: SampleStats::from_values(&male),
                female: SampleStats::from_values(&female),
                effect_size: effect_size(&male, &female),
            }
        })
        .collect()
}

fn asymmetry_prevalence(
    records: &[EntityRecord],
    genders: &[Gender],
    config: &AnalysisConfig,
) -> BTreeMap<Gender, Prevalence> {
    let params = &config.asymmetry;
    let mut counts: BTreeMap<Gender, (usize, usize)> = BTreeMap::new();
    for (record, gender) in records.iter().zip(genders) {
        let outcome = evaluate_asymmetry(
            record.get(&params.left_metric),
            record.get(&params.right_metric),
            params.threshold_pct,
            record.latest_timestamp,
        );
        if !outcome.is_evaluable() {
            continue;
        }
        let (evaluated, high) = counts.entry(*gender).or_default();
        *evaluated += 1;
        if outcome.is_flagged() {
            *high += 1;
        }
    }
    counts
        .into_iter()
        .map(|(gender, (evaluated, high))| {
            let pct = if evaluated == 0 {
                Err(Undefined::MissingData)
            } else {
                Ok(high as f64 / evaluated as f64 * 100.0)
            };
            (gender, Prevalence { evaluated, high, pct })
        })
        .collect()
}

fn correlations(
    records: &[EntityRecord],
    genders: &[Gender],
    config: &AnalysisConfig,
) -> BTreeMap<Gender, Correlation> {
    let research = &config.research;
    let mut pairs: BTreeMap<Gender, Vec<(f64, f64)>> = BTreeMap::new();
    for (record, gender) in records.iter().zip(genders) {
        let entry = pairs.entry(*gender).or_default();
        if let (Some(x), Some(y)) = (
            record.get(&research.correlation_x),
            record.get(&research.correlation_y),
        ) {
            entry.push((x, y));
        }
    }
    pairs
        .into_iter()
        .map(|(gender, pairs)| {
            let r = if pairs.len() < research.min_correlation_pairs {
                Err(Undefined::InsufficientSample {
                    required: research.min_correlation_pairs,
                    found: pairs.len(),
                })
            } else {
                pearson(&pairs)
            };
            (
                gender,
                Correlation {
                    pairs: pairs.len(),
                    r,
                },
            )
        })
        .collect()
}

fn load_by_asymmetry(records: &[EntityRecord], config: &AnalysisConfig) -> LoadByAsymmetry {
    let params = &config.asymmetry;
    let mut high = Vec::new();
    let mut low = Vec::new();
    for record in records {
        let Some(load) = record.get(&config.load.metric) else {
            continue;
        };
        let outcome = evaluate_asymmetry(
            record.get(&params.left_metric),
            record.get(&params.right_metric),
            params.threshold_pct,
            record.latest_timestamp,
        );
        match outcome {
            FlagOutcome::Flagged(_) => high.push(load),
            FlagOutcome::Clear(_) => low.push(load),
            FlagOutcome::NotEvaluable(_) => {}
        }
    }
    let high = SampleStats::from_values(&high);
    let low = SampleStats::from_values(&low);
    let pct_difference = match (high.mean, low.mean) {
        (Ok(high_mean), Ok(low_mean)) => percent_difference(high_mean, low_mean),
        (Err(reason), _) | (_, Err(reason)) => Err(reason),
    };
    LoadByAsymmetry {
        high,
        low,
        pct_difference,
    }
}
