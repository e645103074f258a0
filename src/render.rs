use analytics::{GroupStat, PctDiffSummary, RelativeMeasurement, YearlyMean};
use analyzer::{GenderDifference, Recommendation, ResearchAnswer, ResearchOutcome};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use core_types::{Derived, RiskLabel};
use reshape::WideTable;
use risk::{FlagOutcome, NotEvaluableReason, RiskReport};
use serde::Serialize;

/// Prints any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

fn derived(value: &Derived) -> Cell {
    match value {
        Ok(v) => number(*v),
        Err(reason) => Cell::new(format!("n/a ({reason})")),
    }
}

fn pct(value: &Derived) -> String {
    match value {
        Ok(v) => format!("{v:.1}%"),
        Err(reason) => format!("n/a ({reason})"),
    }
}

pub fn wide_table(wide: &WideTable) -> Table {
    let mut out = table(
        ["Athlete", "Team", "Timestamp"]
            .into_iter()
            .map(String::from)
            .chain(wide.columns().iter().cloned()),
    );
    for row in wide.rows() {
        let mut cells = vec![
            Cell::new(&row.entity_id),
            Cell::new(&row.group_key),
            Cell::new(row.timestamp.format("%Y-%m-%d %H:%M:%S")),
        ];
        cells.extend(wide.columns().iter().map(|metric| match row.get(metric) {
            Some(value) => number(value),
            None => Cell::new(""),
        }));
        out.add_row(cells);
    }
    out
}

pub fn group_stats(stats: &[GroupStat]) -> Table {
    let mut out = table(["Partition", "Metric", "N", "Nulls", "Mean", "Std Dev", "Percentile"]);
    for stat in stats {
        out.add_row(vec![
            Cell::new(&stat.partition),
            Cell::new(&stat.metric),
            Cell::new(stat.count),
            Cell::new(stat.nulls),
            derived(&stat.mean),
            derived(&stat.std_dev),
            match &stat.percentile_value {
                Ok(v) => Cell::new(format!("p{:.0} = {v:.2}", stat.percentile * 100.0)),
                Err(reason) => Cell::new(format!("n/a ({reason})")),
            },
        ]);
    }
    out
}

pub fn relative(rows: &[RelativeMeasurement]) -> Table {
    let mut out = table(["Athlete", "Partition", "Metric", "Timestamp", "Value", "Group Mean", "% Diff", "Z"]);
    for row in rows {
        out.add_row(vec![
            Cell::new(&row.entity_id),
            Cell::new(&row.partition),
            Cell::new(&row.metric),
            Cell::new(row.timestamp.format("%Y-%m-%d")),
            number(row.value),
            derived(&row.group_mean),
            derived(&row.pct_diff_from_group),
            derived(&row.z_score),
        ]);
    }
    out
}

pub fn pct_diff(summaries: &[PctDiffSummary]) -> Table {
    let mut out = table(["Metric", "N", "Undefined", "Min %", "Max %", "Mean %", "Std Dev"]);
    for summary in summaries {
        out.add_row(vec![
            Cell::new(&summary.metric),
            Cell::new(summary.count),
            Cell::new(summary.undefined),
            derived(&summary.min),
            derived(&summary.max),
            derived(&summary.mean),
            derived(&summary.std_dev),
        ]);
    }
    out
}

pub fn yearly(means: &[YearlyMean]) -> Table {
    let mut out = table(["Year", "Metric", "N", "Mean"]);
    for row in means {
        out.add_row(vec![
            Cell::new(row.year),
            Cell::new(&row.metric),
            Cell::new(row.count),
            derived(&row.mean),
        ]);
    }
    out
}

fn reason(reason: &NotEvaluableReason) -> String {
    match reason {
        NotEvaluableReason::NoReadings => "no readings".to_string(),
        NotEvaluableReason::MissingPair => "missing pair".to_string(),
        NotEvaluableReason::Undefined(undefined) => undefined.to_string(),
    }
}

fn outcome<T>(outcome: &FlagOutcome<T>, show: impl Fn(&T) -> String) -> String {
    match outcome {
        FlagOutcome::Flagged(reading) => format!("{} !", show(reading)),
        FlagOutcome::Clear(reading) => show(reading),
        FlagOutcome::NotEvaluable(why) => format!("n/a ({})", reason(why)),
    }
}

/// Thresholds, distribution and flagged athletes of one classification run.
pub fn risk_report(report: &RiskReport) -> String {
    let sports = if report.sports.is_empty() {
        "all sports".to_string()
    } else {
        report
            .sports
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut lines = vec![format!(
        "Run {} | {} | {:?} readings | asymmetry > {:.1}%",
        report.run_id, sports, report.selection, report.asymmetry_threshold_pct
    )];

    let mut thresholds = table(["Partition", "Percentile", "N", "Load Threshold"]);
    for threshold in report.load_thresholds.values() {
        thresholds.add_row(vec![
            Cell::new(&threshold.partition),
            Cell::new(format!("p{:.0}", threshold.percentile * 100.0)),
            Cell::new(threshold.sample_size),
            derived(&threshold.value),
        ]);
    }
    lines.push(thresholds.to_string());

    let mut distribution = table(
        std::iter::once("Gender".to_string())
            .chain(RiskLabel::ALL.iter().map(ToString::to_string))
            .chain(std::iter::once("Total".to_string())),
    );
    for gender in report.distribution.genders() {
        let mut cells = vec![Cell::new(gender)];
        for label in RiskLabel::ALL {
            cells.push(Cell::new(format!(
                "{} ({})",
                report.distribution.count(gender, label),
                pct(&report.distribution.pct(gender, label))
            )));
        }
        cells.push(Cell::new(report.distribution.total(gender)));
        distribution.add_row(cells);
    }
    lines.push(distribution.to_string());

    let at_risk: Vec<_> = report
        .assessments
        .iter()
        .filter(|a| a.label != RiskLabel::LowRisk)
        .collect();
    let mut flagged = table(["Athlete", "Team", "Label", "Asymmetry %", "Load / Threshold"]);
    for assessment in &at_risk {
        flagged.add_row(vec![
            Cell::new(&assessment.entity_id),
            Cell::new(&assessment.group_key),
            Cell::new(assessment.label),
            Cell::new(outcome(&assessment.asymmetry, |r| format!("{:.1}", r.asymmetry_pct))),
            Cell::new(outcome(&assessment.load, |r| {
                format!("{:.1} / {:.1}", r.value, r.threshold)
            })),
        ]);
    }
    if !at_risk.is_empty() {
        lines.push(flagged.to_string());
    }

    lines.push(format!(
        "{} athletes fully evaluable, {} missing at least one flag input.",
        report.fully_evaluable, report.not_fully_evaluable
    ));
    if report.out_of_scope > 0 {
        lines.push(format!(
            "{} athletes left out: their teams are outside the sport scope.",
            report.out_of_scope
        ));
    }
    lines.join("\n")
}

fn research_outcome(outcome: &ResearchOutcome) -> Vec<String> {
    match outcome {
        ResearchOutcome::GenderDifference(GenderDifference::Found { metric, effect_size }) => {
            vec![format!("Yes: {metric} differs (effect size {effect_size:.2}).")]
        }
        ResearchOutcome::GenderDifference(GenderDifference::NotFound) => {
            vec!["No meaningful difference with enough athletes per group.".to_string()]
        }
        ResearchOutcome::AsymmetryPrevalence { by_gender, higher } => {
            let mut lines: Vec<String> = by_gender
                .iter()
                .map(|(gender, p)| {
                    format!("{gender}: {} of {} evaluable ({})", p.high, p.evaluated, pct(&p.pct))
                })
                .collect();
            match higher {
                Some(gender) => lines.push(format!("Higher prevalence: {gender}")),
                None => lines.push("No group shows high asymmetry.".to_string()),
            }
            lines
        }
        ResearchOutcome::PerformanceCorrelation { by_gender } => by_gender
            .iter()
            .map(|(gender, c)| match c.r {
                Ok(r) => format!("{gender}: r = {r:.3} over {} athletes", c.pairs),
                Err(reason) => format!("{gender}: n/a ({reason})"),
            })
            .collect(),
        ResearchOutcome::AsymmetryLoad(load) => vec![
            format!(
                "High asymmetry: {} athletes, mean load {}",
                load.high.count,
                plain(&load.high.mean)
            ),
            format!(
                "Low asymmetry: {} athletes, mean load {}",
                load.low.count,
                plain(&load.low.mean)
            ),
            format!("Difference: {}", pct(&load.pct_difference)),
        ],
        ResearchOutcome::CombinedRisk { entities } if entities.is_empty() => {
            vec!["No athlete exceeds both thresholds.".to_string()]
        }
        ResearchOutcome::CombinedRisk { entities } => vec![entities.join(", ")],
        ResearchOutcome::Recommendation(Recommendation::TargetIntervention { entities }) => {
            vec![format!("Target intervention for: {}", entities.join(", "))]
        }
        ResearchOutcome::Recommendation(Recommendation::MonitorCohort {
            gender,
            prevalence_pct,
        }) => vec![format!(
            "Monitor the {gender} cohort ({prevalence_pct:.1}% high asymmetry)."
        )],
        ResearchOutcome::Recommendation(Recommendation::RoutineMonitoring) => {
            vec!["Continue routine monitoring.".to_string()]
        }
    }
}

fn plain(value: &Derived) -> String {
    match value {
        Ok(v) => format!("{v:.2}"),
        Err(reason) => format!("n/a ({reason})"),
    }
}

pub fn research(answers: &[ResearchAnswer]) -> String {
    let mut lines = Vec::new();
    for answer in answers {
        lines.push(format!("{}. {}", answer.question, answer.question.text()));
        lines.extend(research_outcome(&answer.outcome).into_iter().map(|l| format!("    {l}")));
    }
    lines.join("\n")
}
