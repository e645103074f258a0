use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::{AnalysisConfig, ReadingSelection};
use core_types::{Gender, Measurement, Partition, RiskLabel, Sport, Undefined};
use risk::{FlagOutcome, NotEvaluableReason, RiskClassifier, ThresholdRiskClassifier};

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 1, 17, 55, 56).unwrap() + Duration::days(n)
}

fn m(entity: &str, team: &str, metric: &str, value: f64, at: i64) -> Measurement {
    Measurement::new(entity, team, metric, Some(value), day(at)).unwrap()
}

fn load(entity: &str, team: &str, value: f64) -> Measurement {
    m(entity, team, "accel_load_accum", value, 1)
}

fn pair(entity: &str, team: &str, left: f64, right: f64, at: i64) -> [Measurement; 2] {
    [
        m(entity, team, "leftMaxForce", left, at),
        m(entity, team, "rightMaxForce", right, at),
    ]
}

/// Ten men with loads 100..=1000 (90th percentile 910), three women with
/// loads 10, 20, 30 (90th percentile 28) and a football player outside scope.
fn snapshot() -> Vec<Measurement> {
    let mut rows = Vec::new();
    for i in 1..=10 {
        rows.push(load(&format!("M{i}"), "Mens Basketball", i as f64 * 100.0));
    }
    for (i, value) in [10.0, 20.0, 30.0].into_iter().enumerate() {
        rows.push(load(&format!("W{}", i + 1), "Women's Basketball", value));
    }
    rows.push(load("F1", "Mens Football", 5000.0));

    // older balanced test, then the current 20% asymmetry, then a one-sided retest
    rows.extend(pair("M1", "Mens Basketball", 100.0, 100.0, 0));
    rows.extend(pair("M1", "Mens Basketball", 100.0, 80.0, 1));
    rows.push(m("M1", "Mens Basketball", "leftMaxForce", 101.0, 2));

    rows.extend(pair("M2", "Mens Basketball", 0.0, 0.0, 1));
    rows.push(m("M3", "Mens Basketball", "leftMaxForce", 351.0, 1));
    rows.extend(pair("M4", "Mens Basketball", 90.0, 100.0, 1));
    rows.extend(pair("M10", "Mens Basketball", 100.0, 85.0, 1));
    rows
}

fn classify(config: &AnalysisConfig) -> risk::RiskReport {
    ThresholdRiskClassifier::new(config)
        .unwrap()
        .classify(&snapshot())
        .unwrap()
}

#[test]
fn labels_follow_the_classification_table() {
    let report = classify(&AnalysisConfig::default());

    assert_eq!(report.assessments.len(), 13);
    assert!(report.assessment("F1").is_none());
    assert_eq!(report.out_of_scope, 1);

    let m10 = report.assessment("M10").unwrap();
    assert_eq!(m10.label, RiskLabel::CombinedRisk);
    assert_eq!(m10.gender, Gender::Male);
    assert_eq!(m10.sport, Sport::Basketball);

    assert_eq!(report.assessment("M1").unwrap().label, RiskLabel::HighAsymmetry);
    assert_eq!(report.assessment("W3").unwrap().label, RiskLabel::HighLoad);
    assert_eq!(report.assessment("M5").unwrap().label, RiskLabel::LowRisk);
}

#[test]
fn asymmetry_uses_the_latest_complete_pair() {
    let report = classify(&AnalysisConfig::default());
    let m1 = report.assessment("M1").unwrap();
    let reading = m1.asymmetry.reading().unwrap();
    assert_eq!(reading.timestamp, day(1));
    assert!((reading.asymmetry_pct - 20.0).abs() < 1e-9);
    assert_eq!(m1.evaluated_at, Some(day(1)));
}

#[test]
fn load_threshold_is_per_gender() {
    let report = classify(&AnalysisConfig::default());

    let male = &report.load_thresholds[&Partition::new("Male")];
    assert_eq!(male.sample_size, 10);
    assert!((male.value.unwrap() - 910.0).abs() < 1e-9);
    let female = &report.load_thresholds[&Partition::new("Female")];
    assert!((female.value.unwrap() - 28.0).abs() < 1e-9);

    // 30 is far below the men's threshold but above the women's
    assert!(report.assessment("W3").unwrap().load.is_flagged());
    assert!(!report.assessment("M9").unwrap().load.is_flagged());
}

#[test]
fn unevaluable_asymmetry_is_not_clear() {
    let report = classify(&AnalysisConfig::default());

    let m2 = report.assessment("M2").unwrap();
    assert_eq!(
        m2.asymmetry,
        FlagOutcome::NotEvaluable(NotEvaluableReason::Undefined(Undefined::DivideByZero))
    );
    assert_eq!(m2.label, RiskLabel::LowRisk);

    let m3 = report.assessment("M3").unwrap();
    assert_eq!(m3.asymmetry, FlagOutcome::NotEvaluable(NotEvaluableReason::MissingPair));

    let m5 = report.assessment("M5").unwrap();
    assert_eq!(m5.asymmetry, FlagOutcome::NotEvaluable(NotEvaluableReason::NoReadings));

    // exactly at the threshold: evaluated and clear
    let m4 = report.assessment("M4").unwrap();
    assert!(m4.asymmetry.is_evaluable());
    assert!(!m4.asymmetry.is_flagged());

    assert_eq!(report.fully_evaluable, 3);
    assert_eq!(report.not_fully_evaluable, 10);
}

#[test]
fn distribution_counts_every_assessed_athlete() {
    let report = classify(&AnalysisConfig::default());
    let dist = &report.distribution;
    assert_eq!(dist.total(Gender::Male), 10);
    assert_eq!(dist.count(Gender::Male, RiskLabel::CombinedRisk), 1);
    assert_eq!(dist.count(Gender::Male, RiskLabel::HighAsymmetry), 1);
    assert_eq!(dist.count(Gender::Female, RiskLabel::HighLoad), 1);
    assert_eq!(dist.count(Gender::Female, RiskLabel::CombinedRisk), 0);
    assert!((dist.pct(Gender::Male, RiskLabel::LowRisk).unwrap() - 80.0).abs() < 1e-9);
    assert_eq!(dist.pct(Gender::Unknown, RiskLabel::LowRisk), Err(Undefined::MissingData));
    assert_eq!(dist.cells().len(), 8);
}

#[test]
fn single_sport_runs_ignore_other_sports() {
    let classifier = ThresholdRiskClassifier::new(&AnalysisConfig::default())
        .unwrap()
        .for_sport(Sport::Football);
    let report = classifier.classify(&snapshot()).unwrap();
    assert_eq!(report.sports, vec![Sport::Football]);
    assert_eq!(report.assessments.len(), 1);
    // a lone reading equals its own percentile, so it is not above it
    assert_eq!(report.assessments[0].label, RiskLabel::LowRisk);
}

#[test]
fn unrecognised_teams_are_assessed_or_counted() {
    let mut rows = vec![load("B1", "Mens Basketball", 100.0), load("U1", "", 999.0)];
    rows.extend(pair("U2", "Track", 100.0, 50.0, 1));

    let report = ThresholdRiskClassifier::new(&AnalysisConfig::default())
        .unwrap()
        .classify(&rows)
        .unwrap();

    // a blank team has no known sport and stays in the run
    let u1 = report.assessment("U1").unwrap();
    assert_eq!((u1.gender, u1.sport), (Gender::Unknown, Sport::Unknown));
    assert!(report.load_thresholds.contains_key(&Partition::new("Unknown")));
    assert_eq!(report.distribution.total(Gender::Unknown), 1);

    // a recognised sport outside the scope is left out but counted
    assert!(report.assessment("U2").is_none());
    assert_eq!(report.out_of_scope, 1);
    assert_eq!(report.assessments.len() + report.out_of_scope, 3);
}

#[test]
fn open_scope_assesses_every_team() {
    let mut config = AnalysisConfig::default();
    config.scope.sports.clear();
    let report = classify(&config);
    assert_eq!(report.out_of_scope, 0);
    assert_eq!(report.assessment("F1").unwrap().sport, Sport::Football);
}

#[test]
fn mean_selection_flags_athlete_averages() {
    let mut config = AnalysisConfig::default();
    config.load.selection = ReadingSelection::Mean;
    let report = classify(&config);

    assert_eq!(report.selection, ReadingSelection::Mean);
    // M1 averages to left 100.33, right 90 over all tests
    let m1 = report.assessment("M1").unwrap();
    let reading = m1.asymmetry.reading().unwrap();
    assert!((reading.left - 301.0 / 3.0).abs() < 1e-9);
    assert!((reading.right - 90.0).abs() < 1e-9);
    assert!(m1.asymmetry.is_flagged());
    assert_eq!(m1.evaluated_at, Some(day(2)));
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = AnalysisConfig::default();
    config.load.percentile = 1.2;
    assert!(matches!(
        ThresholdRiskClassifier::new(&config),
        Err(risk::RiskError::InvalidParameters(_))
    ));
}

#[test]
fn outcomes_serialize_with_a_status_tag() {
    let report = classify(&AnalysisConfig::default());
    let json = serde_json::to_value(report.assessment("M2").unwrap()).unwrap();
    assert_eq!(json["asymmetry"]["status"], "not_evaluable");
    let json = serde_json::to_value(report.assessment("M10").unwrap()).unwrap();
    assert_eq!(json["asymmetry"]["status"], "flagged");
    assert_eq!(json["label"], "CombinedRisk");
}
