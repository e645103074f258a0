use crate::outcome::{FlagOutcome, NotEvaluableReason};
use chrono::{DateTime, Utc};
use core_types::{Derived, Side, Undefined};
use serde::{Deserialize, Serialize};

/// A bilateral force test evaluated against the asymmetry threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsymmetryReading {
    pub left: f64,
    pub right: f64,
    pub strong: f64,
    pub weak: f64,
    pub stronger_side: Side,
    pub asymmetry_pct: f64,
    pub threshold_pct: f64,
    pub timestamp: DateTime<Utc>,
}

/// `(strong - weak) / strong * 100`, where `strong` is the larger side.
pub fn asymmetry_pct(left: f64, right: f64) -> Derived {
    let strong = left.max(right);
    let weak = left.min(right);
    if strong == 0.0 {
        return Err(Undefined::DivideByZero);
    }
    Ok((strong - weak) / strong * 100.0)
}

/// Flags the pair when its asymmetry strictly exceeds `threshold_pct`.
///
/// A missing side or a zero strong side makes the athlete not evaluable.
pub fn evaluate_asymmetry(
    left: Option<f64>,
    right: Option<f64>,
    threshold_pct: f64,
    timestamp: DateTime<Utc>,
) -> FlagOutcome<AsymmetryReading> {
    let (left, right) = match (left, right) {
        (Some(left), Some(right)) => (left, right),
        (None, None) => return FlagOutcome::NotEvaluable(NotEvaluableReason::NoReadings),
        _ => return FlagOutcome::NotEvaluable(NotEvaluableReason::MissingPair),
    };
    let pct = match asymmetry_pct(left, right) {
        Ok(pct) => pct,
        Err(reason) => return FlagOutcome::NotEvaluable(NotEvaluableReason::Undefined(reason)),
    };
    let reading = AsymmetryReading {
        left,
        right,
        strong: left.max(right),
        weak: left.min(right),
        stronger_side: Side::stronger(left, right),
        asymmetry_pct: pct,
        threshold_pct,
        timestamp,
    };
    FlagOutcome::from_check(pct > threshold_pct, reading)
}
