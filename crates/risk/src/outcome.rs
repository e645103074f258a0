use core_types::Undefined;
use serde::{Deserialize, Serialize};

/// Result of evaluating one flag condition for one athlete.
///
/// `NotEvaluable` is distinct from `Clear`: an athlete with no usable data is
/// never reported as passing the check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum FlagOutcome<T> {
    Flagged(T),
    Clear(T),
    NotEvaluable(NotEvaluableReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotEvaluableReason {
    /// No reading of the metric at all.
    NoReadings,
    /// Only one side of a bilateral test was recorded.
    MissingPair,
    /// Readings exist but the derived value does not.
    Undefined(Undefined),
}

impl<T> FlagOutcome<T> {
    pub fn is_flagged(&self) -> bool {
        matches!(self, FlagOutcome::Flagged(_))
    }

    pub fn is_evaluable(&self) -> bool {
        !matches!(self, FlagOutcome::NotEvaluable(_))
    }

    /// The reading behind the outcome, flagged or not.
    pub fn reading(&self) -> Option<&T> {
        match self {
            FlagOutcome::Flagged(reading) | FlagOutcome::Clear(reading) => Some(reading),
            FlagOutcome::NotEvaluable(_) => None,
        }
    }

    pub(crate) fn from_check(flagged: bool, reading: T) -> Self {
        if flagged {
            FlagOutcome::Flagged(reading)
        } else {
            FlagOutcome::Clear(reading)
        }
    }
}
