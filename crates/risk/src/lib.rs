//! # perfmon Flagging Component
//!
//! Turns a measurement snapshot into per-athlete risk assessments: bilateral
//! force asymmetry, load above the partition percentile, and a risk label
//! chosen by an ordered classification table.
//!
//! Conditions that cannot be checked (a missing side, a zero strong side, no
//! load reading) come back as `FlagOutcome::NotEvaluable` and never satisfy a
//! rule.

pub mod asymmetry;
pub mod classifier;
pub mod distribution;
pub mod error;
pub mod load;
pub mod outcome;
pub mod report;
pub mod threshold_classifier;

use core_types::Measurement;

pub use asymmetry::{AsymmetryReading, asymmetry_pct, evaluate_asymmetry};
pub use classifier::{CLASSIFICATION_RULES, ClassificationRule, FlagSet};
pub use distribution::{DistributionCell, RiskDistribution};
pub use error::RiskError;
pub use load::{LoadReading, LoadThreshold, evaluate_load};
pub use outcome::{FlagOutcome, NotEvaluableReason};
pub use report::{RiskAssessment, RiskReport};
pub use threshold_classifier::ThresholdRiskClassifier;

/// Defines the interface for classifying athletes from a snapshot.
pub trait RiskClassifier {
    fn classify(&self, snapshot: &[Measurement]) -> Result<RiskReport, RiskError>;
}
