use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}

/// Why a derived number could not be produced.
///
/// These are not failures of the run: a batch over thousands of athletes keeps
/// going and the affected statistic is reported with its reason.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Undefined {
    #[error("no non-null observations")]
    MissingData,

    #[error("need at least {required} observations, found {found}")]
    InsufficientSample { required: usize, found: usize },

    #[error("denominator is zero")]
    DivideByZero,
}

/// A derived statistic: either a finite value or the reason it does not exist.
pub type Derived = Result<f64, Undefined>;
