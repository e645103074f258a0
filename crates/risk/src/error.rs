use analytics::AnalyticsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Risk parameters from configuration are invalid: {0}")]
    InvalidParameters(String),

    #[error("Failed to compute partition statistics: {0}")]
    Analytics(#[from] AnalyticsError),
}
