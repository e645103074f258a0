use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Percentile must be a finite fraction in [0, 1], got {0}")]
    InvalidPercentile(f64),
}
