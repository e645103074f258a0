use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Risk classification failed: {0}")]
    Risk(#[from] risk::RiskError),
}
