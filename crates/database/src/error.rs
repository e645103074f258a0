use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Refusing to query table name '{0}'")]
    InvalidTableName(String),

    #[error("Snapshot file is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("Failed to read snapshot file: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
