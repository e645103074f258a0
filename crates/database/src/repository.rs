use crate::DbError;
use crate::snapshot::{Snapshot, build};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgPool;

/// The `DbRepository` provides a read-only interface to the measurement
/// table. It never writes.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches every reading of the given metrics, nulls included.
    ///
    /// The table name cannot be bound as a parameter, so it is checked with
    /// [`validate_table_name`] before being spliced into the query.
    pub async fn fetch_measurements(
        &self,
        table: &str,
        metrics: &[String],
    ) -> Result<Snapshot, DbError> {
        validate_table_name(table)?;
        let query = format!(
            r#"
            SELECT playername, team, metric, value::float8 AS value, "timestamp"::timestamptz AS ts
            FROM {table}
            WHERE metric = ANY($1)
            ORDER BY playername, ts
            "#
        );
        let rows = sqlx::query(&query)
            .bind(metrics.to_vec())
            .fetch_all(&self.pool)
            .await?;

        let mut snapshot = Snapshot::default();
        for row in rows {
            let entity: Option<String> = row.try_get("playername")?;
            let team: Option<String> = row.try_get("team")?;
            let metric: Option<String> = row.try_get("metric")?;
            let value: Option<f64> = row.try_get("value")?;
            let timestamp: Option<DateTime<Utc>> = row.try_get("ts")?;
            snapshot.push(build(
                entity.as_deref().unwrap_or(""),
                team.as_deref().unwrap_or(""),
                metric.as_deref().unwrap_or(""),
                value,
                timestamp,
            ));
        }
        snapshot.summary.log(table);
        Ok(snapshot)
    }
}

/// Accepts `table` or `schema.table` made of ASCII letters, digits and underscores.
pub fn validate_table_name(table: &str) -> Result<(), DbError> {
    let valid_part = |part: &str| {
        !part.is_empty()
            && !part.starts_with(|c: char| c.is_ascii_digit())
            && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|p| valid_part(p)) {
        Ok(())
    } else {
        Err(DbError::InvalidTableName(table.to_string()))
    }
}
