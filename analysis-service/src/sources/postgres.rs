use energy_client::{db::reading_queries, domain::Reading};
use sqlx::postgres::{PgPool, PgPoolOptions};
use time::OffsetDateTime;

use crate::config::DatabaseConfig;
use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

pub async fn connect(cfg: &DatabaseConfig) -> Result<PgPool, PipelineError> {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.uri)
        .await
        .map_err(|e| PipelineError::Source(format!("failed to connect to database: {e}")))
}

/// Readings joined with their meter and group, optionally limited to an
/// ingestion window `[start, end)`.
#[derive(Clone)]
pub struct PostgresReadingSource {
    pool: PgPool,
    window: Option<(OffsetDateTime, OffsetDateTime)>,
}

impl PostgresReadingSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, window: None }
    }

    pub fn with_window(pool: PgPool, start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self {
            pool,
            window: Some((start, end)),
        }
    }
}

#[async_trait::async_trait]
impl Source<Reading> for PostgresReadingSource {
    async fn stream(&self) -> EnvelopeStream<Reading> {
        let pool = self.pool.clone();
        let window = self.window;
        let s = async_stream::try_stream! {
            let rows = match window {
                Some((start, end)) => reading_queries::readings_between(&pool, start, end).await,
                None => reading_queries::all_readings(&pool).await,
            }
            .map_err(|e| {
                metrics::counter!("reading_source_query_errors_total").increment(1);
                PipelineError::Source(format!("failed to query readings: {e}"))
            })?;

            tracing::debug!(rows = rows.len(), windowed = window.is_some(), "readings fetched");
            for reading in rows {
                yield Envelope::now(reading);
            }
        };

        Box::pin(s)
    }
}
