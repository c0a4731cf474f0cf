pub mod csv_file;
pub mod ndjson_file;
pub mod postgres;

pub use csv_file::CsvReadingSource;
pub use ndjson_file::NdjsonReadingSource;
pub use postgres::PostgresReadingSource;

use std::path::Path;

use energy_client::domain::Reading;
use sqlx::PgPool;

use crate::config::{AppConfig, SourceKind};
use crate::pipeline::{EnvelopeStream, PipelineError, Source};

/// The reading source selected by configuration or by file extension.
pub enum ConfiguredSource {
    Postgres(PostgresReadingSource),
    Ndjson(NdjsonReadingSource),
    Csv(CsvReadingSource),
}

impl ConfiguredSource {
    /// Build the source named in `[source]`. A Postgres source needs `pool`.
    pub fn from_config(cfg: &AppConfig, pool: Option<PgPool>) -> Result<Self, PipelineError> {
        let src = &cfg.source;
        match src.kind {
            SourceKind::Postgres => {
                let pool = pool.ok_or_else(|| {
                    PipelineError::Config("postgres source requires a [database] section".to_string())
                })?;
                Ok(Self::Postgres(PostgresReadingSource::new(pool)))
            }
            SourceKind::Ndjson => Ok(Self::Ndjson(NdjsonReadingSource::new(src.require_path()?))),
            SourceKind::Csv => Ok(Self::Csv(CsvReadingSource::with_delimiter(
                src.require_path()?,
                src.delimiter_byte()?,
            ))),
        }
    }

    /// Pick a file source from the extension: `.ndjson`/`.jsonl`/`.json`,
    /// `.csv` or pipe-delimited `.dat`.
    pub fn for_file(path: &Path) -> Result<Self, PipelineError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "ndjson" | "jsonl" | "json" => Ok(Self::Ndjson(NdjsonReadingSource::new(path))),
            "csv" => Ok(Self::Csv(CsvReadingSource::new(path))),
            "dat" => Ok(Self::Csv(CsvReadingSource::with_delimiter(path, b'|'))),
            other => Err(PipelineError::Config(format!(
                "unsupported readings file extension '{other}' for {}",
                path.display()
            ))),
        }
    }
}

#[async_trait::async_trait]
impl Source<Reading> for ConfiguredSource {
    async fn stream(&self) -> EnvelopeStream<Reading> {
        match self {
            Self::Postgres(s) => s.stream().await,
            Self::Ndjson(s) => s.stream().await,
            Self::Csv(s) => s.stream().await,
        }
    }
}
