use std::{fs::File, path::PathBuf};

use csv::StringRecord;
use energy_client::domain::Reading;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// Delimited-text export of readings.
///
/// Expected header columns (by name, any order):
/// - id (UUID)
/// - raw_json
/// - ts (RFC3339 timestamp)
/// - meter_id
/// - meter_number
/// - group_name
///
/// `.dat` exports use the same columns separated by `|`.
pub struct CsvReadingSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvReadingSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::with_delimiter(path, b',')
    }

    pub fn with_delimiter<P: Into<PathBuf>>(path: P, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            delimiter,
        }
    }
}

fn record_to_reading(record: &StringRecord, headers: &StringRecord) -> Result<Reading, PipelineError> {
    let get = |name: &str| -> Result<&str, PipelineError> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| record.get(idx))
            .ok_or_else(|| PipelineError::Source(format!("missing column '{name}' in readings record")))
    };

    let id_str = get("id")?;
    let id = Uuid::parse_str(id_str.trim())
        .map_err(|e| PipelineError::Source(format!("invalid id '{id_str}': {e}")))?;

    let ts_str = get("ts")?;
    let ts = OffsetDateTime::parse(ts_str.trim(), &time::format_description::well_known::Rfc3339)
        .map_err(|e| PipelineError::Source(format!("invalid ts '{ts_str}': {e}")))?;

    let meter_id_str = get("meter_id")?;
    let meter_id: i32 = meter_id_str
        .trim()
        .parse()
        .map_err(|e| PipelineError::Source(format!("invalid meter_id '{meter_id_str}': {e}")))?;

    Ok(Reading {
        id,
        // The payload is kept byte-for-byte; whitespace may matter to the decoder.
        raw_json: get("raw_json")?.to_string(),
        ts,
        meter_id,
        meter_number: get("meter_number")?.trim().to_string(),
        group_name: get("group_name")?.trim().to_string(),
    })
}

#[async_trait::async_trait]
impl Source<Reading> for CsvReadingSource {
    async fn stream(&self) -> EnvelopeStream<Reading> {
        // Blocking reader inside a single async task; exports are read once per run.
        let path = self.path.clone();
        let delimiter = self.delimiter;
        let s = async_stream::try_stream! {
            let file = File::open(&path).map_err(|e| {
                PipelineError::Source(format!("failed to open readings file {}: {e}", path.display()))
            })?;
            let mut rdr = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .from_reader(file);
            let headers = rdr
                .headers()
                .map_err(|e| PipelineError::Source(format!("failed to read headers: {e}")))?
                .clone();

            for result in rdr.records() {
                let record = result.map_err(|e| PipelineError::Source(format!(
                    "failed to read readings record: {e}"
                )))?;

                let reading = match record_to_reading(&record, &headers) {
                    Ok(r) => r,
                    Err(e) => {
                        metrics::counter!("csv_reading_parse_errors_total").increment(1);
                        Err(e)?
                    }
                };

                yield Envelope::now(reading);
            }
        };

        Box::pin(s)
    }
}
