use std::path::PathBuf;

use async_stream::try_stream;
use energy_client::domain::Reading;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// Newline-delimited JSON export of readings.
///
/// Each non-blank line is an object with `id`, `raw_json`, `ts` (RFC 3339),
/// `meter_id`, `meter_number` and `group_name`. `raw_json` is kept verbatim;
/// decoding happens later.
pub struct NdjsonReadingSource {
    path: PathBuf,
}

impl NdjsonReadingSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Source<Reading> for NdjsonReadingSource {
    async fn stream(&self) -> EnvelopeStream<Reading> {
        let path = self.path.clone();
        let s = try_stream! {
            let file = File::open(&path).await.map_err(|e| {
                PipelineError::Source(format!("failed to open readings file {}: {e}", path.display()))
            })?;
            let mut lines = BufReader::new(file).lines();
            let mut line_no = 0usize;

            while let Some(line) = lines.next_line().await.map_err(|e| {
                PipelineError::Source(format!("failed to read readings line: {e}"))
            })? {
                line_no += 1;
                if line.trim().is_empty() {
                    continue;
                }

                let reading: Reading = match serde_json::from_str(&line) {
                    Ok(v) => v,
                    Err(e) => {
                        metrics::counter!("ndjson_reading_parse_errors_total").increment(1);
                        Err(PipelineError::Source(format!(
                            "failed to parse reading on line {line_no}: {e}"
                        )))?
                    }
                };
                yield Envelope::now(reading);
            }
        };

        Box::pin(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::collect_payloads;
    use std::io::Write;
    use time::macros::datetime;

    #[tokio::test]
    async fn reads_readings_and_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"id":"6f1c2f54-3c1e-4a4e-9c55-0d6f4b7f2a10","raw_json":"{{\"Value\": 1.5}}","ts":"2024-03-01T12:00:00Z","meter_id":7,"meter_number":"M-7","group_name":"North"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"id":"0b6f3f7e-8d0a-4a55-b7a6-3f1d9e0c2b44","raw_json":"{{\"Value\": \"oops\"}}","ts":"2024-03-02T00:15:00+01:00","meter_id":8,"meter_number":"M-8","group_name":"South"}}"#
        )
        .unwrap();

        let source = NdjsonReadingSource::new(file.path());
        let readings = collect_payloads(&source).await.unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].raw_json, r#"{"Value": 1.5}"#);
        assert_eq!(readings[0].meter_number, "M-7");
        assert_eq!(readings[1].ts, datetime!(2024-03-01 23:15:00 UTC));
        assert_eq!(readings[1].group_name, "South");
    }

    #[tokio::test]
    async fn reads_back_serialized_readings() {
        let exported = Reading {
            id: uuid::Uuid::new_v4(),
            raw_json: r#"{ "Value": 39300000000000000000000000000200 }"#.to_string(),
            ts: datetime!(2024-03-01 06:45:00 UTC),
            meter_id: 3,
            meter_number: "M-3".to_string(),
            group_name: "East".to_string(),
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", serde_json::to_string(&exported).unwrap()).unwrap();

        let source = NdjsonReadingSource::new(file.path());
        let readings = collect_payloads(&source).await.unwrap();
        assert_eq!(readings, vec![exported]);
    }

    #[tokio::test]
    async fn invalid_line_is_a_source_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{not json").unwrap();

        let source = NdjsonReadingSource::new(file.path());
        let err = collect_payloads(&source).await.unwrap_err();
        assert!(matches!(err, PipelineError::Source(msg) if msg.contains("line 1")));
    }

    #[tokio::test]
    async fn missing_file_is_a_source_error() {
        let source = NdjsonReadingSource::new("/nonexistent/readings.ndjson");
        assert!(collect_payloads(&source).await.is_err());
    }
}
