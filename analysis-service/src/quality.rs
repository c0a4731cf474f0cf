use energy_client::domain::Reading;
use serde::Serialize;

use crate::decoder::{self, DecodeError};

/// Decode outcomes of a reading set, split by failure kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FailureBreakdown {
    pub decoded: usize,
    pub missing_field: usize,
    pub malformed_envelope: usize,
    pub unrecognized_encoding: usize,
    pub invalid_decimal: usize,
}

impl FailureBreakdown {
    pub fn from_readings<'a, I>(readings: I) -> Self
    where
        I: IntoIterator<Item = &'a Reading>,
    {
        let mut breakdown = Self::default();
        for reading in readings {
            match decoder::try_decode(&reading.raw_json) {
                Ok(_) => breakdown.decoded += 1,
                Err(e) => {
                    tracing::debug!(
                        reading_id = %reading.id,
                        meter = %reading.meter_number,
                        kind = e.kind(),
                        "reading skipped"
                    );
                    breakdown.record(e);
                }
            }
        }
        breakdown
    }

    fn record(&mut self, error: DecodeError) {
        match error {
            DecodeError::MissingField => self.missing_field += 1,
            DecodeError::MalformedEnvelope => self.malformed_envelope += 1,
            DecodeError::UnrecognizedEncoding => self.unrecognized_encoding += 1,
            DecodeError::InvalidDecimal => self.invalid_decimal += 1,
        }
    }

    pub fn total_failed(&self) -> usize {
        self.missing_field + self.malformed_envelope + self.unrecognized_encoding + self.invalid_decimal
    }

    /// `(kind, count)` rows in a fixed order.
    pub fn rows(&self) -> [(&'static str, usize); 4] {
        [
            (DecodeError::MissingField.kind(), self.missing_field),
            (DecodeError::MalformedEnvelope.kind(), self.malformed_envelope),
            (DecodeError::UnrecognizedEncoding.kind(), self.unrecognized_encoding),
            (DecodeError::InvalidDecimal.kind(), self.invalid_decimal),
        ]
    }
}
