//! Single-pass reducers over decoded reading values.
//!
//! Every reducer decodes each reading itself and counts decode failures the
//! same way, so over one reading set the three skip counts are always equal.

use energy_client::domain::Reading;
use serde::Serialize;

use crate::decoder;

/// Sum of the values a reducer accepted, plus the number of readings that
/// failed to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Total {
    pub value: f64,
    pub skipped: usize,
}

fn reduce<'a, I, F>(readings: I, contribution: F) -> Total
where
    I: IntoIterator<Item = &'a Reading>,
    F: Fn(f64) -> f64,
{
    readings
        .into_iter()
        .fold(Total::default(), |mut total, reading| {
            match decoder::decode(&reading.raw_json) {
                Some(v) => total.value += contribution(v),
                None => total.skipped += 1,
            }
            total
        })
}

/// Signed sum of every decoded value.
pub fn calculate_net<'a, I>(readings: I) -> Total
where
    I: IntoIterator<Item = &'a Reading>,
{
    reduce(readings, |v| v)
}

/// Sum of strictly positive decoded values.
pub fn calculate_produced<'a, I>(readings: I) -> Total
where
    I: IntoIterator<Item = &'a Reading>,
{
    reduce(readings, |v| if v > 0.0 { v } else { 0.0 })
}

/// Sum of the magnitudes of strictly negative decoded values.
pub fn calculate_consumed<'a, I>(readings: I) -> Total
where
    I: IntoIterator<Item = &'a Reading>,
{
    reduce(readings, |v| if v < 0.0 { v.abs() } else { 0.0 })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScalarSummary {
    pub net: f64,
    pub produced: f64,
    pub consumed: f64,
    pub skipped_net: usize,
    pub skipped_produced: usize,
    pub skipped_consumed: usize,
}

impl ScalarSummary {
    pub fn from_readings(readings: &[Reading]) -> Self {
        let net = calculate_net(readings);
        let produced = calculate_produced(readings);
        let consumed = calculate_consumed(readings);

        Self {
            net: net.value,
            produced: produced.value,
            consumed: consumed.value,
            skipped_net: net.skipped,
            skipped_produced: produced.skipped,
            skipped_consumed: consumed.skipped,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use energy_client::domain::Reading;
    use time::{macros::datetime, OffsetDateTime};
    use uuid::Uuid;

    pub fn reading(raw_json: &str) -> Reading {
        reading_at(raw_json, datetime!(2024-03-01 12:00:00 UTC), "M-1", "North")
    }

    pub fn reading_at(
        raw_json: &str,
        ts: OffsetDateTime,
        meter_number: &str,
        group_name: &str,
    ) -> Reading {
        Reading {
            id: Uuid::new_v4(),
            raw_json: raw_json.to_string(),
            ts,
            meter_id: 1,
            meter_number: meter_number.to_string(),
            group_name: group_name.to_string(),
        }
    }

    pub fn value(v: &str) -> String {
        format!(r#"{{ "Value": {v} }}"#)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{reading, value};
    use super::*;
    use crate::decoder::fixed_point::encode_hex;

    fn readings(values: &[&str]) -> Vec<Reading> {
        values.iter().map(|v| reading(&value(v))).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 0.005, "got {actual}, expected {expected}");
    }

    #[test]
    fn net_sums_all_encodings() {
        let three = format!("\"{}\"", encode_hex(3, 0, false).unwrap());
        let rs = readings(&["10", "20", &three]);
        let net = calculate_net(&rs);
        assert_close(net.value, 33.0);
        assert_eq!(net.skipped, 0);
    }

    #[test]
    fn net_counts_undecodable_readings() {
        let rs = readings(&["10", "\"not-a-number\""]);
        let net = calculate_net(&rs);
        assert_close(net.value, 10.0);
        assert_eq!(net.skipped, 1);
    }

    #[test]
    fn produced_ignores_zero_and_negative() {
        let rs = readings(&["10", "-5", "0"]);
        let produced = calculate_produced(&rs);
        assert_close(produced.value, 10.0);
        assert_eq!(produced.skipped, 0);
    }

    #[test]
    fn consumed_sums_negative_magnitudes() {
        let rs = readings(&["-10", "5", "-2.5"]);
        let consumed = calculate_consumed(&rs);
        assert_close(consumed.value, 12.5);
        assert_eq!(consumed.skipped, 0);
    }

    #[test]
    fn empty_input_yields_zero_for_every_reducer() {
        let rs: Vec<Reading> = Vec::new();
        assert_eq!(calculate_net(&rs), Total::default());
        assert_eq!(calculate_produced(&rs), Total::default());
        assert_eq!(calculate_consumed(&rs), Total::default());
    }

    #[test]
    fn all_failures_are_skipped_by_every_reducer() {
        let rs = readings(&["\"something but a number!!:D\"", "\"\"", "null"]);
        for total in [calculate_net(&rs), calculate_produced(&rs), calculate_consumed(&rs)] {
            assert_eq!(total, Total { value: 0.0, skipped: 3 });
        }
    }

    #[test]
    fn summary_skip_counts_agree() {
        let rs = readings(&["1", "\"x\"", "-2", "true", "3.5"]);
        let summary = ScalarSummary::from_readings(&rs);
        assert_eq!(summary.skipped_net, 2);
        assert_eq!(summary.skipped_produced, summary.skipped_net);
        assert_eq!(summary.skipped_consumed, summary.skipped_net);
    }

    #[test]
    fn net_is_produced_minus_consumed_without_skips() {
        let rs = readings(&["1.25", "-7", "0", "12", "-0.5", "\"4.75\""]);
        let summary = ScalarSummary::from_readings(&rs);
        assert_eq!(summary.skipped_net, 0);
        assert_close(summary.net, summary.produced - summary.consumed);
        assert_close(summary.produced, 18.0);
        assert_close(summary.consumed, 7.5);
    }

    #[test]
    fn reducers_accept_borrowed_subsets() {
        let rs = readings(&["4", "-1", "6"]);
        let subset: Vec<&Reading> = rs.iter().filter(|r| r.raw_json.contains('6')).collect();
        assert_close(calculate_produced(subset.iter().copied()).value, 6.0);
    }
}
