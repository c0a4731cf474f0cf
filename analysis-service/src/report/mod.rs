//! Grouped reports built from one materialized reading set.
//!
//! Partitions keep the order in which their key first appears in the input,
//! except daily production, which is sorted by date.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use energy_client::domain::Reading;
use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::aggregate::{calculate_consumed, calculate_net, calculate_produced, ScalarSummary};
use crate::quality::FailureBreakdown;

pub const DEFAULT_TOP_DEVICES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStats {
    pub meter_number: String,
    pub total_produced: f64,
    pub total_consumed: f64,
    pub reading_count: usize,
    pub skipped_produced: usize,
    pub skipped_consumed: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub first_reading: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_reading: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub group_name: String,
    pub total_produced: f64,
    pub device_count: usize,
    pub reading_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceQuality {
    pub meter_number: String,
    pub skipped_readings: usize,
    pub total_readings: usize,
}

impl DeviceQuality {
    /// Share of skipped readings in percent; 0 for a device without readings.
    pub fn skipped_pct(&self) -> f64 {
        if self.total_readings == 0 {
            0.0
        } else {
            self.skipped_readings as f64 * 100.0 / self.total_readings as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProduction {
    pub date: Date,
    pub total_produced: f64,
    pub skipped: usize,
}

/// Split `readings` by `key`, preserving first-occurrence order of keys.
fn partition_by<'a, K, F>(readings: &'a [Reading], key: F) -> Vec<(K, Vec<&'a Reading>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&'a Reading) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a Reading>)> = Vec::new();

    for reading in readings {
        let k = key(reading);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(reading),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![reading]));
            }
        }
    }

    groups
}

pub fn device_stats(readings: &[Reading]) -> Vec<DeviceStats> {
    partition_by(readings, |r| r.meter_number.as_str())
        .into_iter()
        .map(|(meter_number, group)| {
            let produced = calculate_produced(group.iter().copied());
            let consumed = calculate_consumed(group.iter().copied());
            // Partitions are never empty.
            let (first_reading, last_reading) = group
                .iter()
                .fold((group[0].ts, group[0].ts), |(lo, hi), r| (lo.min(r.ts), hi.max(r.ts)));

            DeviceStats {
                meter_number: meter_number.to_string(),
                total_produced: produced.value,
                total_consumed: consumed.value,
                reading_count: group.len(),
                skipped_produced: produced.skipped,
                skipped_consumed: consumed.skipped,
                first_reading,
                last_reading,
            }
        })
        .collect()
}

/// Highest producers first, truncated to `n`. Ties keep their input order.
pub fn top_producers(mut stats: Vec<DeviceStats>, n: usize) -> Vec<DeviceStats> {
    stats.sort_by(|a, b| b.total_produced.total_cmp(&a.total_produced));
    stats.truncate(n);
    stats
}

pub fn group_stats(readings: &[Reading]) -> Vec<GroupStats> {
    partition_by(readings, |r| r.group_name.as_str())
        .into_iter()
        .map(|(group_name, group)| {
            let produced = calculate_produced(group.iter().copied());
            let devices: HashSet<&str> = group.iter().map(|r| r.meter_number.as_str()).collect();

            GroupStats {
                group_name: group_name.to_string(),
                total_produced: produced.value,
                device_count: devices.len(),
                reading_count: group.len(),
            }
        })
        .collect()
}

pub fn device_quality(readings: &[Reading]) -> Vec<DeviceQuality> {
    partition_by(readings, |r| r.meter_number.as_str())
        .into_iter()
        .map(|(meter_number, group)| DeviceQuality {
            meter_number: meter_number.to_string(),
            skipped_readings: calculate_net(group.iter().copied()).skipped,
            total_readings: group.len(),
        })
        .collect()
}

/// Calendar day of a reading, taken in UTC.
pub fn reading_date(ts: OffsetDateTime) -> Date {
    ts.to_offset(UtcOffset::UTC).date()
}

pub fn daily_production(readings: &[Reading]) -> Vec<DailyProduction> {
    let mut days: Vec<DailyProduction> = partition_by(readings, |r| reading_date(r.ts))
        .into_iter()
        .map(|(date, group)| {
            let produced = calculate_produced(group.iter().copied());
            DailyProduction {
                date,
                total_produced: produced.value,
                skipped: produced.skipped,
            }
        })
        .collect();

    days.sort_by_key(|d| d.date);
    days
}

/// Every report view over one reading set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub reading_count: usize,
    pub summary: ScalarSummary,
    pub top_devices: Vec<DeviceStats>,
    pub groups: Vec<GroupStats>,
    pub quality: Vec<DeviceQuality>,
    pub daily: Vec<DailyProduction>,
    pub failures: FailureBreakdown,
}

impl AnalysisReport {
    pub fn build(readings: &[Reading], top_devices: usize) -> Self {
        Self {
            reading_count: readings.len(),
            summary: ScalarSummary::from_readings(readings),
            top_devices: top_producers(device_stats(readings), top_devices),
            groups: group_stats(readings),
            quality: device_quality(readings),
            daily: daily_production(readings),
            failures: FailureBreakdown::from_readings(readings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{reading_at, value};
    use pretty_assertions::assert_eq;
    use time::macros::{date, datetime};

    fn fixture() -> Vec<Reading> {
        vec![
            reading_at(&value("10"), datetime!(2024-03-02 08:00:00 UTC), "M-1", "North"),
            reading_at(&value("-4"), datetime!(2024-03-01 09:30:00 UTC), "M-1", "North"),
            reading_at(&value("\"bad\""), datetime!(2024-03-02 23:59:59 UTC), "M-2", "North"),
            reading_at(&value("25.5"), datetime!(2024-03-01 10:00:00 UTC), "M-2", "North"),
            reading_at(&value("7"), datetime!(2024-03-03 00:00:00 UTC), "M-3", "South"),
            reading_at(&value("0"), datetime!(2024-03-01 00:00:00 UTC), "M-3", "South"),
        ]
    }

    #[test]
    fn device_stats_per_meter() {
        let stats = device_stats(&fixture());
        assert_eq!(
            stats[0],
            DeviceStats {
                meter_number: "M-1".to_string(),
                total_produced: 10.0,
                total_consumed: 4.0,
                reading_count: 2,
                skipped_produced: 0,
                skipped_consumed: 0,
                first_reading: datetime!(2024-03-01 09:30:00 UTC),
                last_reading: datetime!(2024-03-02 08:00:00 UTC),
            }
        );
        assert_eq!(stats[1].meter_number, "M-2");
        assert_eq!(stats[1].skipped_produced, 1);
        assert_eq!(stats[1].skipped_consumed, 1);
        assert_eq!(stats[1].total_produced, 25.5);
    }

    #[test]
    fn device_reading_counts_cover_every_reading() {
        let readings = fixture();
        let stats = device_stats(&readings);
        assert_eq!(stats.iter().map(|s| s.reading_count).sum::<usize>(), readings.len());
        assert!(stats.iter().all(|s| s.first_reading <= s.last_reading));
    }

    #[test]
    fn top_producers_sorts_descending_and_truncates() {
        let top = top_producers(device_stats(&fixture()), 2);
        let order: Vec<&str> = top.iter().map(|s| s.meter_number.as_str()).collect();
        assert_eq!(order, vec!["M-2", "M-1"]);
    }

    #[test]
    fn top_producers_keeps_input_order_on_ties() {
        let readings = vec![
            reading_at(&value("5"), datetime!(2024-03-01 00:00:00 UTC), "B", "G"),
            reading_at(&value("5"), datetime!(2024-03-01 00:00:00 UTC), "A", "G"),
            reading_at(&value("9"), datetime!(2024-03-01 00:00:00 UTC), "C", "G"),
        ];
        let top = top_producers(device_stats(&readings), DEFAULT_TOP_DEVICES);
        let order: Vec<&str> = top.iter().map(|s| s.meter_number.as_str()).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
    }

    #[test]
    fn group_stats_count_distinct_devices() {
        let groups = group_stats(&fixture());
        assert_eq!(
            groups,
            vec![
                GroupStats {
                    group_name: "North".to_string(),
                    total_produced: 35.5,
                    device_count: 2,
                    reading_count: 4,
                },
                GroupStats {
                    group_name: "South".to_string(),
                    total_produced: 7.0,
                    device_count: 1,
                    reading_count: 2,
                },
            ]
        );
    }

    #[test]
    fn device_quality_uses_net_skips() {
        let quality = device_quality(&fixture());
        let m2 = quality.iter().find(|q| q.meter_number == "M-2").unwrap();
        assert_eq!(m2.skipped_readings, 1);
        assert_eq!(m2.total_readings, 2);
        assert_eq!(m2.skipped_pct(), 50.0);
        assert!(quality.iter().filter(|q| q.meter_number != "M-2").all(|q| q.skipped_readings == 0));
    }

    #[test]
    fn daily_production_is_sorted_by_date() {
        let days = daily_production(&fixture());
        assert_eq!(
            days,
            vec![
                DailyProduction { date: date!(2024-03-01), total_produced: 25.5, skipped: 0 },
                DailyProduction { date: date!(2024-03-02), total_produced: 10.0, skipped: 1 },
                DailyProduction { date: date!(2024-03-03), total_produced: 7.0, skipped: 0 },
            ]
        );
    }

    #[test]
    fn daily_buckets_use_utc_dates() {
        let ts = datetime!(2024-03-01 23:30:00 -02:00);
        assert_eq!(reading_date(ts), date!(2024-03-02));
    }

    #[test]
    fn empty_input_builds_empty_report() {
        let report = AnalysisReport::build(&[], DEFAULT_TOP_DEVICES);
        assert_eq!(report.reading_count, 0);
        assert_eq!(report.summary, ScalarSummary::default());
        assert!(report.top_devices.is_empty());
        assert!(report.groups.is_empty());
        assert!(report.quality.is_empty());
        assert!(report.daily.is_empty());
    }

    #[test]
    fn report_skip_counts_agree_across_views() {
        let readings = fixture();
        let report = AnalysisReport::build(&readings, DEFAULT_TOP_DEVICES);
        let quality_skips: usize = report.quality.iter().map(|q| q.skipped_readings).sum();
        let daily_skips: usize = report.daily.iter().map(|d| d.skipped).sum();
        assert_eq!(report.summary.skipped_net, 1);
        assert_eq!(quality_skips, report.summary.skipped_net);
        assert_eq!(daily_skips, report.summary.skipped_produced);
        assert_eq!(report.failures.total_failed(), report.summary.skipped_net);
    }
}
