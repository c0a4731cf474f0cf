//! Plain-text tables for the console report.

pub mod table;

use comfy_table::CellAlignment::{Left, Right};
use energy_client::domain::MeterInfo;
use time::{macros::format_description, OffsetDateTime, UtcOffset};

use crate::aggregate::ScalarSummary;
use crate::quality::FailureBreakdown;
use crate::report::{AnalysisReport, DailyProduction, DeviceQuality, DeviceStats, GroupStats};
use table::{format_n2, new_table, render};

fn format_ts(ts: OffsetDateTime) -> String {
    let utc = ts.to_offset(UtcOffset::UTC);
    utc.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| utc.to_string())
}

fn opt_text(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

fn opt_coord(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_default()
}

pub fn summary(s: &ScalarSummary) -> String {
    let mut t = new_table(&[("Metric", Left), ("Value (kWh)", Right), ("Skipped", Right)]);
    for (metric, value, skipped) in [
        ("Net electricity", s.net, s.skipped_net),
        ("Total produced", s.produced, s.skipped_produced),
        ("Total consumed", s.consumed, s.skipped_consumed),
    ] {
        t.add_row([metric.to_string(), format_n2(value), skipped.to_string()]);
    }
    render(&t)
}

pub fn inventory(meters: &[MeterInfo]) -> String {
    let mut t = new_table(&[
        ("Id", Right),
        ("MeterNumber", Left),
        ("Group", Left),
        ("Site", Left),
        ("Latitude", Right),
        ("Longitude", Right),
        ("Altitude", Right),
        ("TimeZone", Left),
    ]);
    for m in meters {
        t.add_row([
            m.id.to_string(),
            m.meter_number.clone(),
            opt_text(&m.group_name),
            opt_text(&m.site_name),
            opt_coord(m.latitude),
            opt_coord(m.longitude),
            opt_coord(m.altitude),
            opt_text(&m.time_zone),
        ]);
    }
    render(&t)
}

pub fn device_stats(stats: &[DeviceStats]) -> String {
    let mut t = new_table(&[
        ("MeterNumber", Left),
        ("Produced kWh", Right),
        ("Consumed kWh", Right),
        ("Readings", Right),
        ("Skipped P", Right),
        ("Skipped C", Right),
        ("First reading", Left),
        ("Last reading", Left),
    ]);
    for d in stats {
        t.add_row([
            d.meter_number.clone(),
            format_n2(d.total_produced),
            format_n2(d.total_consumed),
            d.reading_count.to_string(),
            d.skipped_produced.to_string(),
            d.skipped_consumed.to_string(),
            format_ts(d.first_reading),
            format_ts(d.last_reading),
        ]);
    }
    render(&t)
}

pub fn group_stats(groups: &[GroupStats]) -> String {
    let mut t = new_table(&[
        ("Group", Left),
        ("Produced kWh", Right),
        ("Devices", Right),
        ("Readings", Right),
    ]);
    for g in groups {
        t.add_row([
            g.group_name.clone(),
            format_n2(g.total_produced),
            g.device_count.to_string(),
            g.reading_count.to_string(),
        ]);
    }
    render(&t)
}

pub fn device_quality(quality: &[DeviceQuality]) -> String {
    let mut t = new_table(&[
        ("MeterNumber", Left),
        ("Skipped", Right),
        ("Total", Right),
        ("Skipped %", Right),
    ]);
    for q in quality {
        t.add_row([
            q.meter_number.clone(),
            q.skipped_readings.to_string(),
            q.total_readings.to_string(),
            format!("{:.1}", q.skipped_pct()),
        ]);
    }
    render(&t)
}

pub fn daily_production(days: &[DailyProduction]) -> String {
    let mut t = new_table(&[("Date", Left), ("Produced kWh", Right), ("Skipped", Right)]);
    for d in days {
        t.add_row([d.date.to_string(), format_n2(d.total_produced), d.skipped.to_string()]);
    }
    render(&t)
}

pub fn failure_breakdown(f: &FailureBreakdown) -> String {
    let mut t = new_table(&[("Outcome", Left), ("Readings", Right)]);
    t.add_row(["decoded".to_string(), f.decoded.to_string()]);
    for (kind, count) in f.rows() {
        t.add_row([kind.to_string(), count.to_string()]);
    }
    render(&t)
}

fn section(out: &mut String, title: &str, body: &str) {
    out.push_str("\n=== ");
    out.push_str(title);
    out.push_str(" ===\n");
    out.push_str(body);
}

/// Every report section in console order. The device inventory is only
/// printed when meter details are available.
pub fn full_report(report: &AnalysisReport, meters: Option<&[MeterInfo]>) -> String {
    let mut out = String::new();

    section(&mut out, "ENERGY SUMMARY", &summary(&report.summary));
    if let Some(meters) = meters {
        section(&mut out, "DEVICE INVENTORY (All Devices)", &inventory(meters));
    }
    section(
        &mut out,
        &format!("PER-DEVICE STATISTICS (Top {} by production)", report.top_devices.len()),
        &device_stats(&report.top_devices),
    );
    section(&mut out, "GROUP PRODUCTION SUMMARY", &group_stats(&report.groups));
    section(&mut out, "DEVICE DATA QUALITY", &device_quality(&report.quality));
    section(&mut out, "DECODE OUTCOMES", &failure_breakdown(&report.failures));
    section(&mut out, "DAILY PRODUCTION SUMMARY", &daily_production(&report.daily));

    out
}
