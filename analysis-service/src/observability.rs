use tracing_subscriber::EnvFilter;

use crate::aggregate::ScalarSummary;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("analysis_service=info,report_file=info,live_production=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Log the skip totals of a finished report at a level matching their severity.
pub fn log_summary(summary: &ScalarSummary, reading_count: usize) {
    if summary.skipped_net > 0 {
        tracing::warn!(
            readings = reading_count,
            skipped = summary.skipped_net,
            "some readings could not be decoded and were skipped"
        );
    } else {
        tracing::info!(readings = reading_count, "all readings decoded");
    }
}

/// Publish one aggregation window as metrics.
pub fn record_window(summary: &ScalarSummary, reading_count: usize) {
    metrics::counter!("readings_processed_total").increment(reading_count as u64);
    metrics::counter!("readings_skipped_total").increment(summary.skipped_net as u64);
    metrics::gauge!("energy_net_kwh").set(summary.net);
    metrics::gauge!("energy_produced_kwh").set(summary.produced);
    metrics::gauge!("energy_consumed_kwh").set(summary.consumed);
}
