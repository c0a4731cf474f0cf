use anyhow::{anyhow, Result};
use analysis_service::{
    aggregate::ScalarSummary,
    collect_payloads,
    config::AppConfig,
    live::{RunningTotals, WindowTracker},
    metrics_server, observability,
    sources::{postgres, PostgresReadingSource},
};
use energy_client::domain::Reading;
use time::OffsetDateTime;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;
    let db_cfg = cfg
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("live_production requires a [database] section"))?;
    let pool = postgres::connect(db_cfg).await?;

    metrics_server::init_from_config(cfg.metrics.as_ref())?;

    let lookback = time::Duration::seconds(i64::try_from(cfg.live.lookback_secs)?);
    let mut tracker = WindowTracker::starting_before(OffsetDateTime::now_utc(), lookback);
    let mut totals = RunningTotals::default();
    let poll_every = std::time::Duration::from_secs(cfg.live.poll_interval_secs.max(1));
    let mut ticker = tokio::time::interval(poll_every);

    tracing::info!(
        poll_interval_secs = cfg.live.poll_interval_secs,
        "live production tracking started"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(windows = totals.windows, readings = totals.readings, "shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                let (from, to) = tracker.next_window(OffsetDateTime::now_utc());
                let source = PostgresReadingSource::with_window(pool.clone(), from, to);

                match collect_payloads::<Reading, _>(&source).await {
                    Ok(readings) => {
                        let summary = ScalarSummary::from_readings(&readings);
                        observability::record_window(&summary, readings.len());
                        totals.add(&summary, readings.len());
                        tracker.commit(to);

                        tracing::info!(
                            %from,
                            %to,
                            readings = readings.len(),
                            produced_kwh = summary.produced,
                            consumed_kwh = summary.consumed,
                            net_kwh = summary.net,
                            skipped = summary.skipped_net,
                            total_produced_kwh = totals.summary.produced,
                            "window aggregated"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            %from,
                            "window fetch failed; retrying with a wider window"
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
