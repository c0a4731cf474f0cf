use anyhow::Result;
use analysis_service::{
    collect_payloads,
    config::{AppConfig, SourceKind},
    metrics_server, observability,
    render,
    report::AnalysisReport,
    sources::{postgres, ConfiguredSource},
};
use energy_client::{db::reading_queries, domain::Reading};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;
    metrics_server::init_from_config(cfg.metrics.as_ref())?;
    tracing::info!("energy analysis started");

    // The inventory table needs the database even when readings come from a file.
    let pool = match &cfg.database {
        Some(db) => Some(postgres::connect(db).await?),
        None if cfg.source.kind == SourceKind::Postgres => {
            anyhow::bail!("source.kind = \"postgres\" requires a [database] section")
        }
        None => None,
    };

    let source = ConfiguredSource::from_config(&cfg, pool.clone())?;
    let readings: Vec<Reading> = collect_payloads(&source).await?;

    let meters = match &pool {
        Some(pool) => Some(reading_queries::all_meters(pool).await?),
        None => None,
    };

    let report = AnalysisReport::build(&readings, cfg.report.top_devices);
    observability::log_summary(&report.summary, report.reading_count);
    observability::record_window(&report.summary, report.reading_count);

    println!("{}", render::full_report(&report, meters.as_deref()));

    tracing::info!("energy analysis completed");
    Ok(())
}
