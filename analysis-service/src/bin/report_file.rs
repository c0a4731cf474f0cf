use anyhow::{bail, Result};
use analysis_service::{
    collect_payloads, observability, render, report::{AnalysisReport, DEFAULT_TOP_DEVICES},
    sources::ConfiguredSource,
};
use energy_client::domain::Reading;
use std::{env, path::Path};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let Some(file_path) = args.iter().find(|a| !a.starts_with("--")) else {
        bail!("usage: report_file <readings.ndjson|readings.csv|readings.dat> [--json]");
    };

    let source = ConfiguredSource::for_file(Path::new(file_path))?;
    let readings: Vec<Reading> = collect_payloads(&source).await?;
    tracing::info!(path = %file_path, readings = readings.len(), "readings loaded");

    let report = AnalysisReport::build(&readings, DEFAULT_TOP_DEVICES);
    observability::log_summary(&report.summary, report.reading_count);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render::full_report(&report, None));
    }

    Ok(())
}
