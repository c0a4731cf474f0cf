use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::pipeline::PipelineError;
use crate::report::DEFAULT_TOP_DEVICES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Postgres,
    Ndjson,
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub path: Option<PathBuf>,
    pub delimiter: Option<char>,
}

impl SourceConfig {
    pub fn require_path(&self) -> Result<PathBuf, PipelineError> {
        self.path
            .clone()
            .ok_or_else(|| PipelineError::Config("file source requires source.path".to_string()))
    }

    pub fn delimiter_byte(&self) -> Result<u8, PipelineError> {
        let c = self.delimiter.unwrap_or(',');
        u8::try_from(c)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| PipelineError::Config(format!("delimiter '{c}' must be a single ASCII character")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_devices")]
    pub top_devices: usize,
}

fn default_top_devices() -> usize {
    DEFAULT_TOP_DEVICES
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_devices: DEFAULT_TOP_DEVICES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    #[serde(default = "default_live_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_live_secs")]
    pub lookback_secs: u64,
}

fn default_live_secs() -> u64 {
    15
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_live_secs(),
            lookback_secs: default_live_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub live: LiveConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("ANALYSIS_CONFIG").unwrap_or_else(|_| "analysis-config.toml".to_string());
        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config {path}: {e}"))?;
        let cfg = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path, source = ?cfg.source.kind, "config loaded");
        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, PipelineError> {
        toml::from_str(contents).map_err(|e| PipelineError::Config(e.to_string()))
    }
}
