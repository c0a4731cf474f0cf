pub mod aggregate;
pub mod config;
pub mod decoder;
pub mod live;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod quality;
pub mod render;
pub mod report;
pub mod sources;

pub use decoder::{decode, try_decode, DecodeError};
pub use pipeline::{collect_payloads, Envelope, PipelineError};
pub use report::AnalysisReport;
