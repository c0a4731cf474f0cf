use std::{pin::Pin, time::SystemTime};

use futures::{Stream, StreamExt};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub received_at: SystemTime,
}

impl<T> Envelope<T> {
    pub fn now(payload: T) -> Self {
        Self {
            payload,
            received_at: SystemTime::now(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("config error: {0}")]
    Config(String),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

/// Drain a source into memory. Stops at the first source error.
pub async fn collect_payloads<T, S>(source: &S) -> Result<Vec<T>, PipelineError>
where
    T: Send + 'static,
    S: Source<T> + ?Sized,
{
    let mut stream = source.stream().await;
    let mut payloads = Vec::new();

    while let Some(item) = stream.next().await {
        payloads.push(item?.payload);
    }

    tracing::debug!(count = payloads.len(), "source drained");
    Ok(payloads)
}
