//! Serialization and delivery of a single batch

use crate::errors::Result;
use crate::event::LogEvent;
use crate::payload::encode_batch;
use crate::transport::Transport;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// Encodes batches and hands them to a [`Transport`], one attempt per batch
#[derive(Clone)]
pub struct BatchSender {
    url: String,
    token: String,
    transport: Arc<dyn Transport>,
}

impl BatchSender {
    pub fn new(url: String, token: String, transport: Arc<dyn Transport>) -> Self {
        Self {
            url,
            token,
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver a batch once.
    ///
    /// Failures are reported on the diagnostic stream and returned; the batch
    /// is dropped either way.
    pub async fn send(&self, batch: Vec<LogEvent>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let batch_id = Uuid::new_v4();
        let result = self.deliver(&batch).await;

        match &result {
            Ok(()) => debug!(
                "Delivered batch {} with {} events to {}",
                batch_id,
                batch.len(),
                self.url
            ),
            Err(e) => error!(
                "Failed to send logs: batch {} with {} events dropped: {}",
                batch_id,
                batch.len(),
                e
            ),
        }

        result
    }

    async fn deliver(&self, batch: &[LogEvent]) -> Result<()> {
        let body = encode_batch(&self.token, batch)?;
        self.transport.send(&self.url, body).await
    }
}

impl std::fmt::Debug for BatchSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchSender")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
