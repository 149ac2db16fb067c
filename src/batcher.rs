//! Background drain loop with size and time flush triggers

use crate::buffer::LogBuffer;
use crate::errors::{Result, ShipperError};
use crate::event::LogEvent;
use crate::sender::BatchSender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

const WORKER_THREAD_NAME: &str = "log-shipper-batcher";

/// Lifecycle of the background worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatcherState {
    Running,
    Stopping,
    Terminated,
}

/// Single consumer of a [`LogBuffer`]
#[derive(Debug)]
pub struct Batcher {
    buffer: Arc<LogBuffer>,
    sender: BatchSender,
    max_batch_size: usize,
    batch_interval: Duration,
}

impl Batcher {
    pub fn new(
        buffer: Arc<LogBuffer>,
        sender: BatchSender,
        max_batch_size: usize,
        batch_interval: Duration,
    ) -> Result<Self> {
        if max_batch_size == 0 {
            return Err(ShipperError::Config(
                "max_batch_size must be greater than 0".to_string(),
            ));
        }

        if batch_interval.is_zero() {
            return Err(ShipperError::Config(
                "batch_interval must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            buffer,
            sender,
            max_batch_size,
            batch_interval,
        })
    }

    /// Run until a stop is requested and the buffer has been drained.
    ///
    /// A batch is sent as soon as it holds `max_batch_size` events, or when a
    /// full `batch_interval` passes without any wake-up. The deadline is re-armed
    /// after every pass, so a steady trickle of events holds a partial batch
    /// back until the trickle pauses or the batch fills. Sends happen inline,
    /// so a slow transport delays the next drain.
    pub async fn run(self) {
        let mut batch: Vec<LogEvent> = Vec::with_capacity(self.max_batch_size);
        let mut deadline = Instant::now() + self.batch_interval;

        loop {
            self.buffer.wait_for_work_or_deadline(deadline).await;

            // Pushes are rejected once stopping, so an empty queue stays empty.
            if self.buffer.is_stopping() && self.buffer.is_empty() {
                self.flush(&mut batch).await;
                break;
            }

            let room = self.max_batch_size - batch.len();
            batch.extend(self.buffer.drain_up_to(room));

            if batch.len() >= self.max_batch_size {
                debug!("Size trigger reached with {} events", batch.len());
                self.flush(&mut batch).await;
            }

            if Instant::now() >= deadline && !batch.is_empty() {
                debug!("Time trigger reached with {} events", batch.len());
                self.flush(&mut batch).await;
            }

            deadline = Instant::now() + self.batch_interval;
        }

        debug!("Batcher drained and terminated");
    }

    async fn flush(&self, batch: &mut Vec<LogEvent>) {
        if batch.is_empty() {
            return;
        }

        let events = std::mem::replace(batch, Vec::with_capacity(self.max_batch_size));
        let _ = self.sender.send(events).await;
    }

    /// Start the loop on a dedicated thread with its own runtime
    pub fn spawn(self) -> Result<JoinHandle<()>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ShipperError::Runtime(format!("Failed to build runtime: {}", e)))?;

        info!(
            "Starting batcher for {} (max batch {}, interval {:?})",
            self.sender.url(),
            self.max_batch_size,
            self.batch_interval
        );

        std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || runtime.block_on(self.run()))
            .map_err(|e| ShipperError::Runtime(format!("Failed to spawn batcher thread: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogLevel;
    use crate::transport::Transport;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::Value;

    #[derive(Default)]
    struct BodyRecorder {
        batches: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for BodyRecorder {
        async fn send(&self, _url: &str, body: Vec<u8>) -> Result<()> {
            let json: Value = serde_json::from_slice(&body)?;
            let bodies = json["logs"]
                .as_array()
                .map(|logs| {
                    logs.iter()
                        .map(|l| l["body"].as_str().unwrap_or_default().to_string())
                        .collect()
                })
                .unwrap_or_default();
            self.batches.lock().push(bodies);
            Ok(())
        }
    }

    fn setup(
        max_batch_size: usize,
        interval: Duration,
    ) -> (Arc<LogBuffer>, Arc<BodyRecorder>, Batcher) {
        let buffer = Arc::new(LogBuffer::new());
        let recorder = Arc::new(BodyRecorder::default());
        let sender = BatchSender::new("url".to_string(), "tk".to_string(), recorder.clone());
        let batcher =
            Batcher::new(Arc::clone(&buffer), sender, max_batch_size, interval).unwrap();
        (buffer, recorder, batcher)
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let sender = BatchSender::new(
            "url".to_string(),
            "tk".to_string(),
            Arc::new(BodyRecorder::default()),
        );
        let result = Batcher::new(
            Arc::new(LogBuffer::new()),
            sender.clone(),
            0,
            Duration::from_millis(10),
        );
        assert!(matches!(result, Err(ShipperError::Config(_))));

        let result = Batcher::new(Arc::new(LogBuffer::new()), sender, 10, Duration::ZERO);
        assert!(matches!(result, Err(ShipperError::Config(_))));
    }

    #[tokio::test]
    async fn test_trickle_defers_time_flush() {
        let (buffer, recorder, batcher) = setup(100, Duration::from_millis(200));
        let handle = tokio::spawn(batcher.run());

        for i in 0..12 {
            push(&buffer, &format!("t{}", i));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(recorder.batches.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(500)).await;
        let batches = recorder.batches.lock().clone();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 12);

        buffer.request_stop();
        handle.await.unwrap();
    }

    fn push(buffer: &LogBuffer, body: &str) {
        buffer.push(LogEvent::build(LogLevel::Info, body, "svc", &[], None));
    }

    #[tokio::test]
    async fn test_stop_flushes_everything_in_order() {
        let (buffer, recorder, batcher) = setup(2, Duration::from_secs(60));
        for body in ["a", "b", "c", "d", "e"] {
            push(&buffer, body);
        }
        buffer.request_stop();

        batcher.run().await;

        let batches = recorder.batches.lock().clone();
        assert_eq!(batches, vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]);
    }

    #[tokio::test]
    async fn test_stop_with_nothing_pending_sends_nothing() {
        let (buffer, recorder, batcher) = setup(10, Duration::from_millis(10));
        buffer.request_stop();

        batcher.run().await;
        assert!(recorder.batches.lock().is_empty());
    }

    #[tokio::test]
    async fn test_time_trigger() {
        let (buffer, recorder, batcher) = setup(100, Duration::from_millis(50));
        push(&buffer, "x");
        push(&buffer, "y");

        let handle = tokio::spawn(batcher.run());
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(recorder.batches.lock().clone(), vec![vec!["x", "y"]]);

        buffer.request_stop();
        handle.await.unwrap();
        assert_eq!(recorder.batches.lock().len(), 1);
    }

    #[test]
    fn test_spawned_worker_joins_after_stop() {
        let (buffer, recorder, batcher) = setup(100, Duration::from_secs(60));
        let handle = batcher.spawn().unwrap();

        push(&buffer, "only");
        buffer.request_stop();
        handle.join().unwrap();

        assert_eq!(recorder.batches.lock().clone(), vec![vec!["only"]]);
    }
}
