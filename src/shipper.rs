//! Public logging handle and worker lifecycle

use crate::batcher::{Batcher, BatcherState};
use crate::buffer::LogBuffer;
use crate::config::ShipperConfig;
use crate::errors::{Result, ShipperError};
use crate::event::{Attribute, LogEvent, LogLevel};
use crate::passthrough::Passthrough;
use crate::sender::BatchSender;
use crate::transport::{HttpTransport, Transport};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::{error, info, warn};

/// Ships log events to a remote ingestion endpoint in the background.
///
/// Logging calls never block on the network and never fail. A shipper is
/// single-use: once [`Shipper::shutdown`] has run it cannot be restarted.
/// Dropping the shipper shuts it down.
pub struct Shipper {
    config: ShipperConfig,
    buffer: Arc<LogBuffer>,
    passthrough: Option<Passthrough>,
    worker: Mutex<Option<JoinHandle<()>>>,
    terminated: AtomicBool,
}

impl Shipper {
    /// Start a shipper delivering over HTTP
    pub fn start(config: ShipperConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config.http_timeout)?);
        Self::with_transport(config, transport)
    }

    /// Start a shipper delivering through a custom transport
    pub fn with_transport(config: ShipperConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::with_parts(config, transport, Box::new(std::io::stdout()))
    }

    /// Start a shipper with a custom transport and passthrough sink
    pub fn with_parts(
        config: ShipperConfig,
        transport: Arc<dyn Transport>,
        passthrough_writer: Box<dyn Write + Send>,
    ) -> Result<Self> {
        config.validate().map_err(ShipperError::Config)?;

        let buffer = Arc::new(LogBuffer::new());
        let passthrough = config
            .passthrough
            .then(|| Passthrough::new(passthrough_writer));

        if config.noop {
            info!("Shipper for {} started in noop mode", config.service_name);
        }

        let sender = BatchSender::new(config.target_url(), config.token.clone(), transport);
        let batcher = Batcher::new(
            Arc::clone(&buffer),
            sender,
            config.max_batch_size,
            config.batch_interval,
        )?;
        let worker = batcher.spawn()?;

        Ok(Self {
            config,
            buffer,
            passthrough,
            worker: Mutex::new(Some(worker)),
            terminated: AtomicBool::new(false),
        })
    }

    pub fn debug(&self, message: &str, attrs: &[Attribute]) {
        self.log(LogLevel::Debug, message, None, attrs);
    }

    pub fn info(&self, message: &str, attrs: &[Attribute]) {
        self.log(LogLevel::Info, message, None, attrs);
    }

    pub fn warn(&self, message: &str, attrs: &[Attribute]) {
        self.log(LogLevel::Warn, message, None, attrs);
    }

    /// Log at error level, recording `err` under the `error` attribute
    pub fn error(
        &self,
        message: &str,
        err: Option<&dyn std::error::Error>,
        attrs: &[Attribute],
    ) {
        self.log(LogLevel::Error, message, err, attrs);
    }

    fn log(
        &self,
        level: LogLevel,
        message: &str,
        err: Option<&dyn std::error::Error>,
        attrs: &[Attribute],
    ) {
        if let Some(passthrough) = &self.passthrough {
            passthrough.write(level, message, attrs);
        }

        if self.config.noop {
            return;
        }

        let event = LogEvent::build(level, message, &self.config.service_name, attrs, err);
        if !self.buffer.push(event) {
            warn!("Dropping {} event logged after shutdown", level);
        }
    }

    /// Stop the worker after it has flushed everything logged so far.
    ///
    /// Only the first call does any work and blocks until the final send
    /// returns; later or concurrent calls return immediately.
    pub fn shutdown(&self) {
        if !self.buffer.request_stop() {
            return;
        }

        info!("Shutting down shipper for {}", self.config.service_name);

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                error!("Batcher thread panicked during shutdown");
            }
        }

        self.terminated.store(true, Ordering::Release);
        info!("Shipper for {} stopped", self.config.service_name);
    }

    pub fn state(&self) -> BatcherState {
        if !self.buffer.is_stopping() {
            BatcherState::Running
        } else if self.terminated.load(Ordering::Acquire) {
            BatcherState::Terminated
        } else {
            BatcherState::Stopping
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.buffer.is_stopping()
    }

    /// Events queued but not yet drained by the worker
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn config(&self) -> &ShipperConfig {
        &self.config
    }
}

impl Drop for Shipper {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Shipper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shipper")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
