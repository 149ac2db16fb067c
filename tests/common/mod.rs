//! Shared test doubles for shipper integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use log_shipper::{Result, ShipperError, Transport};
use parking_lot::Mutex;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A delivered request as seen by [`RecordingTransport`]
#[derive(Debug, Clone)]
pub struct Delivery {
    pub at: Instant,
    pub url: String,
    pub payload: Value,
}

impl Delivery {
    pub fn bodies(&self) -> Vec<String> {
        self.payload["logs"]
            .as_array()
            .map(|logs| {
                logs.iter()
                    .map(|l| l["body"].as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Transport that records every payload instead of sending it
#[derive(Default)]
pub struct RecordingTransport {
    deliveries: Mutex<Vec<Delivery>>,
    attempts: Mutex<usize>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    pub fn all_bodies(&self) -> Vec<String> {
        self.deliveries().iter().flat_map(Delivery::bodies).collect()
    }

    /// Poll until at least `count` deliveries were recorded or `timeout` elapses
    pub fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Delivery> {
        let start = Instant::now();
        loop {
            let deliveries = self.deliveries();
            if deliveries.len() >= count || start.elapsed() >= timeout {
                return deliveries;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, url: &str, body: Vec<u8>) -> Result<()> {
        *self.attempts.lock() += 1;
        if self.fail {
            return Err(ShipperError::Transport("connection refused".to_string()));
        }

        let payload: Value = serde_json::from_slice(&body)?;
        self.deliveries.lock().push(Delivery {
            at: Instant::now(),
            url: url.to_string(),
            payload,
        });
        Ok(())
    }
}

/// In-memory passthrough sink that can be inspected while the shipper runs
#[derive(Clone, Default)]
pub struct SharedWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
