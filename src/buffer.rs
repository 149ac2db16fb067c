//! Thread-safe hand-off queue between logging threads and the batcher

use crate::event::LogEvent;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;
use tokio::time::{Instant, sleep_until};

/// Unbounded FIFO of pending events with a single consumer.
///
/// The queue and the stop flag share one lock. Producers never block beyond
/// that lock; the consumer parks on [`LogBuffer::wait_for_work_or_deadline`].
#[derive(Debug, Default)]
pub struct LogBuffer {
    state: Mutex<BufferState>,
    notify: Notify,
}

#[derive(Debug, Default)]
struct BufferState {
    events: VecDeque<LogEvent>,
    stopping: bool,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and wake the consumer.
    ///
    /// Returns `false` and drops the event once a stop has been requested.
    pub fn push(&self, event: LogEvent) -> bool {
        {
            let mut state = self.state.lock();
            if state.stopping {
                return false;
            }
            state.events.push_back(event);
        }
        self.notify.notify_one();
        true
    }

    /// Remove up to `max` events from the front of the queue
    pub fn drain_up_to(&self, max: usize) -> Vec<LogEvent> {
        let mut state = self.state.lock();
        let count = max.min(state.events.len());
        state.events.drain(..count).collect()
    }

    /// Set the stop flag and wake the consumer.
    ///
    /// Returns `true` only for the call that actually flipped the flag.
    pub fn request_stop(&self) -> bool {
        {
            let mut state = self.state.lock();
            if state.stopping {
                return false;
            }
            state.stopping = true;
        }
        self.notify.notify_one();
        true
    }

    pub fn is_stopping(&self) -> bool {
        self.state.lock().stopping
    }

    pub fn len(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().events.is_empty()
    }

    /// Suspend until the queue is non-empty, a stop is requested, or `deadline` passes
    pub async fn wait_for_work_or_deadline(&self, deadline: Instant) {
        loop {
            {
                let state = self.state.lock();
                if !state.events.is_empty() || state.stopping {
                    return;
                }
            }

            // A push between the check and this await leaves a stored permit.
            tokio::select! {
                _ = self.notify.notified() => {}
                _ = sleep_until(deadline) => return,
            }
        }
    }
}
