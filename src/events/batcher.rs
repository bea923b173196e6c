// (C) Copyright IBM Corp. 2024.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::errors::ConfigurationError;
use crate::events::event::EvaluationEvent;
use crate::events::sender::EventSender;

#[derive(Debug, Clone)]
pub struct BatcherConfig {
    pub max_size: usize,
    pub max_bytes: usize,
    pub max_wait: Duration,
    pub flush_size: usize,
    pub flush_bytes: usize,
}

impl BatcherConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.flush_size > self.max_size {
            return Err(ConfigurationError::FlushSizeExceedsMaxSize {
                flush_size: self.flush_size,
                max_size: self.max_size,
            });
        }
        if self.flush_bytes > self.max_bytes {
            return Err(ConfigurationError::FlushBytesExceedsMaxBytes {
                flush_bytes: self.flush_bytes,
                max_bytes: self.max_bytes,
            });
        }
        Ok(())
    }
}

impl Default for BatcherConfig {
    fn default() -> Self {
        BatcherConfig {
            max_size: 10_000,
            max_bytes: 4 * 1024 * 1024,
            max_wait: Duration::from_secs(30),
            flush_size: 100,
            flush_bytes: 512 * 1024,
        }
    }
}

enum TimerMessage {
    Arm(Instant),
    Stop,
}

/// Buffers evaluation events and flushes them to an [`EventSender`] on
/// size, byte, or time thresholds.
///
/// The buffer is a plain `Mutex<Vec<EvaluationEvent>>` shared between
/// producer threads and a dedicated timer thread — a deliberate departure
/// from a channel-actor design, since the buffer must support synchronous
/// size/byte-triggered flushes from any producer thread as well as an
/// independent time-triggered flush.
pub(crate) struct EventBatcher {
    config: BatcherConfig,
    buffer: Mutex<Vec<EvaluationEvent>>,
    sender: Arc<dyn EventSender>,
    timer_tx: mpsc::Sender<TimerMessage>,
    timer_thread: Mutex<Option<JoinHandle<()>>>,
}

impl EventBatcher {
    pub(crate) fn new(config: BatcherConfig, sender: Arc<dyn EventSender>) -> Arc<Self> {
        let (timer_tx, timer_rx) = mpsc::channel::<TimerMessage>();
        let batcher = Arc::new(EventBatcher {
            config,
            buffer: Mutex::new(Vec::new()),
            sender,
            timer_tx,
            timer_thread: Mutex::new(None),
        });

        let worker_batcher = Arc::clone(&batcher);
        let handle = std::thread::spawn(move || timer_loop(timer_rx, move || worker_batcher.flush()));
        *batcher.timer_thread.lock().expect("timer thread slot is never poisoned before first set") = Some(handle);

        batcher
    }

    /// Appends `event`, flushing synchronously if the size or byte
    /// threshold is now met, otherwise arming the wait-time timer if the
    /// buffer just transitioned from empty to non-empty.
    pub(crate) fn track_event(&self, event: EvaluationEvent) {
        let should_flush;
        let just_became_non_empty;
        {
            let mut buffer = self.buffer.lock().expect("event buffer mutex is never poisoned");
            just_became_non_empty = buffer.is_empty();
            buffer.push(event);
            let approx_bytes = buffer.len() * EvaluationEvent::APPROXIMATE_SIZE_BYTES;
            should_flush = buffer.len() >= self.config.flush_size || approx_bytes >= self.config.flush_bytes;
        }

        if should_flush {
            self.flush();
            return;
        }

        if just_became_non_empty {
            let deadline = Instant::now() + self.config.max_wait;
            let _ = self.timer_tx.send(TimerMessage::Arm(deadline));
        }
    }

    /// Drains the buffer into a local copy and hands it to the sender.
    /// Failures are logged and dropped — at-most-once delivery with loss
    /// under error.
    fn flush(&self) {
        let drained = {
            let mut buffer = self.buffer.lock().expect("event buffer mutex is never poisoned");
            if buffer.is_empty() {
                return;
            }
            std::mem::take(&mut *buffer)
        };

        let count = drained.len();
        log::debug!("flushing {count} evaluation events");
        if let Err(error) = self.sender.send(drained) {
            log::warn!("dropping {count} evaluation events after flush failure: {error}");
        }
    }

    /// Stops the timer thread and flushes whatever remains. Idempotent.
    pub(crate) fn stop(&self) {
        let _ = self.timer_tx.send(TimerMessage::Stop);
        if let Some(handle) = self.timer_thread.lock().expect("timer thread slot is never poisoned").take() {
            let _ = handle.join();
        }
        self.flush();
    }
}

fn timer_loop(rx: mpsc::Receiver<TimerMessage>, flush: impl Fn()) {
    let mut pending: Option<Instant> = None;
    loop {
        let timeout = match pending {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::from_secs(3600),
        };
        match rx.recv_timeout(timeout) {
            Ok(TimerMessage::Arm(deadline)) => pending = Some(deadline),
            Ok(TimerMessage::Stop) => return,
            Err(RecvTimeoutError::Timeout) => {
                if pending.is_some() {
                    flush();
                    pending = None;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use crate::events::event::{EventSource, EventType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSender {
        flushed_events: AtomicUsize,
        flush_calls: AtomicUsize,
    }

    impl EventSender for CountingSender {
        fn send(&self, events: Vec<EvaluationEvent>) -> Result<(), crate::fetch::NetworkError> {
            self.flushed_events.fetch_add(events.len(), Ordering::SeqCst);
            self.flush_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sample_event() -> EvaluationEvent {
        EvaluationEvent {
            event_id: "1".into(),
            service_name: "svc".into(),
            event_type: EventType::ParameterEvaluation,
            parameter_name: "p".into(),
            source: EventSource::Parameter,
            attributes: Attributes::new(),
            timestamp: chrono::Utc::now(),
            rollout_value: Some("x".into()),
            data_type: None,
            error: None,
            experiment_id: None,
            variant_id: None,
            variant_name: None,
        }
    }

    #[test]
    fn flush_size_triggers_synchronous_flush() {
        let sender = Arc::new(CountingSender {
            flushed_events: AtomicUsize::new(0),
            flush_calls: AtomicUsize::new(0),
        });
        let config = BatcherConfig {
            flush_size: 2,
            max_wait: Duration::from_secs(3600),
            ..BatcherConfig::default()
        };
        let batcher = EventBatcher::new(config, sender.clone());
        batcher.track_event(sample_event());
        batcher.track_event(sample_event());
        assert_eq!(sender.flushed_events.load(Ordering::SeqCst), 2);
        batcher.stop();
    }

    #[test]
    fn stop_flushes_remaining_events() {
        let sender = Arc::new(CountingSender {
            flushed_events: AtomicUsize::new(0),
            flush_calls: AtomicUsize::new(0),
        });
        let config = BatcherConfig {
            flush_size: 100,
            max_wait: Duration::from_secs(3600),
            ..BatcherConfig::default()
        };
        let batcher = EventBatcher::new(config, sender.clone());
        batcher.track_event(sample_event());
        batcher.stop();
        assert_eq!(sender.flushed_events.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn config_rejects_flush_size_over_max_size() {
        let config = BatcherConfig {
            max_size: 10,
            flush_size: 20,
            ..BatcherConfig::default()
        };
        assert!(config.validate().is_err());
    }
}