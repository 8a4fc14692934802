//! Rate-governed record producer.
//!
//! The producer runs on its own thread and hands records over a rendezvous
//! channel, so at most one record is in flight and a slow consumer throttles
//! emission below the configured rate.

use crate::core::error::{Error, Result};
use crate::core::event::Record;
use crate::core::traits::EventSource;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerState {
    Idle,
    Running,
    /// Emitting a fixed number of records.
    Draining,
    /// Emitting forever.
    Streaming,
    Closed,
}

pub struct StreamProducer {
    source: Box<dyn EventSource>,
    count: i64,
    rate: Duration,
    state: Arc<Mutex<ProducerState>>,
}

impl StreamProducer {
    /// `count <= 0` produces an unbounded stream, which needs a non-zero `rate`.
    pub fn new(source: Box<dyn EventSource>, count: i64, rate: Duration) -> Result<Self> {
        if count <= 0 && rate.is_zero() {
            return Err(Error::Usage(
                "an unbounded stream (num <= 0) requires a non-zero rate".to_string(),
            ));
        }
        Ok(Self {
            source,
            count,
            rate,
            state: Arc::new(Mutex::new(ProducerState::Idle)),
        })
    }

    pub fn is_bounded(&self) -> bool {
        self.count > 0
    }

    pub fn state(&self) -> ProducerState {
        read_state(&self.state)
    }

    /// Starts the producer thread and returns the consuming end of the stream.
    pub fn spawn(mut self) -> RecordStream {
        let (tx, rx) = sync_channel(0);
        self.transition(ProducerState::Running);
        let state = Arc::clone(&self.state);
        let handle = thread::spawn(move || self.run(tx));
        RecordStream {
            rx,
            state,
            handle: Some(handle),
        }
    }

    fn run(mut self, tx: SyncSender<Result<Record>>) {
        if self.is_bounded() {
            self.transition(ProducerState::Draining);
            for _ in 0..self.count {
                if !self.emit(&tx) {
                    break;
                }
            }
        } else {
            self.transition(ProducerState::Streaming);
            while self.emit(&tx) {}
        }
        self.transition(ProducerState::Closed);
        drop(tx);
    }

    /// Sends one record and waits out the rate; false once the consumer is gone.
    fn emit(&mut self, tx: &SyncSender<Result<Record>>) -> bool {
        let record = self.source.next_event();
        let failed = record.is_err();
        if tx.send(record).is_err() {
            debug!("record stream consumer dropped; stopping producer");
            return false;
        }
        if failed {
            warn!("record assembly failed; stopping producer");
            return false;
        }
        if !self.rate.is_zero() {
            thread::sleep(self.rate);
        }
        true
    }

    fn transition(&mut self, next: ProducerState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*state, to = ?next, "producer state");
        *state = next;
    }
}

fn read_state(state: &Mutex<ProducerState>) -> ProducerState {
    *state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Consuming end of a producer's stream, yielding records in emission order.
///
/// `next` blocks until a record arrives or the producer closes the stream.
pub struct RecordStream {
    rx: Receiver<Result<Record>>,
    state: Arc<Mutex<ProducerState>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl RecordStream {
    /// Current state of the producer feeding this stream.
    pub fn state(&self) -> ProducerState {
        read_state(&self.state)
    }

    /// Waits for the producer thread to finish. Only returns for bounded streams
    /// or after the stream has been exhausted.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("producer thread panicked");
            } else {
                info!("producer finished");
            }
        }
    }
}

impl Iterator for RecordStream {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.recv().ok()
    }
}
