//! Drains a record stream through the serializer into the sink.

use crate::core::error::Result;
use crate::core::traits::RecordSink;
use crate::formats::Serializer;
use crate::producer::RecordStream;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Totals for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: u64,
    pub bytes: u64,
}

pub struct Pipeline {
    serializer: Serializer,
    sink: Box<dyn RecordSink>,
    progress: Progress,
}

impl Pipeline {
    pub fn new(serializer: Serializer, sink: Box<dyn RecordSink>) -> Self {
        Self {
            serializer,
            sink,
            progress: Progress::new(Duration::from_secs(1)),
        }
    }

    /// Interval between throughput log lines.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress = Progress::new(interval);
        self
    }

    /// Serializes and writes every record in arrival order.
    ///
    /// The first failure aborts the run: the sink is closed and the stream is
    /// dropped, which stops the producer at its next hand-off.
    pub fn run(mut self, mut stream: RecordStream) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for record in stream.by_ref() {
            let written = record.and_then(|record| {
                let payload = self.serializer.serialize(&record)?;
                self.sink.write_record(record.key(), &payload)?;
                Ok(payload.len() as u64)
            });
            match written {
                Ok(bytes) => {
                    summary.records += 1;
                    summary.bytes += bytes;
                    self.progress.record(bytes);
                }
                Err(err) => {
                    if let Err(close_err) = self.sink.close() {
                        warn!(error = %close_err, "closing sink after failure");
                    }
                    return Err(err);
                }
            }
        }

        self.sink.close()?;
        stream.join();
        info!(
            records = summary.records,
            bytes = summary.bytes,
            "generation complete"
        );
        Ok(summary)
    }
}

struct Progress {
    interval: Duration,
    last_report: Instant,
    records: u64,
    bytes: u64,
}

impl Progress {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_report: Instant::now(),
            records: 0,
            bytes: 0,
        }
    }

    fn record(&mut self, bytes: u64) {
        self.records += 1;
        self.bytes += bytes;

        let elapsed = self.last_report.elapsed();
        if elapsed >= self.interval {
            let secs = elapsed.as_secs_f64().max(0.000_1);
            debug!(
                records_per_sec = self.records as f64 / secs,
                bytes_per_sec = self.bytes as f64 / secs,
                "throughput"
            );
            self.last_report = Instant::now();
            self.records = 0;
            self.bytes = 0;
        }
    }
}
