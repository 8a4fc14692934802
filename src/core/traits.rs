use crate::core::error::Result;
use crate::core::event::Record;

/// Produces records one at a time for the stream producer.
pub trait EventSource: Send {
    /// Assembles the next record.
    fn next_event(&mut self) -> Result<Record>;
}

/// Writes serialized records to a destination (console, file, broker).
pub trait RecordSink {
    /// Writes one serialized record; `key` is the record's correlation id.
    fn write_record(&mut self, key: &str, payload: &[u8]) -> Result<()>;
    /// Flushes buffered data without closing the sink.
    fn flush(&mut self) -> Result<()>;
    /// Closes the sink, flushing any remaining data.
    fn close(&mut self) -> Result<()>;
}
