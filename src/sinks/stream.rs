//! Newline-delimited byte-stream sink for the console or a file.

use crate::core::error::{Error, Result};
use crate::core::traits::RecordSink;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;
use tracing::info;

enum Destination {
    Stdout(Stdout),
    File(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

/// Writes each record followed by `\n`, flushing after every record so an
/// externally terminated run keeps everything emitted so far.
pub struct StreamSink {
    destination: Destination,
    closed: bool,
}

impl StreamSink {
    pub fn stdout() -> Self {
        Self {
            destination: Destination::Stdout(io::stdout()),
            closed: false,
        }
    }

    /// Creates (or truncates) `path`; a `.gz` extension enables gzip compression.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|err| Error::SinkUnavailable(format!("{}: {err}", path.display())))?;
        let writer = BufWriter::new(file);
        let gzip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
        let destination = if gzip {
            Destination::Gzip(GzEncoder::new(writer, Compression::default()))
        } else {
            Destination::File(writer)
        };
        info!(path = %path.display(), gzip, "writing records to file");
        Ok(Self {
            destination,
            closed: false,
        })
    }

    fn writer(&mut self) -> &mut dyn Write {
        match &mut self.destination {
            Destination::Stdout(out) => out,
            Destination::File(out) => out,
            Destination::Gzip(out) => out,
        }
    }
}

impl RecordSink for StreamSink {
    fn write_record(&mut self, _key: &str, payload: &[u8]) -> Result<()> {
        write_line(self.writer(), payload).map_err(write_error)
    }

    fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.writer().flush().map_err(write_error)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let result = match &mut self.destination {
            // A finished encoder must not be flushed again; flush the file below it.
            Destination::Gzip(encoder) => encoder
                .try_finish()
                .and_then(|_| encoder.get_mut().flush()),
            Destination::File(out) => out.flush(),
            Destination::Stdout(out) => out.flush(),
        };
        self.closed = true;
        result.map_err(write_error)
    }
}

fn write_line(writer: &mut dyn Write, payload: &[u8]) -> io::Result<()> {
    writer.write_all(payload)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

fn write_error(err: io::Error) -> Error {
    Error::SinkUnavailable(format!("write failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use std::io::Read;

    #[test]
    fn writes_one_line_per_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.jsonl");
        let mut sink = StreamSink::create(&path).expect("sink");
        sink.write_record("a", b"{\"n\":1}").expect("write");
        sink.write_record("b", b"{\"n\":2}").expect("write");
        sink.close().expect("close");
        assert_eq!(fs::read_to_string(&path).expect("read"), "{\"n\":1}\n{\"n\":2}\n");
    }

    #[test]
    fn truncates_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.ttl");
        fs::write(&path, "stale content\nmore\n").expect("seed");
        let mut sink = StreamSink::create(&path).expect("sink");
        sink.write_record("a", b"fresh").expect("write");
        sink.close().expect("close");
        assert_eq!(fs::read_to_string(&path).expect("read"), "fresh\n");
    }

    #[test]
    fn gzip_output_decompresses() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.jsonl.gz");
        let mut sink = StreamSink::create(&path).expect("sink");
        sink.write_record("a", b"one").expect("write");
        sink.write_record("b", b"two").expect("write");
        sink.close().expect("close");
        let mut text = String::new();
        GzDecoder::new(File::open(&path).expect("open"))
            .read_to_string(&mut text)
            .expect("decode");
        assert_eq!(text, "one\ntwo\n");
    }

    #[test]
    fn missing_directory_is_sink_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("out.jsonl");
        assert!(matches!(
            StreamSink::create(&path),
            Err(Error::SinkUnavailable(_))
        ));
    }
}
