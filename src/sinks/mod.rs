//! Record sinks: console or file byte streams and the Kafka publisher.

#[cfg(feature = "kafka")]
pub mod kafka;
pub mod stream;

pub use stream::StreamSink;

use crate::core::error::Result;
use crate::core::traits::RecordSink;
use std::path::PathBuf;

/// Reserved `--output` value selecting the Kafka sink.
pub const KAFKA_OUTPUT: &str = "kafka";

/// Destination chosen from the `--output` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
    Kafka,
}

impl Output {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Output::Stdout,
            Some(KAFKA_OUTPUT) => Output::Kafka,
            Some(path) => Output::File(PathBuf::from(path)),
        }
    }
}

/// Broker connection settings used when the output is [`Output::Kafka`].
#[derive(Debug, Clone, Default)]
pub struct KafkaOptions {
    pub brokers: Vec<String>,
    pub topic: String,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub ca_file: Option<PathBuf>,
    /// Verify the broker's certificate when TLS is enabled.
    pub verify_ssl: bool,
}

/// Opens the sink for `output`.
pub fn open(output: &Output, kafka: &KafkaOptions) -> Result<Box<dyn RecordSink>> {
    match output {
        Output::Stdout => Ok(Box::new(StreamSink::stdout())),
        Output::File(path) => Ok(Box::new(StreamSink::create(path)?)),
        Output::Kafka => open_kafka(kafka),
    }
}

#[cfg(feature = "kafka")]
fn open_kafka(options: &KafkaOptions) -> Result<Box<dyn RecordSink>> {
    Ok(Box::new(kafka::KafkaSink::connect(options)?))
}

#[cfg(not(feature = "kafka"))]
fn open_kafka(_options: &KafkaOptions) -> Result<Box<dyn RecordSink>> {
    Err(crate::core::error::Error::SinkUnavailable(
        "this build has no kafka support; rebuild with the `kafka` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;

    #[test]
    fn parses_outputs() {
        assert_eq!(Output::parse(None), Output::Stdout);
        assert_eq!(Output::parse(Some("")), Output::Stdout);
        assert_eq!(Output::parse(Some("kafka")), Output::Kafka);
        assert_eq!(
            Output::parse(Some("logs.ttl")),
            Output::File(PathBuf::from("logs.ttl"))
        );
    }

    #[test]
    fn kafka_without_brokers_is_unavailable() {
        let result = open(&Output::Kafka, &KafkaOptions::default());
        assert!(matches!(result, Err(Error::SinkUnavailable(_))));
    }
}
