//! Kafka sink publishing each record to a topic, keyed by the record id.

use super::KafkaOptions;
use crate::core::error::{Error, Result};
use crate::core::traits::RecordSink;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

/// Retries the client makes before a publish is reported as failed.
pub const MAX_SEND_RETRIES: u32 = 10;

const METADATA_TIMEOUT: Duration = Duration::from_secs(10);
const QUEUE_TIMEOUT: Duration = Duration::from_secs(30);
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Synchronous publisher: every record is acknowledged by all in-sync replicas
/// before the next one is written.
pub struct KafkaSink {
    producer: FutureProducer,
    runtime: Runtime,
    topic: String,
}

impl KafkaSink {
    /// Creates the producer and checks that the brokers answer for `topic`.
    pub fn connect(options: &KafkaOptions) -> Result<Self> {
        let config = client_config(options)?;
        let runtime = Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|err| Error::SinkUnavailable(format!("kafka runtime: {err}")))?;
        let producer: FutureProducer = {
            let _guard = runtime.enter();
            config.create()?
        };
        producer
            .client()
            .fetch_metadata(Some(&options.topic), METADATA_TIMEOUT)?;
        info!(
            brokers = %options.brokers.join(","),
            topic = %options.topic,
            "connected to kafka"
        );
        Ok(Self {
            producer,
            runtime,
            topic: options.topic.clone(),
        })
    }
}

impl RecordSink for KafkaSink {
    fn write_record(&mut self, key: &str, payload: &[u8]) -> Result<()> {
        let record = FutureRecord::to(&self.topic).key(key).payload(payload);
        let delivery = self
            .runtime
            .block_on(self.producer.send(record, QUEUE_TIMEOUT))
            .map_err(|(err, _)| Error::SinkUnavailable(format!("kafka publish: {err}")))?;
        debug!(key, ?delivery, "record published");
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.producer.flush(FLUSH_TIMEOUT)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush()
    }
}

/// Producer settings: all-replica acks, bounded retries, optional mutual TLS.
pub fn client_config(options: &KafkaOptions) -> Result<ClientConfig> {
    let brokers: Vec<&str> = options
        .brokers
        .iter()
        .map(|broker| broker.trim())
        .filter(|broker| !broker.is_empty())
        .collect();
    if brokers.is_empty() {
        return Err(Error::SinkUnavailable(
            "a list of initial brokers must be given when using the kafka output".to_string(),
        ));
    }
    if options.topic.trim().is_empty() {
        return Err(Error::SinkUnavailable(
            "a topic must be given when using the kafka output".to_string(),
        ));
    }

    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", brokers.join(","))
        .set("acks", "all")
        .set("message.send.max.retries", MAX_SEND_RETRIES.to_string())
        .set("message.timeout.ms", "30000");

    match (&options.cert_file, &options.key_file, &options.ca_file) {
        (Some(_), Some(_), Some(_)) if !cfg!(feature = "ssl") => {
            return Err(Error::SinkUnavailable(
                "TLS requires slg to be built with the `ssl` feature".to_string(),
            ));
        }
        (Some(cert), Some(key), Some(ca)) => {
            config
                .set("security.protocol", "ssl")
                .set("ssl.certificate.location", cert.display().to_string())
                .set("ssl.key.location", key.display().to_string())
                .set("ssl.ca.location", ca.display().to_string())
                .set(
                    "enable.ssl.certificate.verification",
                    options.verify_ssl.to_string(),
                );
            if !options.verify_ssl {
                config.set("ssl.endpoint.identification.algorithm", "none");
            }
        }
        (None, None, None) => {}
        _ => warn!("cert, key and CA files are all required for TLS; connecting without TLS"),
    }

    Ok(config)
}
