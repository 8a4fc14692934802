use thiserror::Error;

/// Errors that abort a generator run.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration document is unreadable or has the wrong shape.
    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    /// A value pool required by the active record kind has no candidates.
    #[error("value pool '{0}' is empty")]
    EmptyPool(&'static str),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// The output file or broker could not be opened or written.
    #[error("sink unavailable: {0}")]
    SinkUnavailable(String),

    /// Invalid flag values or combinations.
    #[error("usage error: {0}")]
    Usage(String),
}

#[cfg(feature = "kafka")]
impl From<rdkafka::error::KafkaError> for Error {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Error::SinkUnavailable(format!("kafka: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
