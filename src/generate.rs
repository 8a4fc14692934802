//! Wires configuration, producer, serializer and sink into one generate run.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::formats::{Format, Serializer};
use crate::pipeline::{Pipeline, RunSummary};
use crate::producer::StreamProducer;
use crate::sinks::{self, KafkaOptions, Output};
use crate::sources::{seeded_rng, RecordKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Settings for a generate run, as resolved from the command line.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Pause after each emitted record.
    pub rate: Duration,
    /// Records to emit; `<= 0` streams until the process is terminated.
    pub num: i64,
    pub config: Option<PathBuf>,
    pub output: Output,
    pub format: Format,
    pub kind: RecordKind,
    pub seed: Option<u64>,
    pub kafka: KafkaOptions,
    pub progress_interval: Duration,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            rate: Duration::ZERO,
            num: 10,
            config: None,
            output: Output::Stdout,
            format: Format::Json,
            kind: RecordKind::Log,
            seed: None,
            kafka: KafkaOptions {
                verify_ssl: true,
                ..KafkaOptions::default()
            },
            progress_interval: Duration::from_secs(1),
        }
    }
}

/// Runs the pipeline to completion (bounded) or until failure (unbounded).
pub fn generate(options: &GenerateOptions) -> Result<RunSummary> {
    let mut rng = seeded_rng(options.seed);
    let config = Arc::new(Config::load(options.config.as_deref(), &mut rng)?);
    let source = options.kind.source(config, rng)?;
    let producer = StreamProducer::new(source, options.num, options.rate)?;

    let serializer = Serializer::new(options.format, options.kind);
    let sink = sinks::open(&options.output, &options.kafka)?;

    info!(
        kind = %options.kind,
        format = %options.format,
        num = options.num,
        rate = ?options.rate,
        "starting generator"
    );
    Pipeline::new(serializer, sink)
        .with_progress_interval(options.progress_interval)
        .run(producer.spawn())
}
