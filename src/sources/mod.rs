//! Record assemblers for the supported record kinds.

pub mod consent;
pub mod log;

pub use consent::ConsentSource;
pub use log::LogSource;

use crate::core::config::{Config, Field};
use crate::core::error::{Error, Result};
use crate::core::traits::EventSource;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which record the generator assembles; chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Log,
    Consent,
}

impl RecordKind {
    /// Value pools this kind samples from.
    pub fn fields(self) -> &'static [Field] {
        match self {
            RecordKind::Log => &[
                Field::Process,
                Field::Purpose,
                Field::Processing,
                Field::Recipient,
                Field::Storage,
                Field::UserId,
                Field::Data,
            ],
            RecordKind::Consent => &[
                Field::Purpose,
                Field::Processing,
                Field::Recipient,
                Field::Storage,
                Field::UserId,
                Field::Data,
            ],
        }
    }

    /// Validates `config` for this kind and builds the matching source.
    pub fn source(self, config: Arc<Config>, rng: StdRng) -> Result<Box<dyn EventSource>> {
        config.validate(self.fields())?;
        Ok(match self {
            RecordKind::Log => Box::new(LogSource::new(config, rng)),
            RecordKind::Consent => Box::new(ConsentSource::new(config, rng)),
        })
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(RecordKind::Log),
            "consent" => Ok(RecordKind::Consent),
            _ => Err(Error::Usage(format!(
                "type should be one of ['log', 'consent'], received '{value}'"
            ))),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Log => write!(f, "log"),
            RecordKind::Consent => write!(f, "consent"),
        }
    }
}

/// Seeded RNG for reproducible runs, entropy-seeded otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
