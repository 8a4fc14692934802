//! Record serializers.

pub mod json;
pub mod ttl;

pub use ttl::TtlTemplate;

use crate::core::error::{Error, Result};
use crate::core::event::Record;
use crate::sources::RecordKind;
use std::fmt;
use std::str::FromStr;

/// Output encoding requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Ttl,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "ttl" => Ok(Format::Ttl),
            _ => Err(Error::Usage(format!(
                "format should be one of ['json', 'ttl'], received '{value}'"
            ))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Ttl => write!(f, "ttl"),
        }
    }
}

/// Serialization strategy, resolved once from the format and record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serializer {
    Json,
    Ttl(TtlTemplate),
}

impl Serializer {
    pub fn new(format: Format, kind: RecordKind) -> Self {
        match (format, kind) {
            (Format::Json, _) => Serializer::Json,
            (Format::Ttl, RecordKind::Log) => Serializer::Ttl(TtlTemplate::Log),
            (Format::Ttl, RecordKind::Consent) => Serializer::Ttl(TtlTemplate::Consent),
        }
    }

    pub fn serialize(&self, record: &Record) -> Result<Vec<u8>> {
        match self {
            Serializer::Json => json::encode(record),
            Serializer::Ttl(template) => template
                .render(record, &mut rand::thread_rng())
                .map(String::into_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("TTL".parse::<Format>().unwrap(), Format::Ttl);
        assert!(matches!("xml".parse::<Format>(), Err(Error::Usage(_))));
    }

    #[test]
    fn selects_template_per_kind() {
        assert_eq!(
            Serializer::new(Format::Ttl, RecordKind::Consent),
            Serializer::Ttl(TtlTemplate::Consent)
        );
        assert_eq!(Serializer::new(Format::Json, RecordKind::Log), Serializer::Json);
    }
}
