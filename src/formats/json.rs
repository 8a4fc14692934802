//! Structured JSON encoding: one compact object per record, camelCase keys.

use crate::core::error::{Error, Result};
use crate::core::event::Record;

pub fn encode(record: &Record) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|err| Error::Serialization(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::event::{ConsentEvent, LogEvent};
    use crate::sources::{seeded_rng, ConsentSource, LogSource};
    use std::sync::Arc;

    #[test]
    fn log_event_round_trips() {
        let mut rng = seeded_rng(Some(51));
        let config = Arc::new(Config::defaults(&mut rng));
        let mut source = LogSource::new(config, rng);
        for _ in 0..20 {
            let event = source.assemble().expect("event");
            let bytes = encode(&Record::Log(event.clone())).expect("encode");
            let decoded: LogEvent = serde_json::from_slice(&bytes).expect("decode");
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn consent_event_round_trips() {
        let mut rng = seeded_rng(Some(52));
        let config = Arc::new(Config::defaults(&mut rng));
        let mut source = ConsentSource::new(config, rng);
        let event = source.assemble().expect("event");
        let bytes = encode(&Record::Consent(event.clone())).expect("encode");
        let decoded: ConsentEvent = serde_json::from_slice(&bytes).expect("decode");
        assert_eq!(decoded, event);
    }

    #[test]
    fn keys_are_stable() {
        let event = LogEvent {
            timestamp: 1_525_000_000_000,
            event_id: "e-1".to_string(),
            process: "mailinglist".to_string(),
            purpose: "svpu:Marketing".to_string(),
            processing: "svpr:Collect".to_string(),
            recipient: "svr:Ours".to_string(),
            storage: "svl:EU".to_string(),
            user_id: "u-1".to_string(),
            data: vec!["svd:Contact".to_string()],
        };
        let value: serde_json::Value =
            serde_json::from_slice(&encode(&Record::Log(event)).expect("encode")).expect("json");
        let object = value.as_object().expect("object");
        for key in [
            "timestamp",
            "eventId",
            "process",
            "purpose",
            "processing",
            "recipient",
            "storage",
            "userId",
            "data",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object.len(), 9);
    }
}
