use super::now_millis;
use crate::core::config::{Config, Field};
use crate::core::error::Result;
use crate::core::event::{LogEvent, Record};
use crate::core::ids::new_id;
use crate::core::sampler::{pick_one, pick_subset};
use crate::core::traits::EventSource;
use rand::rngs::StdRng;
use std::sync::Arc;

/// Assembles log events by sampling every field independently.
pub struct LogSource {
    config: Arc<Config>,
    rng: StdRng,
}

impl LogSource {
    pub fn new(config: Arc<Config>, rng: StdRng) -> Self {
        Self { config, rng }
    }

    pub fn assemble(&mut self) -> Result<LogEvent> {
        let config = &self.config;
        let rng = &mut self.rng;
        Ok(LogEvent {
            timestamp: now_millis(),
            event_id: new_id(rng),
            process: pick_one(rng, Field::Process, &config.process)?,
            purpose: pick_one(rng, Field::Purpose, &config.purpose)?,
            processing: pick_one(rng, Field::Processing, &config.processing)?,
            recipient: pick_one(rng, Field::Recipient, &config.recipient)?,
            storage: pick_one(rng, Field::Storage, &config.storage)?,
            user_id: pick_one(rng, Field::UserId, &config.user_id)?,
            data: pick_subset(rng, Field::Data, &config.data)?,
        })
    }
}

impl EventSource for LogSource {
    fn next_event(&mut self) -> Result<Record> {
        self.assemble().map(Record::Log)
    }
}
