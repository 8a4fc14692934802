use super::now_millis;
use crate::core::config::{Config, Field};
use crate::core::error::Result;
use crate::core::event::{ConsentEvent, Record, SimplePolicy};
use crate::core::ids::new_id;
use crate::core::sampler::pick_one;
use crate::core::traits::EventSource;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;

/// Assembles consents holding between one and `maxPolicySize` simple policies.
pub struct ConsentSource {
    config: Arc<Config>,
    rng: StdRng,
}

impl ConsentSource {
    pub fn new(config: Arc<Config>, rng: StdRng) -> Self {
        Self { config, rng }
    }

    pub fn assemble(&mut self) -> Result<ConsentEvent> {
        let max_policies = self.config.max_policy_size.max(1);
        let policy_count = self.rng.gen_range(1..=max_policies);
        let simple_policies = (0..policy_count)
            .map(|_| self.simple_policy())
            .collect::<Result<Vec<_>>>()?;
        Ok(ConsentEvent {
            consent_id: new_id(&mut self.rng),
            timestamp: now_millis(),
            user_id: pick_one(&mut self.rng, Field::UserId, &self.config.user_id)?,
            simple_policies,
        })
    }

    fn simple_policy(&mut self) -> Result<SimplePolicy> {
        let config = &self.config;
        let rng = &mut self.rng;
        Ok(SimplePolicy {
            purpose: pick_one(rng, Field::Purpose, &config.purpose)?,
            processing: pick_one(rng, Field::Processing, &config.processing)?,
            recipient: pick_one(rng, Field::Recipient, &config.recipient)?,
            storage: pick_one(rng, Field::Storage, &config.storage)?,
            data: pick_one(rng, Field::Data, &config.data)?,
        })
    }
}

impl EventSource for ConsentSource {
    fn next_event(&mut self) -> Result<Record> {
        self.assemble().map(Record::Consent)
    }
}
