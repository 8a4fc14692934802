//! Opaque unique identifiers for users, events and consents.

use rand::Rng;
use uuid::Builder;

/// Returns a random (version 4) UUID in canonical hyphenated form.
///
/// The bits come from `rng`, so seeded runs mint reproducible identifiers.
pub fn new_id(rng: &mut impl Rng) -> String {
    Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

pub fn new_ids(rng: &mut impl Rng, count: usize) -> Vec<String> {
    (0..count).map(|_| new_id(rng)).collect()
}
