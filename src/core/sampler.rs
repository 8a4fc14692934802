//! Uniform sampling from value pools.
//!
//! Subsets are drawn from a shuffled private copy, so callers may keep sharing
//! the pool. Subset length is uniform in `[1, len]`: a non-empty pool never
//! yields an empty subset.

use crate::core::config::Field;
use crate::core::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Picks one element of `pool` uniformly at random.
pub fn pick_one(rng: &mut impl Rng, field: Field, pool: &[String]) -> Result<String> {
    pool.choose(rng)
        .cloned()
        .ok_or(Error::EmptyPool(field.name()))
}

/// Returns a randomly ordered subset of `pool` with between 1 and `pool.len()` elements.
pub fn pick_subset(rng: &mut impl Rng, field: Field, pool: &[String]) -> Result<Vec<String>> {
    if pool.is_empty() {
        return Err(Error::EmptyPool(field.name()));
    }
    let mut values = pool.to_vec();
    values.shuffle(rng);
    let length = rng.gen_range(1..=values.len());
    values.truncate(length);
    Ok(values)
}
