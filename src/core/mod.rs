//! Shared record types, configuration and sampling primitives.

pub mod config;
pub mod error;
pub mod event;
pub mod ids;
pub mod rate;
pub mod sampler;
pub mod traits;
