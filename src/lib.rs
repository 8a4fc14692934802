//! Special log generator library crate.
//!
//! Exposes the value pools, record sources, serializers and sinks behind the
//! `slg` CLI, plus the `generate` and `configure` entry points.

pub mod configure;
pub mod core;
pub mod formats;
pub mod generate;
pub mod pipeline;
pub mod producer;
pub mod sinks;
pub mod sources;

pub use core::config;
pub use core::error::{Error, Result};
pub use core::event;
pub use core::traits;
