//! Shared types: errors and configuration.

pub mod config;
pub mod errors;

pub use config::{ApiConfig, Config, SseConfig};
pub use errors::{Error, Result};
