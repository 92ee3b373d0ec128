//! Configuration module
//!
//! Server, census client and logging settings, read from a TOML file.

pub mod config;

pub use config::{CensusConfig, Config, LoggingConfig, ServerConfig};
