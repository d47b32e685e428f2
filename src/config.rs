//! Configuration types and JSON file persistence.

pub mod persistence;
pub mod types;

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/fan-manager/config.json";
