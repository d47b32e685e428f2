//! Controller configuration structs and defaults.
//!
//! Only the plumbing around the control loop is configurable. The fan curve
//! and the poll interval are fixed in `control::curve::ControlConstants`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sensors: SensorSettings,
    pub ipmi: IpmiSettings,
    pub control: ControlSettings,
    pub status: StatusSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    pub command: String,
    pub board_channel: String, // nct6775 system temperature input
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpmiSettings {
    pub command: String,
    pub host: Option<String>, // None = local BMC via /dev/ipmi0
    pub port: u16,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub command_timeout_secs: f64,
    pub dry_run: bool,
    pub restore_auto_on_exit: bool,
}

impl ControlSettings {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.command_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSettings {
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            command: "sensors".to_string(),
            board_channel: "SYSTIN".to_string(),
        }
    }
}

impl Default for IpmiSettings {
    fn default() -> Self {
        Self {
            command: "ipmitool".to_string(),
            host: None,
            port: 623,
            user: "admin".to_string(),
            password: String::new(),
        }
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            command_timeout_secs: 10.0,
            dry_run: false,
            restore_auto_on_exit: false,
        }
    }
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            file: Some("/tmp/fans".to_string()),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
