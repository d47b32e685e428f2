//! Config file load and validation.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::config::types::AppConfig;
use crate::config::DEFAULT_CONFIG_PATH;

pub async fn load_config(path: Option<&str>) -> Result<AppConfig> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = if config_path.exists() {
        let content = tokio::fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config {:?}", config_path))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {:?}", config_path))?;
        info!("Loaded configuration from: {:?}", config_path);
        config
    } else {
        info!("Config file {:?} not found, using defaults", config_path);
        AppConfig::default()
    };

    validate_config(&config, &config_path)?;
    Ok(config)
}

fn validate_config(config: &AppConfig, path: &Path) -> Result<()> {
    let timeout = config.control.command_timeout_secs;
    if !timeout.is_finite() || timeout <= 0.0 {
        return Err(anyhow!(
            "{:?}: control.command_timeout_secs must be a positive number of seconds, got {}",
            path,
            timeout
        ));
    }
    if config.sensors.command.trim().is_empty() {
        return Err(anyhow!("{:?}: sensors.command must not be empty", path));
    }
    if config.ipmi.command.trim().is_empty() {
        return Err(anyhow!("{:?}: ipmi.command must not be empty", path));
    }
    if config.sensors.board_channel.trim().is_empty() {
        return Err(anyhow!("{:?}: sensors.board_channel must not be empty", path));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let config = load_config(path.to_str()).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.status.file.as_deref(), Some("/tmp/fans"));
        assert_eq!(config.sensors.board_channel, "SYSTIN");
    }

    #[tokio::test]
    async fn partial_file_keeps_defaults_for_the_rest() {
        let file = write_config(r#"{ "ipmi": { "host": "10.0.0.5" }, "status": { "file": null } }"#);
        let config = load_config(file.path().to_str()).await.unwrap();
        assert_eq!(config.ipmi.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(config.ipmi.port, 623);
        assert_eq!(config.ipmi.command, "ipmitool");
        assert_eq!(config.status.file, None);
        assert_eq!(config.control.command_timeout_secs, 10.0);
    }

    #[tokio::test]
    async fn rejects_non_positive_timeout() {
        let file = write_config(r#"{ "control": { "command_timeout_secs": 0 } }"#);
        let err = load_config(file.path().to_str()).await.unwrap_err();
        assert!(err.to_string().contains("command_timeout_secs"));
    }

    #[tokio::test]
    async fn rejects_empty_ipmitool_command() {
        let file = write_config(r#"{ "ipmi": { "command": "  " } }"#);
        let err = load_config(file.path().to_str()).await.unwrap_err();
        assert!(err.to_string().contains("ipmi.command"));
    }

    #[tokio::test]
    async fn rejects_malformed_json() {
        let file = write_config("{ not json");
        assert!(load_config(file.path().to_str()).await.is_err());
    }
}
