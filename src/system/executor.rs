//! Subprocess executor for `sensors` and `ipmitool`.
//! Every invocation is bounded by the configured command timeout.

use std::process::Output;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::types::IpmiSettings;
use crate::error::CommandError;

/// Split a configured command line into its program and a Command carrying
/// any leading arguments.
fn command_from_line(line: &str, fallback: &str) -> (String, tokio::process::Command) {
    let mut parts = line.split_whitespace();
    let program = parts.next().unwrap_or(fallback).to_string();
    let mut cmd = tokio::process::Command::new(&program);
    cmd.args(parts);
    (program, cmd)
}

/// Build an ipmitool Command with the correct interface flags.
/// With a configured host, routes via LAN to a remote BMC.
/// Otherwise, uses the local /dev/ipmi0 interface.
pub fn build_ipmitool_command(settings: &IpmiSettings) -> (String, tokio::process::Command) {
    let (program, mut cmd) = command_from_line(&settings.command, "ipmitool");

    if let Some(host) = &settings.host {
        debug!("IPMI routing to remote BMC: {}:{}", host, settings.port);
        let port = settings.port.to_string();
        cmd.args([
            "-I",
            "lanplus",
            "-H",
            host.as_str(),
            "-p",
            port.as_str(),
            "-U",
            settings.user.as_str(),
            "-P",
            settings.password.as_str(),
        ]);
    } else {
        cmd.args(["-I", "open"]);
    }

    (program, cmd)
}

/// Render raw bytes the way ipmitool expects them on the command line.
pub fn format_raw_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Execute `ipmitool raw <bytes>` and return stdout.
pub async fn run_ipmitool_raw(
    settings: &IpmiSettings,
    bytes: &[u8],
    timeout: Duration,
) -> Result<String, CommandError> {
    let (program, mut cmd) = build_ipmitool_command(settings);
    cmd.arg("raw");
    for byte in bytes {
        cmd.arg(format!("0x{:02x}", byte));
    }

    debug!("Executing: {} raw {}", program, format_raw_bytes(bytes));
    run_with_timeout(&program, cmd, timeout).await
}

/// Execute the lm-sensors command and return its text output.
pub async fn run_sensors(command: &str, timeout: Duration) -> Result<String, CommandError> {
    let (program, cmd) = command_from_line(command, "sensors");

    trace!("Executing: {}", command);
    run_with_timeout(&program, cmd, timeout).await
}

async fn run_with_timeout(
    program: &str,
    mut cmd: tokio::process::Command,
    timeout: Duration,
) -> Result<String, CommandError> {
    // A timed-out child is killed when its future is dropped.
    cmd.kill_on_drop(true);

    let output: Output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(result) => result.map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            return Err(CommandError::Timeout {
                program: program.to_string(),
                after: timeout,
            })
        }
    };

    if !output.status.success() {
        return Err(CommandError::Failed {
            program: program.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
