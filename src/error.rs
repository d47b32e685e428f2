//! Typed errors for the sensor and actuation boundaries.
//!
//! The control loop recovers from every one of these within a single tick, but
//! keeping them distinct lets callers (and tests) tell a sensor fault from a
//! failed fan write.

use std::time::Duration;

use crate::hardware::types::FanTarget;

/// Failure of an external command (`sensors`, `ipmitool`).
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {after:?}")]
    Timeout { program: String, after: Duration },

    #[error("{program} exited with {status}: {stderr}", status = exit_code_label(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "signal".to_string(),
    }
}

/// The temperature source could not produce a complete sample.
#[derive(thiserror::Error, Debug)]
pub enum SensorReadError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("no reading for CPU package {socket}")]
    MissingCpu { socket: u8 },

    #[error("no reading for board channel {channel}")]
    MissingBoard { channel: String },

    #[error("unparseable reading for {field}: {raw:?}")]
    Malformed { field: String, raw: String },
}

/// One or both fan-group writes failed.
#[derive(thiserror::Error, Debug)]
pub enum ActuationError {
    #[error("fan write to {target} failed: {source}")]
    Target {
        target: FanTarget,
        #[source]
        source: CommandError,
    },

    #[error("fan writes to both targets failed: {first}; {second}")]
    BothTargets {
        first: Box<ActuationError>,
        second: Box<ActuationError>,
    },
}

impl ActuationError {
    /// Targets whose write failed.
    pub fn failed_targets(&self) -> Vec<FanTarget> {
        match self {
            ActuationError::Target { target, .. } => vec![*target],
            ActuationError::BothTargets { first, second } => {
                let mut targets = first.failed_targets();
                targets.extend(second.failed_targets());
                targets
            }
        }
    }
}

/// Reading back the BMC fan configuration failed.
#[derive(thiserror::Error, Debug)]
pub enum ReadbackError {
    #[error("fan read-back from {target} failed: {source}")]
    Command {
        target: FanTarget,
        #[source]
        source: CommandError,
    },

    #[error("unexpected read-back from {target}: {raw:?}")]
    Malformed { target: FanTarget, raw: String },
}
