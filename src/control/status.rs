//! Per-tick status snapshot and the file it is published to.
//!
//! The layout is consumed by other tooling, so it must stay stable.

use std::fmt;
use std::path::PathBuf;

use crate::hardware::types::{FanDutyProfile, TemperatureSample};

/// Written in place of the readings when a tick fell back to the fail-safe profile.
pub const FAILURE_NOTICE: &str = "Failed to get fan stats!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSnapshot {
    Applied {
        sample: TemperatureSample,
        profile: FanDutyProfile,
    },
    Failed,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusSnapshot::Applied { sample, profile } => {
                writeln!(f, "Current Temps:")?;
                writeln!(f, "- CPU0: {}", sample.cpu0)?;
                writeln!(f, "- CPU1: {}", sample.cpu1)?;
                writeln!(f, "- MB: {}", sample.board)?;
                writeln!(f)?;
                writeln!(f, "Setting Fans:")?;
                writeln!(f, "- CPU 0: {}%", profile.cpu0)?;
                writeln!(f, "- CPU 1: {}%", profile.cpu1)?;
                writeln!(f, "- Front: {}%", profile.front)?;
                writeln!(f, "- Mid:   {}%", profile.mid)?;
                writeln!(f, "- Rear:  {}%", profile.rear)
            }
            StatusSnapshot::Failed => write!(f, "{}", FAILURE_NOTICE),
        }
    }
}

/// Publishes snapshots to an optional status file, replacing the previous one.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    path: Option<PathBuf>,
}

impl StatusReporter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub async fn publish(&self, snapshot: &StatusSnapshot) -> std::io::Result<()> {
        match &self.path {
            Some(path) => tokio::fs::write(path, snapshot.to_string()).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied() -> StatusSnapshot {
        StatusSnapshot::Applied {
            sample: TemperatureSample { cpu0: 50, cpu1: 40, board: 50 },
            profile: FanDutyProfile { cpu0: 57, cpu1: 35, front: 57, mid: 57, rear: 57 },
        }
    }

    #[test]
    fn applied_layout() {
        let expected = "\
Current Temps:
- CPU0: 50
- CPU1: 40
- MB: 50

Setting Fans:
- CPU 0: 57%
- CPU 1: 35%
- Front: 57%
- Mid:   57%
- Rear:  57%
";
        assert_eq!(applied().to_string(), expected);
    }

    #[test]
    fn failure_layout_is_the_bare_notice() {
        assert_eq!(StatusSnapshot::Failed.to_string(), "Failed to get fan stats!");
    }

    #[tokio::test]
    async fn publish_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fans");
        let reporter = StatusReporter::new(Some(path.clone()));

        reporter.publish(&applied()).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("Current Temps:"));

        reporter.publish(&StatusSnapshot::Failed).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), FAILURE_NOTICE);
    }

    #[tokio::test]
    async fn publish_without_path_is_a_no_op() {
        assert!(StatusReporter::default().publish(&applied()).await.is_ok());
    }
}
