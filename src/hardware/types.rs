//! Hardware data types: temperature samples, duty profiles, and the fixed
//! mapping from logical fan groups onto the two BMC command targets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest duty the BMC accepts, in percent.
pub const MAX_DUTY: u8 = 100;

/// One poll worth of whole-degree temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureSample {
    pub cpu0: i32,
    pub cpu1: i32,
    pub board: i32,
}

/// Duty percentages for the five logical fan groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanDutyProfile {
    pub cpu0: u8,
    pub cpu1: u8,
    pub front: u8,
    pub mid: u8,
    pub rear: u8,
}

impl FanDutyProfile {
    /// Maximum cooling on every group.
    pub const FAILSAFE: FanDutyProfile = FanDutyProfile {
        cpu0: MAX_DUTY,
        cpu1: MAX_DUTY,
        front: MAX_DUTY,
        mid: MAX_DUTY,
        rear: MAX_DUTY,
    };

    /// Copy of the profile with every field limited to `MAX_DUTY`.
    pub fn clamped(&self) -> FanDutyProfile {
        FanDutyProfile {
            cpu0: self.cpu0.min(MAX_DUTY),
            cpu1: self.cpu1.min(MAX_DUTY),
            front: self.front.min(MAX_DUTY),
            mid: self.mid.min(MAX_DUTY),
            rear: self.rear.min(MAX_DUTY),
        }
    }

    pub fn is_in_range(&self) -> bool {
        *self == self.clamped()
    }

    /// Physical duty bytes for a command target, in the order the BMC expects.
    ///
    /// CPU_FAN1 group: CPU_FAN1_1, REAR_FAN1, FRNT_FAN1..3 (the three ganged
    /// 120mm fans all take the mid duty).
    /// CPU_FAN2 group: CPU_FAN2_1, REAR_FAN2, FRNT_FAN4.
    pub fn payload(&self, target: FanTarget) -> Vec<u8> {
        match target {
            FanTarget::Cpu1Group => vec![self.cpu0, self.rear, self.mid, self.mid, self.mid],
            FanTarget::Cpu2Group => vec![self.cpu1, self.rear, self.front],
        }
    }
}

/// The two independently addressed BMC fan command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FanTarget {
    Cpu1Group,
    Cpu2Group,
}

impl FanTarget {
    pub const ALL: [FanTarget; 2] = [FanTarget::Cpu1Group, FanTarget::Cpu2Group];

    /// OEM netfn/command bytes for writing duties.
    pub fn set_command(&self) -> [u8; 2] {
        match self {
            FanTarget::Cpu1Group => [0x3a, 0x01],
            FanTarget::Cpu2Group => [0x3a, 0x11],
        }
    }

    /// OEM netfn/command bytes for reading the current configuration.
    pub fn get_command(&self) -> [u8; 2] {
        match self {
            FanTarget::Cpu1Group => [0x3a, 0x02],
            FanTarget::Cpu2Group => [0x3a, 0x12],
        }
    }

    /// Number of duty bytes following the mode byte.
    pub fn channel_count(&self) -> usize {
        match self {
            FanTarget::Cpu1Group => 5,
            FanTarget::Cpu2Group => 3,
        }
    }

    /// Physical fan headers in payload order. Unlabelled slots are reported by
    /// the BMC but not wired on this board.
    pub fn channel_names(&self) -> &'static [&'static str] {
        match self {
            FanTarget::Cpu1Group => &["CPU_FAN1_1", "REAR_FAN1", "FRNT_FAN1", "FRNT_FAN2", "FRNT_FAN3"],
            FanTarget::Cpu2Group => &["CPU_FAN2_1", "REAR_FAN2", "FRNT_FAN4"],
        }
    }
}

impl fmt::Display for FanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanTarget::Cpu1Group => write!(f, "CPU_FAN1 group"),
            FanTarget::Cpu2Group => write!(f, "CPU_FAN2 group"),
        }
    }
}

/// Fan control mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FanMode {
    Auto,
    Manual,
    Unknown(u8),
}

impl FanMode {
    pub fn as_byte(&self) -> u8 {
        match self {
            FanMode::Auto => 0x00,
            FanMode::Manual => 0x01,
            FanMode::Unknown(b) => *b,
        }
    }

    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => FanMode::Auto,
            0x01 => FanMode::Manual,
            other => FanMode::Unknown(other),
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanMode::Auto => write!(f, "auto"),
            FanMode::Manual => write!(f, "manual"),
            FanMode::Unknown(b) => write!(f, "unknown (0x{:02x})", b),
        }
    }
}

/// Current mode and duties of one target as reported by the BMC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReadback {
    pub target: FanTarget,
    pub mode: FanMode,
    pub duties: Vec<u8>,
}
