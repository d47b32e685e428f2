//! Closed-loop fan controller for a dual-socket board whose fans are driven
//! through BMC OEM commands.
//!
//! Temperatures come from lm-sensors, duties go out through `ipmitool raw`,
//! and the [`control::FanController`] ties the two together on a fixed cadence.

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod hardware;
pub mod system;
