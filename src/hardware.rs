//! Gateway traits for the temperature source and the fan actuator, plus the
//! lm-sensors and IPMI implementations.

use async_trait::async_trait;

pub mod ipmi;
pub mod sensors;
pub mod types;

pub use ipmi::IpmiFanGateway;
pub use sensors::LmSensorsGateway;

use crate::error::{ActuationError, SensorReadError};
use types::{FanDutyProfile, TemperatureSample};

#[async_trait]
pub trait SensorGateway: Send + Sync {
    /// Read both CPU package temperatures and the board temperature.
    /// All three must be present or the read fails.
    async fn read_temperatures(&self) -> Result<TemperatureSample, SensorReadError>;
}

#[async_trait]
pub trait ActuationGateway: Send + Sync {
    /// Write a duty profile to every fan target, forcing manual mode.
    async fn apply_fan_duties(&self, profile: &FanDutyProfile) -> Result<(), ActuationError>;
}
