//! Temperature gateway backed by the lm-sensors `sensors` command.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::config::types::SensorSettings;
use crate::error::SensorReadError;
use crate::hardware::types::TemperatureSample;
use crate::hardware::SensorGateway;
use crate::system::{executor, parser};

pub struct LmSensorsGateway {
    settings: SensorSettings,
    timeout: Duration,
}

impl LmSensorsGateway {
    pub fn new(settings: SensorSettings, timeout: Duration) -> Self {
        Self { settings, timeout }
    }
}

#[async_trait]
impl SensorGateway for LmSensorsGateway {
    async fn read_temperatures(&self) -> Result<TemperatureSample, SensorReadError> {
        let output = executor::run_sensors(&self.settings.command, self.timeout).await?;
        let sample = parser::parse_temperatures(&output, &self.settings.board_channel)?;
        trace!("Sensor sample: {:?}", sample);
        Ok(sample)
    }
}
