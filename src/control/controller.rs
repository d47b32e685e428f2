//! Fan control loop: sample, compute, actuate, report, sleep.
//!
//! Ticks run strictly one after another. A sensor fault switches that tick to
//! the fail-safe profile; an actuation fault is logged and the next tick tries
//! again. Nothing carries over between ticks.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::control::curve::ControlConstants;
use crate::control::status::{StatusReporter, StatusSnapshot};
use crate::error::{ActuationError, SensorReadError};
use crate::hardware::types::FanDutyProfile;
use crate::hardware::{ActuationGateway, SensorGateway};

/// Outcome of a single tick.
#[derive(Debug)]
pub struct TickReport {
    pub profile: FanDutyProfile,
    pub snapshot: StatusSnapshot,
    pub sensor_error: Option<SensorReadError>,
    pub actuation_error: Option<ActuationError>,
}

impl TickReport {
    pub fn is_failsafe(&self) -> bool {
        self.sensor_error.is_some()
    }
}

pub struct FanController {
    sensors: Arc<dyn SensorGateway>,
    actuator: Arc<dyn ActuationGateway>,
    status: StatusReporter,
    constants: ControlConstants,
    stopped: AtomicBool,
    wake: Notify,
    ticks: AtomicU64,
}

impl FanController {
    pub fn new(
        sensors: Arc<dyn SensorGateway>,
        actuator: Arc<dyn ActuationGateway>,
        status: StatusReporter,
    ) -> Self {
        Self::with_constants(sensors, actuator, status, ControlConstants::default())
    }

    pub fn with_constants(
        sensors: Arc<dyn SensorGateway>,
        actuator: Arc<dyn ActuationGateway>,
        status: StatusReporter,
        constants: ControlConstants,
    ) -> Self {
        Self {
            sensors,
            actuator,
            status,
            constants,
            stopped: AtomicBool::new(false),
            wake: Notify::new(),
            ticks: AtomicU64::new(0),
        }
    }

    pub fn constants(&self) -> &ControlConstants {
        &self.constants
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Run one full cycle. Never fails; faults are carried in the report.
    pub async fn tick(&self) -> TickReport {
        let (profile, snapshot, sensor_error) = match self.sensors.read_temperatures().await {
            Ok(sample) => {
                let profile = self.constants.compute_profile(&sample);
                (profile, StatusSnapshot::Applied { sample, profile }, None)
            }
            Err(e) => {
                warn!("Sensor read failed, applying fail-safe duties: {}", e);
                (FanDutyProfile::FAILSAFE, StatusSnapshot::Failed, Some(e))
            }
        };

        let actuation_error = match self.actuator.apply_fan_duties(&profile).await {
            Ok(()) => None,
            Err(e) => {
                error!("Failed to apply fan duties {:?}: {}", profile, e);
                Some(e)
            }
        };

        info!("{}", snapshot);
        if let Err(e) = self.status.publish(&snapshot).await {
            warn!("Failed to write status file {:?}: {}", self.status.path(), e);
        }

        let count = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        if count % 30 == 0 {
            debug!("Control ticks: {} completed", count);
        }

        TickReport {
            profile,
            snapshot,
            sensor_error,
            actuation_error,
        }
    }

    /// Tick at the fixed poll interval until `stop` is called.
    pub async fn run(&self) {
        info!(
            "Fan control loop started (interval {:?})",
            self.constants.poll_interval
        );

        while !self.is_stopped() {
            self.tick().await;

            if self.is_stopped() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.constants.poll_interval) => {}
                _ = self.wake.notified() => {}
            }
        }

        info!("Fan control loop stopped after {} ticks", self.ticks());
    }

    /// Ask the loop to exit after the tick in progress. A stopped controller
    /// does not tick again.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }
}
