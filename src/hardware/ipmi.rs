//! Fan actuator backed by ASRock OEM `ipmitool raw` commands.
//!
//! The BMC takes duty as a plain percentage (0-100), so each value is sent as
//! the hex byte of the percentage (57% -> `0x39`). There is no 0-255 scaling.
//! Every control write carries the manual-mode byte; the BMC mode is never
//! assumed to have persisted from an earlier tick.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::types::IpmiSettings;
use crate::error::{ActuationError, ReadbackError};
use crate::hardware::types::{FanDutyProfile, FanMode, FanTarget, TargetReadback};
use crate::hardware::ActuationGateway;
use crate::system::{executor, parser};

/// Raw bytes for one duty write: `<netfn> <cmd> <mode> <duty...>`.
pub fn set_command_bytes(target: FanTarget, mode: FanMode, profile: &FanDutyProfile) -> Vec<u8> {
    let mut bytes = target.set_command().to_vec();
    bytes.push(mode.as_byte());
    bytes.extend(profile.payload(target));
    bytes
}

/// Duties above 100% are clamped to 100, never rejected.
fn checked_profile(profile: &FanDutyProfile) -> FanDutyProfile {
    if profile.is_in_range() {
        return *profile;
    }
    let clamped = profile.clamped();
    warn!("Duty profile {:?} out of range, clamped to {:?}", profile, clamped);
    clamped
}

/// Merge per-target write results; both targets are always attempted.
fn combine(results: Vec<Result<(), ActuationError>>) -> Result<(), ActuationError> {
    let mut errors = results.into_iter().filter_map(Result::err);
    match (errors.next(), errors.next()) {
        (None, _) => Ok(()),
        (Some(err), None) => Err(err),
        (Some(first), Some(second)) => Err(ActuationError::BothTargets {
            first: Box::new(first),
            second: Box::new(second),
        }),
    }
}

pub struct IpmiFanGateway {
    settings: IpmiSettings,
    timeout: Duration,
    dry_run: bool,
}

impl IpmiFanGateway {
    pub fn new(settings: IpmiSettings, timeout: Duration, dry_run: bool) -> Self {
        Self {
            settings,
            timeout,
            dry_run,
        }
    }

    async fn write_target(
        &self,
        target: FanTarget,
        mode: FanMode,
        profile: &FanDutyProfile,
    ) -> Result<(), ActuationError> {
        let bytes = set_command_bytes(target, mode, profile);

        if self.dry_run {
            info!("[DRY RUN] Would execute: ipmitool raw {}", executor::format_raw_bytes(&bytes));
            return Ok(());
        }

        executor::run_ipmitool_raw(&self.settings, &bytes, self.timeout)
            .await
            .map(|_| ())
            .map_err(|source| ActuationError::Target { target, source })
    }

    async fn write_all(&self, mode: FanMode, profile: &FanDutyProfile) -> Result<(), ActuationError> {
        let mut results = Vec::with_capacity(FanTarget::ALL.len());
        for target in FanTarget::ALL {
            results.push(self.write_target(target, mode, profile).await);
        }
        combine(results)
    }

    /// Hand both fan groups back to the BMC's own curve.
    /// Duties are sent at 100% in case the firmware honours them in auto mode.
    pub async fn restore_auto(&self) -> Result<(), ActuationError> {
        info!("Restoring BMC automatic fan control");
        self.write_all(FanMode::Auto, &FanDutyProfile::FAILSAFE).await
    }

    /// Read the mode and duty bytes currently held by the BMC for each target.
    pub async fn read_fan_config(&self) -> Result<Vec<TargetReadback>, ReadbackError> {
        let mut readbacks = Vec::with_capacity(FanTarget::ALL.len());
        for target in FanTarget::ALL {
            let output = executor::run_ipmitool_raw(&self.settings, &target.get_command(), self.timeout)
                .await
                .map_err(|source| ReadbackError::Command { target, source })?;
            readbacks.push(parser::parse_fan_readback(target, &output)?);
        }
        Ok(readbacks)
    }
}

#[async_trait]
impl ActuationGateway for IpmiFanGateway {
    async fn apply_fan_duties(&self, profile: &FanDutyProfile) -> Result<(), ActuationError> {
        let profile = checked_profile(profile);
        debug!("Applying duties: {:?}", profile);
        self.write_all(FanMode::Manual, &profile).await
    }
}
