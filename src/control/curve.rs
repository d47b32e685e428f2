//! Fan curve: CPU temperature to duty, and the derived front/mid/rear duties.
//!
//! Each CPU fan scales linearly from 25% at 35°C to 100% at 70°C and is
//! clamped outside that band. Front fans follow the hotter CPU with a 30%
//! floor, mid fans idle at 15% until the CPUs or the board run warm, and rear
//! fans mirror front. There is no hysteresis; every tick is computed fresh.

use std::time::Duration;

use crate::hardware::types::{FanDutyProfile, TemperatureSample, MAX_DUTY};

/// Fixed parameters owned by the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlConstants {
    pub cpu_low_temp: i32,
    pub cpu_high_temp: i32,
    pub cpu_min_duty: u8,
    pub front_floor: u8,
    pub mid_idle_duty: u8,
    /// Front duty above which mid fans follow front.
    pub mid_front_threshold: u8,
    /// Board temperature above which mid fans follow front.
    pub mid_board_threshold: i32,
    pub poll_interval: Duration,
}

impl Default for ControlConstants {
    fn default() -> Self {
        Self {
            cpu_low_temp: 35,
            cpu_high_temp: 70,
            cpu_min_duty: 25,
            front_floor: 30,
            mid_idle_duty: 15,
            mid_front_threshold: 50,
            mid_board_threshold: 45,
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl ControlConstants {
    /// Duty for one CPU fan. Truncates rather than rounds.
    pub fn cpu_duty(&self, temp: i32) -> u8 {
        let low = self.cpu_low_temp as f64;
        let span = self.cpu_high_temp as f64 - low;
        let scale = ((temp as f64 - low) / span).clamp(0.0, 1.0);
        let range = (MAX_DUTY - self.cpu_min_duty) as f64;
        (self.cpu_min_duty as f64 + range * scale) as u8
    }

    pub fn front_duty(&self, cpu0_duty: u8, cpu1_duty: u8) -> u8 {
        cpu0_duty.max(cpu1_duty).max(self.front_floor).min(MAX_DUTY)
    }

    pub fn mid_duty(&self, front_duty: u8, board_temp: i32) -> u8 {
        if front_duty > self.mid_front_threshold || board_temp > self.mid_board_threshold {
            front_duty
        } else {
            self.mid_idle_duty
        }
    }

    pub fn rear_duty(&self, front_duty: u8) -> u8 {
        front_duty.min(MAX_DUTY)
    }

    /// Full duty profile for one temperature sample.
    pub fn compute_profile(&self, sample: &TemperatureSample) -> FanDutyProfile {
        let cpu0 = self.cpu_duty(sample.cpu0);
        let cpu1 = self.cpu_duty(sample.cpu1);
        let front = self.front_duty(cpu0, cpu1);
        FanDutyProfile {
            cpu0,
            cpu1,
            front,
            mid: self.mid_duty(front, sample.board),
            rear: self.rear_duty(front),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> ControlConstants {
        ControlConstants::default()
    }

    fn sample(cpu0: i32, cpu1: i32, board: i32) -> TemperatureSample {
        TemperatureSample { cpu0, cpu1, board }
    }

    #[test]
    fn cpu_duty_floors_at_or_below_low_breakpoint() {
        for t in [-40, 0, 20, 34, 35] {
            assert_eq!(curve().cpu_duty(t), 25, "temp {}", t);
        }
    }

    #[test]
    fn cpu_duty_saturates_at_or_above_high_breakpoint() {
        for t in [70, 71, 90, 200, i32::MAX] {
            assert_eq!(curve().cpu_duty(t), 100, "temp {}", t);
        }
    }

    #[test]
    fn cpu_duty_truncates_between_breakpoints() {
        assert_eq!(curve().cpu_duty(50), 57); // 57.14
        assert_eq!(curve().cpu_duty(40), 35); // 35.71
        assert_eq!(curve().cpu_duty(69), 97); // 97.86
        assert_eq!(curve().cpu_duty(36), 27); // 27.14
    }

    #[test]
    fn cpu_duty_is_monotonic() {
        let mut prev = curve().cpu_duty(-100);
        for t in -99..=250 {
            let duty = curve().cpu_duty(t);
            assert!(duty >= prev, "duty dropped at {}°C: {} < {}", t, duty, prev);
            prev = duty;
        }
    }

    #[test]
    fn front_tracks_hotter_cpu_with_floor() {
        for a in (0..=100u8).step_by(5) {
            for b in (0..=100u8).step_by(5) {
                let expected = a.max(b).max(30).min(100);
                assert_eq!(curve().front_duty(a, b), expected);
            }
        }
    }

    #[test]
    fn mid_idles_unless_front_high_or_board_warm() {
        assert_eq!(curve().mid_duty(50, 45), 15);
        assert_eq!(curve().mid_duty(30, 20), 15);
        assert_eq!(curve().mid_duty(51, 45), 51);
        assert_eq!(curve().mid_duty(30, 46), 30);
        assert_eq!(curve().mid_duty(100, 90), 100);
    }

    #[test]
    fn rear_mirrors_front() {
        for front in 0..=100u8 {
            assert_eq!(curve().rear_duty(front), front);
        }
    }

    #[test]
    fn warm_board_example() {
        let profile = curve().compute_profile(&sample(50, 40, 50));
        assert_eq!(profile, FanDutyProfile { cpu0: 57, cpu1: 35, front: 57, mid: 57, rear: 57 });
    }

    #[test]
    fn idle_example() {
        let profile = curve().compute_profile(&sample(20, 20, 30));
        assert_eq!(profile, FanDutyProfile { cpu0: 25, cpu1: 25, front: 30, mid: 15, rear: 30 });
    }

    #[test]
    fn every_field_in_range_for_extreme_inputs() {
        let extremes = [i32::MIN, -40, 0, 35, 45, 46, 70, 200, i32::MAX / 2];
        for &c0 in &extremes {
            for &c1 in &extremes {
                for &board in &extremes {
                    let p = curve().compute_profile(&sample(c0, c1, board));
                    assert!(p.is_in_range(), "{:?} from ({}, {}, {})", p, c0, c1, board);
                    assert_eq!(p.rear, p.front);
                    assert!(p.front >= 30);
                }
            }
        }
    }
}
