//! Parsers for `sensors` text output and `ipmitool raw` read-back bytes.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ReadbackError, SensorReadError};
use crate::hardware::types::{FanMode, FanTarget, TargetReadback, TemperatureSample};

/// coretemp package line, e.g. `Package id 1:  +45.0°C  (high = +80.0°C, crit = +90.0°C)`
fn package_regex() -> &'static Regex {
    static PACKAGE: OnceLock<Regex> = OnceLock::new();
    PACKAGE.get_or_init(|| {
        Regex::new(r"Package id (\d+):\s+\+([^\s°]+)").expect("package regex is valid")
    })
}

/// Parse the digits after a `+` sign, truncating toward zero. The token runs
/// up to the unit or whitespace and must be a plain decimal.
fn parse_reading(field: &str, raw: &str) -> Result<i32, SensorReadError> {
    Some(raw)
        .filter(|r| r.chars().all(|c| c.is_ascii_digit() || c == '.'))
        .and_then(|r| r.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i32)
        .ok_or_else(|| SensorReadError::Malformed {
            field: field.to_string(),
            raw: raw.to_string(),
        })
}

/// Extract both CPU package temperatures and the board channel from
/// lm-sensors output. The first reading per package index wins.
pub fn parse_temperatures(output: &str, board_channel: &str) -> Result<TemperatureSample, SensorReadError> {
    let mut packages: BTreeMap<u8, i32> = BTreeMap::new();
    for caps in package_regex().captures_iter(output) {
        let Ok(socket) = caps[1].parse::<u8>() else {
            continue;
        };
        if packages.contains_key(&socket) {
            continue;
        }
        let value = parse_reading(&format!("Package id {}", socket), &caps[2])?;
        packages.insert(socket, value);
    }

    let cpu0 = *packages.get(&0).ok_or(SensorReadError::MissingCpu { socket: 0 })?;
    let cpu1 = *packages.get(&1).ok_or(SensorReadError::MissingCpu { socket: 1 })?;

    // Anchored to the start of the label so `AUXSYSTIN` never answers for `SYSTIN`.
    let board_pattern = format!(r"(?m)^\s*{}:\s+\+([^\s°]+)", regex::escape(board_channel));
    let board_regex = Regex::new(&board_pattern).map_err(|_| SensorReadError::Malformed {
        field: "board channel".to_string(),
        raw: board_channel.to_string(),
    })?;
    let board_raw = board_regex
        .captures(output)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| SensorReadError::MissingBoard {
            channel: board_channel.to_string(),
        })?;
    let board = parse_reading(board_channel, &board_raw)?;

    Ok(TemperatureSample { cpu0, cpu1, board })
}

/// Parse `ipmitool raw 0x3a 0x02` / `0x3a 0x12` output: a mode byte followed by
/// one duty byte per channel, as whitespace separated hex.
pub fn parse_fan_readback(target: FanTarget, output: &str) -> Result<TargetReadback, ReadbackError> {
    let malformed = || ReadbackError::Malformed {
        target,
        raw: output.trim().to_string(),
    };

    let bytes = output
        .split_whitespace()
        .map(|tok| u8::from_str_radix(tok.trim_start_matches("0x"), 16))
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| malformed())?;

    let (mode, duties) = bytes.split_first().ok_or_else(malformed)?;
    if duties.len() < target.channel_count() {
        return Err(malformed());
    }

    Ok(TargetReadback {
        target,
        mode: FanMode::from_byte(*mode),
        duties: duties[..target.channel_count()].to_vec(),
    })
}
