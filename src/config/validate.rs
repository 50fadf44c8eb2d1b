// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PollwatchError, Result};
use crate::select::PatternSelector;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PollwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let interval = validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.watch, interval))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<Duration> {
    let interval = validate_interval(&cfg.watch.interval)?;
    validate_patterns(cfg)?;
    Ok(interval)
}

fn validate_interval(raw: &str) -> Result<Duration> {
    let interval = parse_duration(raw).map_err(|e| {
        PollwatchError::ConfigError(format!("[watch].interval: {e}"))
    })?;
    if interval.is_zero() {
        return Err(PollwatchError::ConfigError(format!(
            "[watch].interval must be greater than zero (got \"{raw}\")"
        )));
    }
    Ok(interval)
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    let w = &cfg.watch;
    PatternSelector::new(&w.extensions, &w.include, &w.exclude)
        .map_err(|e| PollwatchError::ConfigError(format!("[watch] patterns: {e:#}")))?;
    Ok(())
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(value, 60),
        "h" => scaled_secs(value, 60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn scaled_secs(value: u64, factor: u64) -> std::result::Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: {value} * {factor}s"))
}
