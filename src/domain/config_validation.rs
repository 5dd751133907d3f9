//! Configuration validation.
//!
//! Every parameter problem is rejected here, at engine construction,
//! before any bar is processed.

use std::collections::HashSet;

use super::engine::EngineConfig;
use super::error::GaptraderError;
use super::strategy::StrategyConfig;

pub fn validate_engine_config(config: &EngineConfig) -> Result<(), GaptraderError> {
    validate_strategy_config(&config.strategy)?;

    if config.coarse_bucket.num_seconds() <= 0 {
        return Err(invalid(
            "engine",
            "coarse_bucket_minutes",
            "bucket duration must be positive",
        ));
    }
    if config.max_bars_in_position == 0 {
        return Err(invalid(
            "engine",
            "max_bars_in_position",
            "must be at least 1",
        ));
    }
    Ok(())
}

pub fn validate_strategy_config(config: &StrategyConfig) -> Result<(), GaptraderError> {
    if config.pip_size <= 0.0 {
        return Err(invalid("strategy", "pip_size", "must be positive"));
    }
    if config.risk_reward_ratio <= 0.0 {
        return Err(invalid("strategy", "risk_reward_ratio", "must be positive"));
    }
    if config.spread_pips < 0.0 {
        return Err(invalid("strategy", "spread_pips", "must be non-negative"));
    }
    if config.commission_pips < 0.0 {
        return Err(invalid(
            "strategy",
            "commission_pips",
            "must be non-negative",
        ));
    }
    if config.stop_buffer < 0.0 {
        return Err(invalid("strategy", "stop_buffer", "must be non-negative"));
    }
    if config.allowed_hours.is_empty() {
        return Err(invalid(
            "strategy",
            "allowed_hours",
            "at least one trading hour is required",
        ));
    }
    if let Some(hour) = config.allowed_hours.iter().find(|&&h| h > 23) {
        return Err(invalid(
            "strategy",
            "allowed_hours",
            &format!("hour {} is out of range 0-23", hour),
        ));
    }
    Ok(())
}

/// Parse a comma-separated hour list ("0,1,8,9,16,17") into an hour set.
pub fn parse_allowed_hours(input: &str) -> Result<HashSet<u32>, GaptraderError> {
    let mut hours = HashSet::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(invalid("strategy", "allowed_hours", "empty token in list"));
        }
        let hour: u32 = trimmed.parse().map_err(|_| {
            invalid(
                "strategy",
                "allowed_hours",
                &format!("'{}' is not an hour", trimmed),
            )
        })?;
        if hour > 23 {
            return Err(invalid(
                "strategy",
                "allowed_hours",
                &format!("hour {} is out of range 0-23", hour),
            ));
        }
        hours.insert(hour);
    }
    Ok(hours)
}

fn invalid(section: &str, key: &str, reason: &str) -> GaptraderError {
    GaptraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
