//! Strategy parameters.
//!
//! An immutable value built once and handed to the engine at construction,
//! so concurrent runs with different parameters never interfere.

use chrono::{NaiveDateTime, Timelike};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    /// Minimum-quote increment used for pip-denominated accounting.
    pub pip_size: f64,
    /// Target distance as a multiple of the stop distance.
    pub risk_reward_ratio: f64,
    pub spread_pips: f64,
    pub commission_pips: f64,
    /// Price offset beyond the breakout bar's extreme when placing the stop.
    pub stop_buffer: f64,
    /// Hours of day (0-23) allowed to originate a new position.
    pub allowed_hours: HashSet<u32>,
    /// Require the fine-timeframe gap to confirm the coarse bias. When off,
    /// the coarse reversal-breakout alone triggers entries.
    pub require_gap_confirm: bool,
}

impl StrategyConfig {
    /// Round-trip cost in pips, applied once per closed trade.
    pub fn total_cost_pips(&self) -> f64 {
        self.spread_pips + self.commission_pips
    }

    pub fn is_trading_hour(&self, time: &NaiveDateTime) -> bool {
        self.allowed_hours.contains(&time.hour())
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            pip_size: 0.0001,
            risk_reward_ratio: 10.0,
            spread_pips: 0.4,
            commission_pips: 0.3,
            stop_buffer: 0.0001,
            // London open, New York open and the late-session overlap (UTC).
            allowed_hours: [0, 1, 8, 9, 16, 17].into_iter().collect(),
            require_gap_confirm: true,
        }
    }
}
