//! Position lifecycle and closed-trade records.
//!
//! A run holds zero or one open position. The state machine is
//! `Flat -> Open -> (closed, back to Flat)`; exits on a single bar are
//! checked stop first, then target, then timeout, so a bar whose range
//! spans both stop and target always closes at the stop.

use chrono::NaiveDateTime;
use std::fmt;

use super::bar::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1.0 for long, -1.0 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "BUY"),
            Direction::Short => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Stop,
    Target,
    Timeout,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Stop => write!(f, "stop"),
            ExitReason::Target => write!(f, "target"),
            ExitReason::Timeout => write!(f, "timeout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    pub risk_pips: f64,
    pub entry_time: NaiveDateTime,
    pub bars_held: usize,
}

/// Exit condition fired by a bar: the fill price and why.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionExit {
    pub price: f64,
    pub reason: ExitReason,
}

impl Position {
    fn stop_hit(&self, bar: &Bar) -> bool {
        match self.direction {
            Direction::Long => bar.low <= self.stop_price,
            Direction::Short => bar.high >= self.stop_price,
        }
    }

    fn target_hit(&self, bar: &Bar) -> bool {
        match self.direction {
            Direction::Long => bar.high >= self.target_price,
            Direction::Short => bar.low <= self.target_price,
        }
    }

    /// Evaluate the exit conditions against one fine bar, in priority
    /// order: stop, target, timeout. Stop and target fill at their
    /// configured price; timeout fills at the bar's close.
    pub fn check_exit(&self, bar: &Bar, max_bars_in_position: usize) -> Option<PositionExit> {
        if self.stop_hit(bar) {
            return Some(PositionExit {
                price: self.stop_price,
                reason: ExitReason::Stop,
            });
        }
        if self.target_hit(bar) {
            return Some(PositionExit {
                price: self.target_price,
                reason: ExitReason::Target,
            });
        }
        if self.bars_held >= max_bars_in_position {
            return Some(PositionExit {
                price: bar.close,
                reason: ExitReason::Timeout,
            });
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Open(Position),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    pub risk_pips: f64,
    pub gross_pips: f64,
    pub net_pips: f64,
    pub bars_held: usize,
    pub exit_reason: ExitReason,
}
