//! OHLCV bar representation.

use chrono::NaiveDateTime;

use super::error::GaptraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// close > open
    pub fn is_up(&self) -> bool {
        self.close > self.open
    }

    /// close < open
    pub fn is_down(&self) -> bool {
        self.close < self.open
    }

    /// Reject bars with non-positive prices, an inconsistent high/low range,
    /// or negative volume. Called at ingestion; the engine assumes bars that
    /// reach it are well-formed.
    pub fn validate(&self) -> Result<(), GaptraderError> {
        if self.open <= 0.0 || self.high <= 0.0 || self.low <= 0.0 || self.close <= 0.0 {
            return Err(GaptraderError::MalformedInput {
                reason: format!("non-positive price in bar at {}", self.time),
            });
        }
        let body_high = self.open.max(self.close);
        let body_low = self.open.min(self.close);
        if self.low > body_low || self.high < body_high {
            return Err(GaptraderError::MalformedInput {
                reason: format!("high/low range excludes open/close in bar at {}", self.time),
            });
        }
        if self.volume < 0 {
            return Err(GaptraderError::MalformedInput {
                reason: format!("negative volume in bar at {}", self.time),
            });
        }
        Ok(())
    }
}
