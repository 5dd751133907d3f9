//! Entry signal generation.
//!
//! Composes the two timeframes: the coarse series sets direction via the
//! reversal-breakout pattern, the fine series times the entry via the
//! three-bar gap. The engine only calls [`SignalGenerator::evaluate`] while
//! flat, so at most one signal is produced per fine bar.

use super::bar::Bar;
use super::pattern::{detect_gap, detect_reversal_breakout};
use super::position::Direction;
use super::strategy::StrategyConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    pub risk_pips: f64,
}

#[derive(Debug, Clone)]
pub struct SignalGenerator {
    config: StrategyConfig,
}

impl SignalGenerator {
    pub fn new(config: StrategyConfig) -> Self {
        SignalGenerator { config }
    }

    /// Evaluate the latest bars of both series. `coarse` holds completed
    /// coarse bars only; `fine` ends at the bar currently being processed.
    pub fn evaluate(&self, coarse: &[Bar], fine: &[Bar]) -> Option<Signal> {
        if coarse.len() < 2 || fine.len() < 2 {
            return None;
        }

        let bias =
            detect_reversal_breakout(&coarse[coarse.len() - 2], &coarse[coarse.len() - 1])?;

        if self.config.require_gap_confirm {
            let gap = detect_gap(fine, fine.len() - 1)?;
            if !gap.confirms(bias) {
                return None;
            }
        }

        let curr = &fine[fine.len() - 1];
        if !self.config.is_trading_hour(&curr.time) {
            return None;
        }

        let prev = &fine[fine.len() - 2];
        let entry_price = curr.close;
        let stop_price = match bias {
            Direction::Long => prev.low - self.config.stop_buffer,
            Direction::Short => prev.high + self.config.stop_buffer,
        };

        let risk_pips = bias.sign() * (entry_price - stop_price) / self.config.pip_size;
        // Stop on the wrong side of the entry invalidates the setup.
        if risk_pips <= 0.0 {
            return None;
        }

        let target_price = entry_price
            + bias.sign() * risk_pips * self.config.risk_reward_ratio * self.config.pip_size;

        Some(Signal {
            direction: bias,
            entry_price,
            stop_price,
            target_price,
            risk_pips,
        })
    }
}
