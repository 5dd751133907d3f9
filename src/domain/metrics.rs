//! Performance summary over a trade ledger.
//!
//! A read-only projection computed once at the end of a run. All pip
//! quantities are net of transaction costs unless named gross.

use super::position::{ClosedTrade, ExitReason};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Fraction of trades with positive net result (0.0-1.0).
    pub win_rate: f64,
    pub total_net_pips: f64,
    /// Mean net pips of target exits; 0 when there are none.
    pub avg_win_pips: f64,
    /// Absolute mean net pips of stop exits; 0 when there are none.
    pub avg_loss_pips: f64,
    /// avg_win / avg_loss; infinite when wins exist without stop losses.
    pub risk_reward_ratio: f64,
    /// Deepest peak-to-trough decline of the cumulative net curve (<= 0).
    pub max_drawdown_pips: f64,
    pub stop_exits: usize,
    pub target_exits: usize,
    pub timeout_exits: usize,
    pub avg_bars_held: f64,
}

impl Summary {
    pub fn compute(ledger: &[ClosedTrade]) -> Self {
        let total_trades = ledger.len();
        let wins = ledger.iter().filter(|t| t.net_pips > 0.0).count();
        let losses = total_trades - wins;

        let win_rate = if total_trades > 0 {
            wins as f64 / total_trades as f64
        } else {
            0.0
        };

        let total_net_pips: f64 = ledger.iter().map(|t| t.net_pips).sum();

        let mut stop_exits = 0usize;
        let mut target_exits = 0usize;
        let mut timeout_exits = 0usize;
        let mut target_net = 0.0_f64;
        let mut stop_net = 0.0_f64;
        let mut total_bars_held = 0usize;

        for trade in ledger {
            match trade.exit_reason {
                ExitReason::Stop => {
                    stop_exits += 1;
                    stop_net += trade.net_pips;
                }
                ExitReason::Target => {
                    target_exits += 1;
                    target_net += trade.net_pips;
                }
                ExitReason::Timeout => timeout_exits += 1,
            }
            total_bars_held += trade.bars_held;
        }

        let avg_win_pips = if target_exits > 0 {
            target_net / target_exits as f64
        } else {
            0.0
        };

        let avg_loss_pips = if stop_exits > 0 {
            (stop_net / stop_exits as f64).abs()
        } else {
            0.0
        };

        let risk_reward_ratio = if avg_loss_pips > 0.0 {
            avg_win_pips / avg_loss_pips
        } else if avg_win_pips > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let max_drawdown_pips = compute_drawdown(ledger);

        let avg_bars_held = if total_trades > 0 {
            total_bars_held as f64 / total_trades as f64
        } else {
            0.0
        };

        Summary {
            total_trades,
            wins,
            losses,
            win_rate,
            total_net_pips,
            avg_win_pips,
            avg_loss_pips,
            risk_reward_ratio,
            max_drawdown_pips,
            stop_exits,
            target_exits,
            timeout_exits,
            avg_bars_held,
        }
    }
}

/// Minimum of (cumulative net - running peak) over the ledger, with the
/// flat starting equity of zero as the initial peak.
fn compute_drawdown(ledger: &[ClosedTrade]) -> f64 {
    let mut cumulative = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for trade in ledger {
        cumulative += trade.net_pips;
        if cumulative > peak {
            peak = cumulative;
        }
        let dd = cumulative - peak;
        if dd < max_dd {
            max_dd = dd;
        }
    }

    max_dd
}
