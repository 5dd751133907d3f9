//! Backtest engine and per-bar event loop.
//!
//! Drives the strategy in strict timestamp order: each fine bar first feeds
//! the coarse aggregator, then either asks the signal generator for an entry
//! (when flat) or runs the exit checks (when open). The coarse window holds
//! completed buckets only, so a signal can never read data from a bucket the
//! current bar belongs to.

use chrono::{Duration, NaiveDateTime};

use super::aggregate::BarAggregator;
use super::bar::Bar;
use super::config_validation::validate_engine_config;
use super::cost::CostModel;
use super::error::GaptraderError;
use super::metrics::Summary;
use super::position::{ClosedTrade, Position, PositionState};
use super::signal::{Signal, SignalGenerator};
use super::strategy::StrategyConfig;
use crate::ports::bar_source::BarSource;

/// Fine bars kept for the three-bar gap window.
const FINE_WINDOW: usize = 3;
/// Coarse bars kept for the two-bar reversal-breakout window.
const COARSE_WINDOW: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub strategy: StrategyConfig,
    /// Width of the coarse aggregation bucket.
    pub coarse_bucket: Duration,
    /// Fine bars a position may be held before a timeout exit.
    pub max_bars_in_position: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            strategy: StrategyConfig::default(),
            coarse_bucket: Duration::minutes(15),
            max_bars_in_position: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub time: NaiveDateTime,
    /// Cumulative net pips after the trade closed at `time`.
    pub equity_pips: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub ledger: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub summary: Summary,
    pub bars_processed: usize,
}

#[derive(Debug)]
pub struct BacktestEngine {
    signals: SignalGenerator,
    cost: CostModel,
    aggregator: BarAggregator,
    max_bars_in_position: usize,
    coarse: Vec<Bar>,
    fine: Vec<Bar>,
    state: PositionState,
    ledger: Vec<ClosedTrade>,
    equity_curve: Vec<EquityPoint>,
    equity_pips: f64,
    last_time: Option<NaiveDateTime>,
    bars_processed: usize,
}

impl BacktestEngine {
    /// Build an engine from a validated configuration. All parameter
    /// problems surface here, before any bar is processed.
    pub fn new(config: EngineConfig) -> Result<Self, GaptraderError> {
        validate_engine_config(&config)?;

        let cost = CostModel::new(
            config.strategy.pip_size,
            config.strategy.total_cost_pips(),
        );
        Ok(BacktestEngine {
            signals: SignalGenerator::new(config.strategy),
            cost,
            aggregator: BarAggregator::new(config.coarse_bucket),
            max_bars_in_position: config.max_bars_in_position,
            coarse: Vec::new(),
            fine: Vec::new(),
            state: PositionState::Flat,
            ledger: Vec::new(),
            equity_curve: Vec::new(),
            equity_pips: 0.0,
            last_time: None,
            bars_processed: 0,
        })
    }

    /// The currently open position, if any.
    pub fn position(&self) -> Option<&Position> {
        match &self.state {
            PositionState::Open(position) => Some(position),
            PositionState::Flat => None,
        }
    }

    pub fn ledger(&self) -> &[ClosedTrade] {
        &self.ledger
    }

    /// Process one fine bar. Returns the trade closed by this bar, if any.
    ///
    /// A bar that opens a position is also checked for an exit, with
    /// `bars_held` still zero, so a stop inside the entry bar's range
    /// closes the trade immediately.
    pub fn on_bar(&mut self, bar: Bar) -> Result<Option<ClosedTrade>, GaptraderError> {
        if let Some(last) = self.last_time {
            if bar.time <= last {
                return Err(GaptraderError::MalformedInput {
                    reason: format!("non-monotonic timestamp: {} follows {}", bar.time, last),
                });
            }
        }
        self.last_time = Some(bar.time);
        self.bars_processed += 1;

        if let Some(closed) = self.aggregator.append(&bar)? {
            self.coarse.push(closed);
            if self.coarse.len() > COARSE_WINDOW {
                self.coarse.remove(0);
            }
        }

        let current = bar.clone();
        self.fine.push(bar);
        if self.fine.len() > FINE_WINDOW {
            self.fine.remove(0);
        }

        let mut opened_this_bar = false;
        if self.state.is_flat() {
            if let Some(signal) = self.signals.evaluate(&self.coarse, &self.fine) {
                self.open_position(signal, current.time);
                opened_this_bar = true;
            }
        }

        let exit = match &mut self.state {
            PositionState::Open(position) => {
                if !opened_this_bar {
                    position.bars_held += 1;
                }
                position
                    .check_exit(&current, self.max_bars_in_position)
                    .map(|exit| (position.clone(), exit))
            }
            PositionState::Flat => None,
        };

        if let Some((position, exit)) = exit {
            let settlement =
                self.cost
                    .settle(position.direction, position.entry_price, exit.price);
            let trade = ClosedTrade {
                entry_time: position.entry_time,
                exit_time: current.time,
                direction: position.direction,
                entry_price: position.entry_price,
                exit_price: exit.price,
                stop_price: position.stop_price,
                target_price: position.target_price,
                risk_pips: position.risk_pips,
                gross_pips: settlement.gross_pips,
                net_pips: settlement.net_pips,
                bars_held: position.bars_held,
                exit_reason: exit.reason,
            };

            self.state = PositionState::Flat;
            self.equity_pips += trade.net_pips;
            self.equity_curve.push(EquityPoint {
                time: trade.exit_time,
                equity_pips: self.equity_pips,
            });
            self.ledger.push(trade.clone());
            return Ok(Some(trade));
        }

        Ok(None)
    }

    fn open_position(&mut self, signal: Signal, entry_time: NaiveDateTime) {
        // A second open while one is active is a dispatch defect, not a
        // recoverable input condition.
        assert!(
            self.state.is_flat(),
            "attempted to open a position while another is open"
        );
        self.state = PositionState::Open(Position {
            direction: signal.direction,
            entry_price: signal.entry_price,
            stop_price: signal.stop_price,
            target_price: signal.target_price,
            risk_pips: signal.risk_pips,
            entry_time,
            bars_held: 0,
        });
    }

    /// Drain a bar source to exhaustion and produce the final result.
    pub fn run(mut self, source: &mut dyn BarSource) -> Result<BacktestResult, GaptraderError> {
        while let Some(bar) = source.next_bar()? {
            self.on_bar(bar)?;
        }
        Ok(self.finish())
    }

    /// Close the run and compute the summary. Any still-open position stays
    /// unresolved; only closed trades appear in the ledger.
    pub fn finish(self) -> BacktestResult {
        let summary = Summary::compute(&self.ledger);
        BacktestResult {
            ledger: self.ledger,
            equity_curve: self.equity_curve,
            summary,
            bars_processed: self.bars_processed,
        }
    }
}
