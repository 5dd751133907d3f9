//! Property tests for aggregation and engine invariants.
//!
//! Uses proptest to verify:
//! 1. Batch aggregation and incremental append + flush agree exactly
//! 2. Coarse bars match a naive per-bucket regrouping of the fine series
//! 3. The engine is deterministic and never overlaps trades in time
//! 4. Every closed trade conserves cost: net = gross - round-trip cost

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use gaptrader::domain::aggregate::{aggregate, BarAggregator};
use gaptrader::domain::bar::Bar;
use gaptrader::domain::engine::{BacktestEngine, EngineConfig};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Gap to the previous bar in minutes, open, upper wick, lower wick,
/// close position within the range, volume.
fn arb_bar_shape() -> impl Strategy<Value = (u32, f64, f64, f64, f64, i64)> {
    (
        1u32..40,
        0.9f64..1.1,
        0.0f64..0.01,
        0.0f64..0.01,
        0.0f64..=1.0,
        0i64..1000,
    )
}

fn arb_bar_series() -> impl Strategy<Value = Vec<Bar>> {
    proptest::collection::vec(arb_bar_shape(), 0..150).prop_map(build_bars)
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn build_bars(shapes: Vec<(u32, f64, f64, f64, f64, i64)>) -> Vec<Bar> {
    let mut time = base_time();
    let mut bars = Vec::with_capacity(shapes.len());
    for (gap_minutes, open, upper, lower, close_frac, volume) in shapes {
        time += chrono::Duration::minutes(gap_minutes as i64);
        let high = open + upper;
        let low = open - lower;
        let close = low + close_frac * (high - low);
        bars.push(Bar {
            time,
            open,
            high,
            low,
            close,
            volume,
        });
    }
    bars
}

/// Independent regrouping of the fine series by floored bucket start.
fn reference_buckets(bars: &[Bar], bucket_secs: i64) -> Vec<Bar> {
    let mut out: Vec<Bar> = Vec::new();
    for bar in bars {
        let secs = bar.time.and_utc().timestamp();
        let start_secs = secs - secs.rem_euclid(bucket_secs);
        let start = DateTime::from_timestamp(start_secs, 0).unwrap().naive_utc();
        match out.last_mut() {
            Some(bucket) if bucket.time == start => {
                bucket.high = bucket.high.max(bar.high);
                bucket.low = bucket.low.min(bar.low);
                bucket.close = bar.close;
                bucket.volume += bar.volume;
            }
            _ => out.push(Bar {
                time: start,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            }),
        }
    }
    out
}

// ── 1. Batch / incremental parity ────────────────────────────────────

proptest! {
    /// Replaying a fine series through the incremental interface, flushing
    /// the trailing bucket, yields exactly the batch result.
    #[test]
    fn batch_and_incremental_agree(
        bars in arb_bar_series(),
        bucket_minutes in 1i64..120,
    ) {
        let bucket = chrono::Duration::minutes(bucket_minutes);
        let batch = aggregate(&bars, bucket).unwrap();

        let mut aggregator = BarAggregator::new(bucket);
        let mut incremental = Vec::new();
        for bar in &bars {
            if let Some(closed) = aggregator.append(bar).unwrap() {
                incremental.push(closed);
            }
        }
        incremental.extend(aggregator.finish());

        prop_assert_eq!(batch, incremental);
    }
}

// ── 2. Aggregation correctness ───────────────────────────────────────

proptest! {
    /// Every coarse bar equals the first-open/max-high/min-low/last-close/
    /// sum-volume of exactly the fine bars in its bucket, and buckets
    /// without fine bars never appear.
    #[test]
    fn coarse_bars_match_reference_grouping(
        bars in arb_bar_series(),
        bucket_minutes in 1i64..120,
    ) {
        let bucket = chrono::Duration::minutes(bucket_minutes);
        let coarse = aggregate(&bars, bucket).unwrap();
        let expected = reference_buckets(&bars, bucket_minutes * 60);

        prop_assert_eq!(coarse, expected);
    }

    /// Coarse timestamps are strictly increasing and aligned to the bucket
    /// width.
    #[test]
    fn coarse_timestamps_aligned_and_increasing(
        bars in arb_bar_series(),
        bucket_minutes in 1i64..120,
    ) {
        let bucket = chrono::Duration::minutes(bucket_minutes);
        let coarse = aggregate(&bars, bucket).unwrap();

        for pair in coarse.windows(2) {
            prop_assert!(pair[0].time < pair[1].time);
        }
        for bar in &coarse {
            let secs = bar.time.and_utc().timestamp();
            prop_assert_eq!(secs.rem_euclid(bucket_minutes * 60), 0);
        }
    }
}

// ── 3 & 4. Engine invariants over arbitrary series ───────────────────

proptest! {
    /// Two runs over the same series produce identical ledgers, trades
    /// never overlap in time, and every trade settles net = gross - cost.
    #[test]
    fn engine_invariants_hold(bars in arb_bar_series()) {
        let config = EngineConfig::default();
        let total_cost = config.strategy.total_cost_pips();

        let run = |bars: &[Bar]| {
            let mut engine = BacktestEngine::new(config.clone()).unwrap();
            for bar in bars {
                engine.on_bar(bar.clone()).unwrap();
            }
            engine.finish()
        };

        let first = run(&bars);
        let second = run(&bars);
        prop_assert_eq!(&first.ledger, &second.ledger);

        for pair in first.ledger.windows(2) {
            prop_assert!(pair[1].entry_time >= pair[0].exit_time);
        }
        for trade in &first.ledger {
            prop_assert_eq!(trade.net_pips, trade.gross_pips - total_cost);
            prop_assert!(trade.exit_time > trade.entry_time || trade.bars_held == 0);
        }
    }
}
