//! Chart pattern predicates.
//!
//! Both detectors are pure functions over a short window of bars and look
//! only at bars up to the window's right edge.

use super::bar::Bar;
use super::position::Direction;

/// Direction of a three-bar price void.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapDirection {
    Up,
    Down,
}

impl GapDirection {
    /// Whether this gap confirms a trade in the given direction.
    pub fn confirms(&self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (GapDirection::Up, Direction::Long) | (GapDirection::Down, Direction::Short)
        )
    }
}

/// Reversal bar that sweeps the prior bar's extreme.
///
/// Long: `prev` closes down, `curr` closes up, and `curr`'s low trades
/// below `prev`'s low. Short is the mirror image on the highs.
pub fn detect_reversal_breakout(prev: &Bar, curr: &Bar) -> Option<Direction> {
    if prev.is_down() && curr.is_up() && curr.low < prev.low {
        return Some(Direction::Long);
    }
    if prev.is_up() && curr.is_down() && curr.high > prev.high {
        return Some(Direction::Short);
    }
    None
}

/// Three-bar price void between `bars[i-2]` and `bars[i]`.
///
/// Up: the outer bars both close up and `bars[i-2].high < bars[i].low`
/// leaves an untouched interval. Down is the mirror image. The middle bar
/// created the imbalance; its body is not constrained.
pub fn detect_gap(bars: &[Bar], i: usize) -> Option<GapDirection> {
    if i < 2 || i >= bars.len() {
        return None;
    }
    let first = &bars[i - 2];
    let last = &bars[i];

    if first.is_up() && last.is_up() && first.high < last.low {
        return Some(GapDirection::Up);
    }
    if first.is_down() && last.is_down() && first.low > last.high {
        return Some(GapDirection::Down);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn time(m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, m, 0)
            .unwrap()
    }

    fn bar(m: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            time: time(m),
            open,
            high,
            low,
            close,
            volume: 100,
        }
    }

    mod reversal_breakout {
        use super::*;

        #[test]
        fn long_on_down_then_up_sweeping_low() {
            let prev = bar(0, 1.0810, 1.0815, 1.0795, 1.0800);
            let curr = bar(1, 1.0800, 1.0812, 1.0790, 1.0808);
            assert_eq!(detect_reversal_breakout(&prev, &curr), Some(Direction::Long));
        }

        #[test]
        fn short_on_up_then_down_sweeping_high() {
            let prev = bar(0, 1.0800, 1.0815, 1.0795, 1.0810);
            let curr = bar(1, 1.0810, 1.0820, 1.0798, 1.0802);
            assert_eq!(
                detect_reversal_breakout(&prev, &curr),
                Some(Direction::Short)
            );
        }

        #[test]
        fn none_without_extreme_sweep() {
            // Down then up, but curr's low holds above prev's low.
            let prev = bar(0, 1.0810, 1.0815, 1.0795, 1.0800);
            let curr = bar(1, 1.0800, 1.0812, 1.0796, 1.0808);
            assert_eq!(detect_reversal_breakout(&prev, &curr), None);
        }

        #[test]
        fn none_when_both_bars_same_direction() {
            let prev = bar(0, 1.0800, 1.0815, 1.0795, 1.0810);
            let curr = bar(1, 1.0810, 1.0825, 1.0790, 1.0820);
            assert_eq!(detect_reversal_breakout(&prev, &curr), None);
        }

        #[test]
        fn none_on_doji_prev() {
            let prev = bar(0, 1.0800, 1.0815, 1.0795, 1.0800);
            let curr = bar(1, 1.0800, 1.0812, 1.0790, 1.0808);
            assert_eq!(detect_reversal_breakout(&prev, &curr), None);
        }
    }

    mod gap {
        use super::*;

        fn up_gap_triple() -> Vec<Bar> {
            vec![
                bar(0, 1.0800, 1.0810, 1.0795, 1.0808),
                bar(1, 1.0808, 1.0830, 1.0806, 1.0828),
                bar(2, 1.0828, 1.0840, 1.0815, 1.0835),
            ]
        }

        fn down_gap_triple() -> Vec<Bar> {
            vec![
                bar(0, 1.0840, 1.0845, 1.0830, 1.0832),
                bar(1, 1.0832, 1.0834, 1.0805, 1.0808),
                bar(2, 1.0808, 1.0820, 1.0795, 1.0800),
            ]
        }

        #[test]
        fn up_gap_detected() {
            let bars = up_gap_triple();
            assert_eq!(detect_gap(&bars, 2), Some(GapDirection::Up));
        }

        #[test]
        fn down_gap_detected() {
            let bars = down_gap_triple();
            assert_eq!(detect_gap(&bars, 2), Some(GapDirection::Down));
        }

        #[test]
        fn no_gap_when_ranges_overlap() {
            let bars = vec![
                bar(0, 1.0800, 1.0820, 1.0795, 1.0808),
                bar(1, 1.0808, 1.0830, 1.0806, 1.0828),
                bar(2, 1.0828, 1.0840, 1.0815, 1.0835),
            ];
            assert_eq!(detect_gap(&bars, 2), None);
        }

        #[test]
        fn no_gap_when_outer_bars_disagree() {
            // Void exists between the highs and lows but the last bar
            // closes down.
            let mut bars = up_gap_triple();
            bars[2].close = 1.0820;
            assert_eq!(detect_gap(&bars, 2), None);
        }

        #[test]
        fn middle_bar_body_is_ignored() {
            // A doji middle bar does not veto the gap.
            let mut bars = up_gap_triple();
            bars[1].close = bars[1].open;
            assert_eq!(detect_gap(&bars, 2), Some(GapDirection::Up));
        }

        #[test]
        fn out_of_range_index_yields_none() {
            let bars = up_gap_triple();
            assert_eq!(detect_gap(&bars, 1), None);
            assert_eq!(detect_gap(&bars, 3), None);
            assert_eq!(detect_gap(&[], 0), None);
        }
    }

    #[test]
    fn gap_confirmation_pairs() {
        assert!(GapDirection::Up.confirms(Direction::Long));
        assert!(GapDirection::Down.confirms(Direction::Short));
        assert!(!GapDirection::Up.confirms(Direction::Short));
        assert!(!GapDirection::Down.confirms(Direction::Long));
    }
}
