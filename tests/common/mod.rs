#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use gaptrader::domain::bar::Bar;
use gaptrader::domain::error::GaptraderError;
use gaptrader::ports::bar_source::BarSource;

pub fn time(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

pub fn bar(h: u32, m: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        time: time(h, m),
        open,
        high,
        low,
        close,
        volume: 100,
    }
}

/// In-memory bar source used in place of a CSV file or live feed.
pub struct MockBarSource {
    bars: Vec<Bar>,
    cursor: usize,
}

impl MockBarSource {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars, cursor: 0 }
    }
}

impl BarSource for MockBarSource {
    fn next_bar(&mut self) -> Result<Option<Bar>, GaptraderError> {
        let bar = self.bars.get(self.cursor).cloned();
        if bar.is_some() {
            self.cursor += 1;
        }
        Ok(bar)
    }
}

/// Seven fine bars within hour `h` that set up a known long entry on
/// the bar at `h:32`.
///
/// The first two 15-minute buckets close down then up with a low sweep
/// (coarse reversal), and the bars at `h:30..h:32` leave an upward void
/// (fine confirmation). Entry 1.07953, stop 1.079305, risk 2.25 pips,
/// target 1.08178 at a 10:1 ratio.
pub fn long_setup_bars(h: u32) -> Vec<Bar> {
    vec![
        bar(h, 0, 1.07980, 1.07990, 1.07950, 1.07960),
        bar(h, 14, 1.07960, 1.07970, 1.07940, 1.07950),
        bar(h, 15, 1.07950, 1.07955, 1.07930, 1.07940),
        bar(h, 29, 1.07940, 1.07990, 1.07938, 1.07980),
        bar(h, 30, 1.07930, 1.07938, 1.07926, 1.07936),
        bar(h, 31, 1.07942, 1.07952, 1.079405, 1.07950),
        bar(h, 32, 1.07950, 1.07956, 1.07944, 1.07953),
    ]
}

/// A bar inside the open position's range: touches neither the sample entry's
/// stop (1.079305) nor the target (1.08178).
pub fn neutral_bar(h: u32, m: u32) -> Bar {
    bar(h, m, 1.07950, 1.07960, 1.07940, 1.07950)
}
