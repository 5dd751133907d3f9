//! Coarse-timeframe bar aggregation.
//!
//! Folds a fine-grained bar sequence into fixed-width, timestamp-aligned
//! buckets. A coarse bar is emitted exactly once, the instant a fine bar
//! arrives whose timestamp falls outside the current bucket; the trailing
//! bucket is only emitted by [`BarAggregator::finish`]. Buckets that receive
//! no fine bars produce no coarse bar.

use chrono::{DateTime, Duration, NaiveDateTime};

use super::bar::Bar;
use super::error::GaptraderError;

#[derive(Debug, Clone)]
struct Bucket {
    start: NaiveDateTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

impl Bucket {
    fn open_with(start: NaiveDateTime, bar: &Bar) -> Self {
        Bucket {
            start,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }

    fn fold(&mut self, bar: &Bar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
    }

    fn into_bar(self) -> Bar {
        Bar {
            time: self.start,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BarAggregator {
    bucket_secs: i64,
    current: Option<Bucket>,
    last_time: Option<NaiveDateTime>,
}

impl BarAggregator {
    pub fn new(bucket: Duration) -> Self {
        let bucket_secs = bucket.num_seconds();
        assert!(bucket_secs > 0, "bucket duration must be positive");
        BarAggregator {
            bucket_secs,
            current: None,
            last_time: None,
        }
    }

    /// Bucket start for a timestamp: floored to a multiple of the bucket
    /// width since the UNIX epoch.
    fn bucket_start(&self, time: NaiveDateTime) -> NaiveDateTime {
        let secs = time.and_utc().timestamp();
        let floored = secs - secs.rem_euclid(self.bucket_secs);
        DateTime::from_timestamp(floored, 0)
            .expect("floored timestamp in range")
            .naive_utc()
    }

    /// Feed one fine bar. Returns the completed coarse bar when `bar` opens
    /// a new bucket, closing the previous one.
    pub fn append(&mut self, bar: &Bar) -> Result<Option<Bar>, GaptraderError> {
        if let Some(last) = self.last_time {
            if bar.time <= last {
                return Err(GaptraderError::MalformedInput {
                    reason: format!(
                        "non-monotonic timestamp: {} follows {}",
                        bar.time, last
                    ),
                });
            }
        }
        self.last_time = Some(bar.time);

        let start = self.bucket_start(bar.time);
        match self.current.as_mut() {
            None => {
                self.current = Some(Bucket::open_with(start, bar));
                Ok(None)
            }
            Some(bucket) if bucket.start == start => {
                bucket.fold(bar);
                Ok(None)
            }
            Some(_) => {
                let closed = self.current.replace(Bucket::open_with(start, bar));
                Ok(closed.map(Bucket::into_bar))
            }
        }
    }

    /// Flush the trailing in-progress bucket, if any. Used by the batch
    /// path once the input is exhausted; a live caller that wants only
    /// closed buckets never calls this.
    pub fn finish(&mut self) -> Option<Bar> {
        self.current.take().map(Bucket::into_bar)
    }
}

/// Batch aggregation over a finite series: equivalent to appending every
/// bar and flushing the trailing bucket.
pub fn aggregate(bars: &[Bar], bucket: Duration) -> Result<Vec<Bar>, GaptraderError> {
    let mut aggregator = BarAggregator::new(bucket);
    let mut coarse = Vec::new();
    for bar in bars {
        if let Some(closed) = aggregator.append(bar)? {
            coarse.push(closed);
        }
    }
    if let Some(trailing) = aggregator.finish() {
        coarse.push(trailing);
    }
    Ok(coarse)
}
