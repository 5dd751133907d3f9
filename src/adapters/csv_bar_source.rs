//! CSV-backed historical bar source.
//!
//! Expected columns: `time,open,high,low,close,volume` with timestamps as
//! `%Y-%m-%d %H:%M:%S`. The whole file is read and validated up front —
//! field sanity and strictly increasing timestamps — so a malformed series
//! fails before the engine sees a single bar.

use chrono::NaiveDateTime;
use std::fs;
use std::path::Path;

use crate::domain::bar::Bar;
use crate::domain::error::GaptraderError;
use crate::ports::bar_source::BarSource;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvBarSource {
    bars: Vec<Bar>,
    cursor: usize,
}

impl CsvBarSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GaptraderError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| GaptraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_csv(&content)
    }

    pub fn from_csv(content: &str) -> Result<Self, GaptraderError> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars: Vec<Bar> = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| GaptraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let time_str = get_field(&record, 0, "time", row)?;
            let time = NaiveDateTime::parse_from_str(time_str, TIME_FORMAT).map_err(|e| {
                GaptraderError::MalformedInput {
                    reason: format!("row {}: invalid timestamp '{}': {}", row + 1, time_str, e),
                }
            })?;

            let bar = Bar {
                time,
                open: parse_price(&record, 1, "open", row)?,
                high: parse_price(&record, 2, "high", row)?,
                low: parse_price(&record, 3, "low", row)?,
                close: parse_price(&record, 4, "close", row)?,
                volume: get_field(&record, 5, "volume", row)?.parse().map_err(|e| {
                    GaptraderError::MalformedInput {
                        reason: format!("row {}: invalid volume value: {}", row + 1, e),
                    }
                })?,
            };
            bar.validate()?;

            if let Some(prev) = bars.last() {
                if bar.time <= prev.time {
                    return Err(GaptraderError::MalformedInput {
                        reason: format!(
                            "row {}: non-monotonic timestamp: {} follows {}",
                            row + 1,
                            bar.time,
                            prev.time
                        ),
                    });
                }
            }
            bars.push(bar);
        }

        Ok(CsvBarSource { bars, cursor: 0 })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

impl BarSource for CsvBarSource {
    fn next_bar(&mut self) -> Result<Option<Bar>, GaptraderError> {
        let bar = self.bars.get(self.cursor).cloned();
        if bar.is_some() {
            self.cursor += 1;
        }
        Ok(bar)
    }
}

fn get_field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<&'a str, GaptraderError> {
    record
        .get(index)
        .ok_or_else(|| GaptraderError::MalformedInput {
            reason: format!("row {}: missing {} column", row + 1, name),
        })
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<f64, GaptraderError> {
    get_field(record, index, name, row)?
        .parse()
        .map_err(|e| GaptraderError::MalformedInput {
            reason: format!("row {}: invalid {} value: {}", row + 1, name, e),
        })
}
