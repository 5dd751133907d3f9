//! Trade ledger CSV writer.
//!
//! One row per closed trade, in ledger order. Prices carry five decimals,
//! pip quantities two; the same input always serializes to the same bytes.

use std::path::Path;

use crate::domain::engine::BacktestResult;
use crate::domain::error::GaptraderError;
use crate::ports::report_port::ReportPort;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), GaptraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| GaptraderError::Data {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;

        wtr.write_record([
            "entry_time",
            "exit_time",
            "direction",
            "entry_price",
            "exit_price",
            "stop_price",
            "target_price",
            "risk_pips",
            "gross_pips",
            "net_pips",
            "bars_held",
            "exit_reason",
        ])
        .map_err(|e| write_error(output_path, e))?;

        for trade in &result.ledger {
            wtr.write_record([
                trade.entry_time.format(TIME_FORMAT).to_string(),
                trade.exit_time.format(TIME_FORMAT).to_string(),
                trade.direction.to_string(),
                format!("{:.5}", trade.entry_price),
                format!("{:.5}", trade.exit_price),
                format!("{:.5}", trade.stop_price),
                format!("{:.5}", trade.target_price),
                format!("{:.2}", trade.risk_pips),
                format!("{:.2}", trade.gross_pips),
                format!("{:.2}", trade.net_pips),
                trade.bars_held.to_string(),
                trade.exit_reason.to_string(),
            ])
            .map_err(|e| write_error(output_path, e))?;
        }

        wtr.flush().map_err(|e| GaptraderError::Data {
            reason: format!("failed to flush {}: {}", output_path.display(), e),
        })?;
        Ok(())
    }
}

fn write_error(path: &Path, e: csv::Error) -> GaptraderError {
    GaptraderError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}
