//! Report output port trait.

use crate::domain::engine::BacktestResult;
use crate::domain::error::GaptraderError;
use std::path::Path;

/// Port for persisting a completed run: the trade ledger plus summary.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), GaptraderError>;
}
