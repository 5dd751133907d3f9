//! Concrete port implementations.

pub mod csv_bar_source;
pub mod csv_report_adapter;
pub mod file_config_adapter;
