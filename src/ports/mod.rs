//! Port traits decoupling the domain from I/O concerns.

pub mod bar_source;
pub mod config_port;
pub mod report_port;
