//! CLI command handlers, one per file.

mod config;
mod simulate;
mod validate_order;

pub use config::run_config;
pub use simulate::{parse_retry_budget, run_simulate, SimulateOptions};
pub use validate_order::run_validate_order;
