pub mod config;
pub mod logging;

pub mod order;
pub mod retry;
