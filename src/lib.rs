pub mod analytics;
pub mod backtesting;
pub mod config;
pub mod error;
pub mod models;
#[cfg(test)]
pub mod test_helpers;
pub mod transport;
