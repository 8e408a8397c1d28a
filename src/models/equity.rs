use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One sample of the equity curve. Benchmark values are keyed by ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub benchmarks: HashMap<String, f64>,
}

impl EquityPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            benchmarks: HashMap::new(),
        }
    }

    pub fn with_benchmark(mut self, ticker: &str, value: f64) -> Self {
        self.benchmarks.insert(ticker.to_string(), value);
        self
    }

    pub fn benchmark(&self, ticker: &str) -> Option<f64> {
        self.benchmarks.get(ticker).copied()
    }
}

pub fn strategy_values(points: &[EquityPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

/// Every benchmark ticker that appears anywhere on the curve, sorted.
pub fn benchmark_tickers(points: &[EquityPoint]) -> Vec<String> {
    let mut tickers: Vec<String> = points
        .iter()
        .flat_map(|p| p.benchmarks.keys().cloned())
        .collect();
    tickers.sort();
    tickers.dedup();
    tickers
}
