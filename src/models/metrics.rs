use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading cost totals in currency units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub commission: f64,
    pub tax: f64,
    pub slippage: f64,
    pub total: f64,
    /// Sum of realized P&L before costs.
    pub gross_profit: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakStats {
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    #[serde(default)]
    pub avg_holding_days: Option<f64>,
}

/// Performance summary of a finished backtest. Percent fields are in
/// percent units (12.5 = 12.5%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    pub total_return: Option<f64>,
    pub cagr: Option<f64>,
    /// Signed: a 18.5% drawdown is stored as -18.5.
    pub max_drawdown: f64,
    /// CAGR divided by max drawdown (floored at 1). This is not a Sharpe
    /// ratio: there is no volatility term.
    pub return_over_drawdown: Option<f64>,
    /// Annualized mean/stddev of period returns.
    pub sharpe_ratio: Option<f64>,
    /// `None` until at least one trade has closed.
    pub win_rate: Option<f64>,
    pub trade_count: usize,
    pub profit_factor: Option<f64>,
    pub avg_return: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub costs: Option<CostBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaks: Option<StreakStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    VeryHigh,
    High,
    Medium,
    Low,
    Independent,
}

impl CorrelationStrength {
    /// Buckets on |r|.
    pub fn classify(r: f64) -> Self {
        let r = r.abs();
        if r >= 0.8 {
            CorrelationStrength::VeryHigh
        } else if r >= 0.6 {
            CorrelationStrength::High
        } else if r >= 0.4 {
            CorrelationStrength::Medium
        } else if r >= 0.2 {
            CorrelationStrength::Low
        } else {
            CorrelationStrength::Independent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationStrength::VeryHigh => "very high",
            CorrelationStrength::High => "high",
            CorrelationStrength::Medium => "medium",
            CorrelationStrength::Low => "low",
            CorrelationStrength::Independent => "independent",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparisonRow {
    pub ticker: String,
    pub total_return: Option<f64>,
    pub cagr: Option<f64>,
    /// Strategy total return minus benchmark total return.
    pub excess_return: Option<f64>,
    pub excess_cagr: Option<f64>,
    pub correlation: Option<f64>,
    pub correlation_strength: Option<CorrelationStrength>,
}

impl BenchmarkComparisonRow {
    pub fn empty(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            total_return: None,
            cagr: None,
            excess_return: None,
            excess_cagr: None,
            correlation: None,
            correlation_strength: None,
        }
    }
}
