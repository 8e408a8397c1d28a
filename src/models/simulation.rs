use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

pub const DEFAULT_MAX_RANGE_DAYS: i64 = 365;
pub const DEFAULT_MIN_INITIAL_CAPITAL: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RebalancePeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl fmt::Display for RebalancePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalancePeriod::Daily => write!(f, "daily"),
            RebalancePeriod::Weekly => write!(f, "weekly"),
            RebalancePeriod::Monthly => write!(f, "monthly"),
            RebalancePeriod::Quarterly => write!(f, "quarterly"),
        }
    }
}

/// A single exit rule. `percent` is the trigger distance, e.g. 5.0 = 5%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRule {
    pub enabled: bool,
    pub percent: f64,
}

impl RiskRule {
    pub fn enabled(percent: f64) -> Self {
        Self {
            enabled: true,
            percent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<RiskRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<RiskRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop: Option<RiskRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizingMethod {
    EqualWeight,
    FixedRatio,
    RiskParity,
    Kelly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSizing {
    pub method: SizingMethod,
    /// Largest single position as a percent of equity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_position_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_positions: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlippageModel {
    Fixed,
    Linear,
    VolatilityBased,
    Tiered,
}

/// Rates are fractions: 0.00015 = 0.015%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingCosts {
    pub commission_rate: f64,
    /// Levied on sells only.
    pub tax_rate: f64,
    pub slippage_model: SlippageModel,
    pub base_slippage: f64,
}

impl Default for TradingCosts {
    fn default() -> Self {
        Self {
            commission_rate: 0.00015,
            tax_rate: 0.0018,
            slippage_model: SlippageModel::Fixed,
            base_slippage: 0.0005,
        }
    }
}

/// Bounds enforced before a config is allowed to leave the process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationLimits {
    pub max_range_days: i64,
    pub min_initial_capital: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
            min_initial_capital: DEFAULT_MIN_INITIAL_CAPITAL,
        }
    }
}

/// Request body of `POST /backtest/run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub strategy_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub benchmark: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub benchmarks: Vec<String>,
    pub rebalance_period: RebalancePeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universe_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_settings: Option<RiskSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_sizing: Option<PositionSizing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_costs: Option<TradingCosts>,
}

impl SimulationConfig {
    pub fn new(
        strategy_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        initial_capital: f64,
        benchmark: &str,
    ) -> Self {
        Self {
            strategy_id: strategy_id.to_string(),
            start_date,
            end_date,
            initial_capital,
            benchmark: benchmark.to_string(),
            benchmarks: Vec::new(),
            rebalance_period: RebalancePeriod::Monthly,
            universe_type: None,
            risk_settings: None,
            position_sizing: None,
            trading_costs: None,
        }
    }

    pub fn range_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Primary benchmark first, extra benchmarks after it, duplicates dropped.
    pub fn all_benchmarks(&self) -> Vec<String> {
        let mut tickers = vec![self.benchmark.clone()];
        for b in &self.benchmarks {
            if !b.is_empty() && !tickers.contains(b) {
                tickers.push(b.clone());
            }
        }
        tickers
    }

    pub fn validate(&self, limits: &ValidationLimits) -> Result<(), ValidationError> {
        if self.strategy_id.trim().is_empty() {
            return Err(ValidationError::MissingStrategy);
        }
        if self.benchmark.trim().is_empty() {
            return Err(ValidationError::MissingBenchmark);
        }

        if self.end_date < self.start_date {
            return Err(ValidationError::InvertedRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        let days = self.range_days();
        if days > limits.max_range_days {
            return Err(ValidationError::RangeTooLong {
                days,
                max_days: limits.max_range_days,
            });
        }

        if !self.initial_capital.is_finite() || self.initial_capital < limits.min_initial_capital {
            return Err(ValidationError::CapitalTooLow {
                capital: self.initial_capital,
                minimum: limits.min_initial_capital,
            });
        }

        if let Some(risk) = &self.risk_settings {
            let rules = [
                ("stop loss", risk.stop_loss),
                ("take profit", risk.take_profit),
                ("trailing stop", risk.trailing_stop),
            ];
            for (rule, setting) in rules {
                if let Some(r) = setting {
                    if r.enabled && !(r.percent.is_finite() && r.percent > 0.0) {
                        return Err(ValidationError::InvalidRiskRule {
                            rule,
                            value: r.percent,
                        });
                    }
                }
            }
        }

        if let Some(sizing) = &self.position_sizing {
            if let Some(pct) = sizing.max_position_pct {
                if !(pct > 0.0 && pct <= 100.0) {
                    return Err(ValidationError::InvalidPositionSizing {
                        field: "max position percent",
                        value: pct,
                    });
                }
            }
            if sizing.max_positions == Some(0) {
                return Err(ValidationError::InvalidPositionSizing {
                    field: "max positions",
                    value: 0.0,
                });
            }
        }

        if let Some(costs) = &self.trading_costs {
            let rates = [
                ("commission rate", costs.commission_rate),
                ("tax rate", costs.tax_rate),
                ("base slippage", costs.base_slippage),
            ];
            for (field, value) in rates {
                if !(value.is_finite() && (0.0..1.0).contains(&value)) {
                    return Err(ValidationError::InvalidRate { field, value });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{date, sample_config};

    #[test]
    fn accepts_full_year() {
        let cfg = sample_config();
        assert_eq!(cfg.range_days(), 364);
        assert!(cfg.validate(&ValidationLimits::default()).is_ok());
    }

    #[test]
    fn accepts_exactly_the_limit() {
        let mut cfg = sample_config();
        cfg.end_date = date(2024, 1, 1);
        assert_eq!(cfg.range_days(), 365);
        assert!(cfg.validate(&ValidationLimits::default()).is_ok());
    }

    #[test]
    fn rejects_window_over_limit() {
        let mut cfg = sample_config();
        cfg.end_date = date(2024, 1, 2);
        assert_eq!(
            cfg.validate(&ValidationLimits::default()),
            Err(ValidationError::RangeTooLong {
                days: 366,
                max_days: 365
            })
        );
    }

    #[test]
    fn rejects_inverted_range() {
        let mut cfg = sample_config();
        cfg.end_date = date(2022, 12, 31);
        assert!(matches!(
            cfg.validate(&ValidationLimits::default()),
            Err(ValidationError::InvertedRange { .. })
        ));
    }

    #[test]
    fn same_day_window_is_valid() {
        let mut cfg = sample_config();
        cfg.end_date = cfg.start_date;
        assert!(cfg.validate(&ValidationLimits::default()).is_ok());
    }

    #[test]
    fn rejects_small_capital() {
        let mut cfg = sample_config();
        cfg.initial_capital = 500_000.0;
        assert!(matches!(
            cfg.validate(&ValidationLimits::default()),
            Err(ValidationError::CapitalTooLow { .. })
        ));

        cfg.initial_capital = f64::NAN;
        assert!(cfg.validate(&ValidationLimits::default()).is_err());
    }

    #[test]
    fn disabled_rule_magnitude_is_ignored() {
        let mut cfg = sample_config();
        cfg.risk_settings = Some(RiskSettings {
            stop_loss: Some(RiskRule {
                enabled: false,
                percent: -3.0,
            }),
            take_profit: Some(RiskRule::enabled(10.0)),
            trailing_stop: None,
        });
        assert!(cfg.validate(&ValidationLimits::default()).is_ok());

        cfg.risk_settings.as_mut().unwrap().trailing_stop = Some(RiskRule::enabled(0.0));
        assert_eq!(
            cfg.validate(&ValidationLimits::default()),
            Err(ValidationError::InvalidRiskRule {
                rule: "trailing stop",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_bad_cost_rates() {
        let mut cfg = sample_config();
        cfg.trading_costs = Some(TradingCosts {
            commission_rate: 1.5,
            ..TradingCosts::default()
        });
        assert!(matches!(
            cfg.validate(&ValidationLimits::default()),
            Err(ValidationError::InvalidRate {
                field: "commission rate",
                ..
            })
        ));
    }

    #[test]
    fn rejects_bad_position_limits() {
        let mut cfg = sample_config();
        cfg.position_sizing = Some(PositionSizing {
            method: SizingMethod::EqualWeight,
            max_position_pct: Some(150.0),
            max_positions: None,
        });
        assert!(cfg.validate(&ValidationLimits::default()).is_err());
    }

    #[test]
    fn benchmarks_are_deduplicated() {
        let mut cfg = sample_config();
        cfg.benchmarks = vec!["KOSPI".into(), "KOSDAQ".into(), String::new()];
        assert_eq!(cfg.all_benchmarks(), vec!["KOSPI", "KOSDAQ"]);
    }

    #[test]
    fn serializes_camel_case_body() {
        let mut cfg = sample_config();
        cfg.trading_costs = Some(TradingCosts::default());
        let body = serde_json::to_value(&cfg).unwrap();
        assert_eq!(body["strategyId"], "momentum_power");
        assert_eq!(body["startDate"], "2023-01-01");
        assert_eq!(body["initialCapital"], 10_000_000.0);
        assert_eq!(body["rebalancePeriod"], "MONTHLY");
        assert_eq!(body["tradingCosts"]["slippageModel"], "FIXED");
        assert!(body.get("riskSettings").is_none());
        assert!(body.get("benchmarks").is_none());
    }
}
