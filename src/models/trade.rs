use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    #[serde(alias = "buy")]
    Buy,
    #[serde(alias = "sell")]
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
    TrailingStop,
    Rebalance,
    Forced,
    Expired,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Signal => write!(f, "signal"),
            ExitReason::StopLoss => write!(f, "stop_loss"),
            ExitReason::TakeProfit => write!(f, "take_profit"),
            ExitReason::TrailingStop => write!(f, "trailing_stop"),
            ExitReason::Rebalance => write!(f, "rebalance"),
            ExitReason::Forced => write!(f, "forced"),
            ExitReason::Expired => write!(f, "expired"),
        }
    }
}

/// A fill reported by the backtest. Sell-side fields are `None` on buys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub date: NaiveDate,
    pub ticker: String,
    pub side: TradeSide,
    pub quantity: f64,
    pub price: f64,
    pub amount: f64,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub pnl_percent: Option<f64>,
    #[serde(default)]
    pub holding_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<ExitReason>,
}

impl Trade {
    pub fn buy(date: NaiveDate, ticker: &str, quantity: f64, price: f64) -> Self {
        Self {
            date,
            ticker: ticker.to_string(),
            side: TradeSide::Buy,
            quantity,
            price,
            amount: quantity * price,
            pnl: None,
            pnl_percent: None,
            holding_days: None,
            exit_reason: None,
        }
    }

    pub fn sell(
        date: NaiveDate,
        ticker: &str,
        quantity: f64,
        price: f64,
        pnl: f64,
        pnl_percent: f64,
        holding_days: u32,
        exit_reason: ExitReason,
    ) -> Self {
        Self {
            date,
            ticker: ticker.to_string(),
            side: TradeSide::Sell,
            quantity,
            price,
            amount: quantity * price,
            pnl: Some(pnl),
            pnl_percent: Some(pnl_percent),
            holding_days: Some(holding_days),
            exit_reason: Some(exit_reason),
        }
    }

    pub fn is_sell(&self) -> bool {
        self.side == TradeSide::Sell
    }
}
