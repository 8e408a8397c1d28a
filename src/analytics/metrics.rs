use chrono::NaiveDate;

use super::benchmark::{benchmark_series, compare};
use super::equity_stats::{
    annualized_sharpe, cagr, daily_returns, drawdown_series, periods_per_year, return_over_drawdown,
    total_return_pct, years_between,
};
use super::trade_stats::{streaks, summarize, trading_costs};
use crate::models::{
    equity, BenchmarkComparisonRow, EquityPoint, Metrics, Trade, TradingCosts,
};

/// Derive the full metric set from a finished run. Deterministic: the same
/// curve and trades always give the same `Metrics`.
pub fn compute_metrics(
    curve: &[EquityPoint],
    trades: &[Trade],
    costs: Option<&TradingCosts>,
) -> Metrics {
    let values = equity::strategy_values(curve);
    let drawdown = drawdown_series(&values);

    let (total_return, cagr_pct) = match (curve.first(), curve.last()) {
        (Some(first), Some(last)) if curve.len() >= 2 => (
            total_return_pct(first.value, last.value),
            cagr(first.value, last.value, years_between(first.date, last.date)),
        ),
        _ => (None, None),
    };

    let dates: Vec<NaiveDate> = curve.iter().map(|p| p.date).collect();
    let sharpe_ratio = periods_per_year(&dates)
        .and_then(|ppy| annualized_sharpe(&daily_returns(&values), ppy));

    let summary = summarize(trades);

    Metrics {
        total_return,
        cagr: cagr_pct,
        max_drawdown: -drawdown.max_drawdown_pct,
        return_over_drawdown: cagr_pct.map(|c| return_over_drawdown(c, drawdown.max_drawdown_pct)),
        sharpe_ratio,
        win_rate: (summary.closed_trades > 0).then_some(summary.win_rate),
        trade_count: trades.len(),
        profit_factor: summary.profit_factor,
        avg_return: summary.avg_return_pct,
        costs: costs.map(|c| trading_costs(trades, c)),
        streaks: (!trades.is_empty()).then(|| streaks(trades)),
    }
}

/// One comparison row per requested ticker, in request order.
pub fn compare_benchmarks(
    curve: &[EquityPoint],
    tickers: &[String],
    metrics: &Metrics,
) -> Vec<BenchmarkComparisonRow> {
    tickers
        .iter()
        .map(|ticker| {
            let series = benchmark_series(curve, ticker);
            compare(ticker, curve, &series, metrics.cagr, metrics.total_return)
        })
        .collect()
}
