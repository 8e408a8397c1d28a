use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::grader::{grade_metrics, overall_grade};
use crate::analytics::{compare_benchmarks, compute_metrics, Grade, GradedMetric};
use crate::models::{
    equity, BenchmarkComparisonRow, EnhancedReport, EquityPoint, JobSnapshot, Metrics,
    SimulationConfig, Trade,
};

use super::synthetic::SyntheticResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Remote,
    /// Generated locally because the service was unreachable.
    Synthetic,
}

/// A completed backtest. Read-only once built.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestReport {
    pub job_id: Option<String>,
    pub source: ResultSource,
    pub config: SimulationConfig,

    // Period
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,

    // Balances
    pub initial_capital: f64,
    pub final_value: f64,

    pub metrics: Metrics,
    pub benchmarks: Vec<BenchmarkComparisonRow>,
    pub grades: Vec<GradedMetric>,
    pub overall_grade: Grade,
    pub enhanced: Option<EnhancedReport>,

    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
}

impl BacktestReport {
    pub fn from_remote(
        config: SimulationConfig,
        snapshot: JobSnapshot,
        enhanced: Option<EnhancedReport>,
    ) -> Self {
        let equity_curve = snapshot.equity_curve.unwrap_or_default();
        let trades = snapshot.trades.unwrap_or_default();

        // Derive from the raw data when it is there; a result without a
        // usable curve can only show what the service computed.
        let metrics = match snapshot.metrics {
            Some(reported) if equity_curve.len() < 2 => reported,
            _ => compute_metrics(&equity_curve, &trades, config.trading_costs.as_ref()),
        };

        let mut tickers = config.all_benchmarks();
        for t in equity::benchmark_tickers(&equity_curve) {
            if !tickers.contains(&t) {
                tickers.push(t);
            }
        }
        let benchmarks = compare_benchmarks(&equity_curve, &tickers, &metrics);

        Self::assemble(
            Some(snapshot.id),
            ResultSource::Remote,
            config,
            equity_curve,
            trades,
            metrics,
            benchmarks,
            enhanced,
        )
    }

    pub fn from_synthetic(config: SimulationConfig, result: SyntheticResult) -> Self {
        Self::assemble(
            None,
            ResultSource::Synthetic,
            config,
            result.equity_curve,
            result.trades,
            result.metrics,
            result.benchmarks,
            None,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        job_id: Option<String>,
        source: ResultSource,
        config: SimulationConfig,
        equity_curve: Vec<EquityPoint>,
        trades: Vec<Trade>,
        metrics: Metrics,
        benchmarks: Vec<BenchmarkComparisonRow>,
        enhanced: Option<EnhancedReport>,
    ) -> Self {
        let grades = grade_metrics(&metrics);
        let overall = overall_grade(&grades);
        let final_value = equity_curve
            .last()
            .map(|p| p.value)
            .unwrap_or(config.initial_capital);

        BacktestReport {
            job_id,
            source,
            start: config.start_date,
            end: config.end_date,
            days: config.range_days(),
            initial_capital: config.initial_capital,
            final_value,
            metrics,
            benchmarks,
            grades,
            overall_grade: overall,
            enhanced,
            equity_curve,
            trades,
            config,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == ResultSource::Synthetic
    }

    pub fn print_summary(&self) {
        let pct = |v: Option<f64>| v.map_or("n/a".to_string(), |v| format!("{:+.2}%", v));
        let ratio = |v: Option<f64>| v.map_or("n/a".to_string(), |v| format!("{:.2}", v));

        println!("\n{}", "=".repeat(70));
        println!("  BACKTEST REPORT");
        if self.is_synthetic() {
            println!("  (preview: service unavailable, figures are simulated)");
        }
        println!("{}", "=".repeat(70));
        if let Some(id) = &self.job_id {
            println!("  Job:         {}", id);
        }
        println!("  Strategy:    {}", self.config.strategy_id);
        println!(
            "  Period:      {} to {} ({} days)",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d"),
            self.days
        );
        println!();
        println!("  PERFORMANCE");
        println!("  ───────────────────────────────────");
        println!("  Initial:     {:.0}", self.initial_capital);
        println!("  Final:       {:.0}", self.final_value);
        println!("  Return:      {}", pct(self.metrics.total_return));
        println!("  CAGR:        {}", pct(self.metrics.cagr));
        println!();
        println!("  RISK");
        println!("  ───────────────────────────────────");
        println!("  Max DD:      {:.2}%", self.metrics.max_drawdown);
        println!("  CAGR/MDD:    {}", ratio(self.metrics.return_over_drawdown));
        println!("  Sharpe:      {}", ratio(self.metrics.sharpe_ratio));
        println!();
        println!("  TRADES");
        println!("  ───────────────────────────────────");
        println!("  Total:       {}", self.metrics.trade_count);
        println!(
            "  Win Rate:    {}",
            self.metrics.win_rate.map_or("n/a".to_string(), |v| format!("{:.1}%", v))
        );
        println!("  Avg Return:  {:+.2}%", self.metrics.avg_return);
        println!("  Profit Factor: {}", ratio(self.metrics.profit_factor));
        if let Some(streaks) = &self.metrics.streaks {
            println!(
                "  Streaks:     {} wins / {} losses",
                streaks.max_consecutive_wins, streaks.max_consecutive_losses
            );
            if let Some(hold) = streaks.avg_holding_days {
                println!("  Avg Hold:    {:.1} days", hold);
            }
        }

        if let Some(costs) = &self.metrics.costs {
            println!();
            println!("  COSTS");
            println!("  ───────────────────────────────────");
            println!("  Commission:  {:.0}", costs.commission);
            println!("  Tax:         {:.0}", costs.tax);
            println!("  Slippage:    {:.0}", costs.slippage);
            println!("  Net Profit:  {:+.0}", costs.net_profit);
        }

        if !self.benchmarks.is_empty() {
            println!();
            println!("  BENCHMARKS");
            println!("  ───────────────────────────────────");
            for row in &self.benchmarks {
                println!(
                    "  {:>8}: Return {} | Excess {} | Corr {}{}",
                    row.ticker,
                    pct(row.total_return),
                    pct(row.excess_return),
                    ratio(row.correlation),
                    row.correlation_strength
                        .map_or(String::new(), |s| format!(" ({})", s)),
                );
            }
        }

        println!();
        println!("  GRADES");
        println!("  ───────────────────────────────────");
        for g in &self.grades {
            println!("  {:>20}: {}", g.kind.key(), g.grade);
        }
        println!("  {:>20}: {}", "overall", self.overall_grade);
        if let Some(server) = self.enhanced.as_ref().and_then(|e| e.overall_grade.as_deref()) {
            println!("  {:>20}: {}", "service overall", Grade::from_label(server));
        }

        println!("{}", "=".repeat(70));
    }
}
