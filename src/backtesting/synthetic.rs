use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::analytics::{compare_benchmarks, compute_metrics};
use crate::models::{
    BenchmarkComparisonRow, EquityPoint, ExitReason, Metrics, SimulationConfig, Trade,
};

const STEP_DAYS: i64 = 7;
const SHOCK_PROBABILITY: f64 = 0.05;
const TRADE_COUNT: usize = 48;

// Per-step multiplicative returns. The lower bounds keep every factor >= 0.9,
// so values can never reach zero.
const STRATEGY_RANGE: (f64, f64) = (-0.01, 0.04);
const BENCHMARK_RANGE: (f64, f64) = (-0.008, 0.025);
const STRATEGY_SHOCK: (f64, f64) = (-0.08, -0.03);
const BENCHMARK_SHOCK: (f64, f64) = (-0.10, -0.03);

const TICKERS: [&str; 10] = [
    "005930", "000660", "035420", "051910", "006400", "035720", "207940", "068270", "005380",
    "105560",
];

// Exit reasons with relative weights.
const EXIT_REASONS: [(ExitReason, u32); 7] = [
    (ExitReason::Signal, 40),
    (ExitReason::TakeProfit, 20),
    (ExitReason::StopLoss, 15),
    (ExitReason::TrailingStop, 10),
    (ExitReason::Rebalance, 10),
    (ExitReason::Forced, 3),
    (ExitReason::Expired, 2),
];

/// Everything the fallback path produces for one config.
#[derive(Debug, Clone)]
pub struct SyntheticResult {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub metrics: Metrics,
    pub benchmarks: Vec<BenchmarkComparisonRow>,
}

/// Builds a plausible stand-in result when the backtest service is down.
/// The random source is injectable so runs can be reproduced exactly.
pub struct SyntheticResultGenerator<R: Rng = StdRng> {
    rng: R,
}

impl SyntheticResultGenerator<StdRng> {
    pub fn seeded(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl<R: Rng> SyntheticResultGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self, config: &SimulationConfig) -> SyntheticResult {
        let equity_curve = self.equity_curve(config);
        let trades = self.trades(config);
        let metrics = compute_metrics(&equity_curve, &trades, config.trading_costs.as_ref());
        let benchmarks = compare_benchmarks(&equity_curve, &[config.benchmark.clone()], &metrics);

        SyntheticResult {
            equity_curve,
            trades,
            metrics,
            benchmarks,
        }
    }

    fn equity_curve(&mut self, config: &SimulationConfig) -> Vec<EquityPoint> {
        let mut strategy = config.initial_capital;
        let mut benchmark = config.initial_capital;
        let mut current = config.start_date;
        let mut points = vec![
            EquityPoint::new(current, strategy).with_benchmark(&config.benchmark, benchmark),
        ];

        loop {
            current += Duration::days(STEP_DAYS);
            if current > config.end_date {
                break;
            }

            let (s, b) = if self.rng.gen_bool(SHOCK_PROBABILITY) {
                (
                    self.rng.gen_range(STRATEGY_SHOCK.0..STRATEGY_SHOCK.1),
                    self.rng.gen_range(BENCHMARK_SHOCK.0..BENCHMARK_SHOCK.1),
                )
            } else {
                (
                    self.rng.gen_range(STRATEGY_RANGE.0..STRATEGY_RANGE.1),
                    self.rng.gen_range(BENCHMARK_RANGE.0..BENCHMARK_RANGE.1),
                )
            };
            strategy *= 1.0 + s;
            benchmark *= 1.0 + b;

            points.push(EquityPoint::new(current, strategy).with_benchmark(&config.benchmark, benchmark));
        }

        points
    }

    fn trades(&mut self, config: &SimulationConfig) -> Vec<Trade> {
        let span = config.range_days().max(0);
        let mut dates: Vec<NaiveDate> = (0..TRADE_COUNT)
            .map(|_| config.start_date + Duration::days(self.rng.gen_range(0..=span)))
            .collect();
        dates.sort();

        dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                let ticker = TICKERS.choose(&mut self.rng).copied().unwrap_or(TICKERS[0]);
                // Prices rounded to the 100 won tick.
                let price = (self.rng.gen_range(10_000.0..200_000.0f64) / 100.0).round() * 100.0;
                let quantity = self.rng.gen_range(1..=100) as f64;

                if i % 2 == 0 {
                    Trade::buy(date, ticker, quantity, price)
                } else {
                    let pnl_percent = self.rng.gen_range(-8.0..12.0f64);
                    let amount = quantity * price;
                    let pnl = amount * pnl_percent / (100.0 + pnl_percent);
                    let holding_days = self.rng.gen_range(3..=60);
                    let exit_reason = EXIT_REASONS
                        .choose_weighted(&mut self.rng, |(_, w)| *w)
                        .map(|(r, _)| *r)
                        .unwrap_or(ExitReason::Signal);
                    Trade::sell(
                        date,
                        ticker,
                        quantity,
                        price,
                        pnl,
                        pnl_percent,
                        holding_days,
                        exit_reason,
                    )
                }
            })
            .collect()
    }
}
