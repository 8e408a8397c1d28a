use chrono::{Duration, NaiveDate};

use crate::models::{EquityPoint, ExitReason, SimulationConfig, Trade};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The year-long KOSPI-benchmarked config used across tests.
pub fn sample_config() -> SimulationConfig {
    SimulationConfig::new(
        "momentum_power",
        date(2023, 1, 1),
        date(2023, 12, 31),
        10_000_000.0,
        "KOSPI",
    )
}

/// Weekly points starting 2023-01-02, with a KOSPI series at a quarter of
/// the strategy value.
pub fn make_curve(values: &[f64]) -> Vec<EquityPoint> {
    let base = date(2023, 1, 2);
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            EquityPoint::new(base + Duration::days(7 * i as i64), v).with_benchmark("KOSPI", v * 0.25)
        })
        .collect()
}

/// A buy/sell pair per P&L value, ten days apart.
pub fn make_round_trips(pnls: &[f64]) -> Vec<Trade> {
    let base = date(2023, 1, 2);
    pnls.iter()
        .enumerate()
        .flat_map(|(i, &pnl)| {
            let open = base + Duration::days(14 * i as i64);
            let amount = 1_000_000.0;
            let exit = if pnl > 0.0 {
                ExitReason::TakeProfit
            } else {
                ExitReason::StopLoss
            };
            [
                Trade::buy(open, "005930", 10.0, amount / 10.0),
                Trade::sell(
                    open + Duration::days(10),
                    "005930",
                    10.0,
                    (amount + pnl) / 10.0,
                    pnl,
                    pnl / amount * 100.0,
                    10,
                    exit,
                ),
            ]
        })
        .collect()
}
