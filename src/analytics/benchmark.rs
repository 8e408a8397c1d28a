use chrono::NaiveDate;
use std::collections::HashMap;

use super::equity_stats::{daily_returns, series_cagr, total_return_pct};
use crate::models::{BenchmarkComparisonRow, CorrelationStrength, EquityPoint};

const MIN_CORRELATION_PAIRS: usize = 5;

/// Pearson correlation over the common prefix of two return series.
/// `None` with fewer than five pairs or when either side has no variance.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len().min(b.len());
    if n < MIN_CORRELATION_PAIRS {
        return None;
    }
    let (a, b) = (&a[..n], &b[..n]);

    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a <= f64::EPSILON * f64::EPSILON || var_b <= f64::EPSILON * f64::EPSILON {
        return None;
    }

    let r = cov / (var_a.sqrt() * var_b.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// One ticker's dated series, taken from the points that carry a value for it.
pub fn benchmark_series(points: &[EquityPoint], ticker: &str) -> Vec<(NaiveDate, f64)> {
    points
        .iter()
        .filter_map(|p| p.benchmark(ticker).map(|v| (p.date, v)))
        .collect()
}

pub fn compare(
    ticker: &str,
    strategy: &[EquityPoint],
    benchmark: &[(NaiveDate, f64)],
    strategy_cagr: Option<f64>,
    strategy_total_return: Option<f64>,
) -> BenchmarkComparisonRow {
    if benchmark.len() < 2 {
        return BenchmarkComparisonRow::empty(ticker);
    }

    let first = benchmark[0].1;
    let last = benchmark[benchmark.len() - 1].1;
    let total_return = total_return_pct(first, last);
    let cagr = series_cagr(benchmark);

    let excess = |s: Option<f64>, b: Option<f64>| match (s, b) {
        (Some(s), Some(b)) => Some(s - b),
        _ => None,
    };

    // Returns are paired by date; a benchmark gap drops that strategy point too.
    let by_date: HashMap<NaiveDate, f64> = strategy.iter().map(|p| (p.date, p.value)).collect();
    let (strategy_values, benchmark_values): (Vec<f64>, Vec<f64>) = benchmark
        .iter()
        .filter_map(|(date, b)| by_date.get(date).map(|s| (*s, *b)))
        .unzip();
    let correlation = pearson_correlation(
        &daily_returns(&strategy_values),
        &daily_returns(&benchmark_values),
    );

    BenchmarkComparisonRow {
        ticker: ticker.to_string(),
        total_return,
        cagr,
        excess_return: excess(strategy_total_return, total_return),
        excess_cagr: excess(strategy_cagr, cagr),
        correlation,
        correlation_strength: correlation.map(CorrelationStrength::classify),
    }
}
