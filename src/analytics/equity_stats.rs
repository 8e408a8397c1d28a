use chrono::NaiveDate;

pub const DAYS_PER_YEAR: f64 = 365.25;

/// Drawdown magnitudes in percent, one per input point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawdownSeries {
    pub max_drawdown_pct: f64,
    pub drawdowns: Vec<f64>,
}

/// Running-peak drawdown, left to right. Values are non-negative magnitudes;
/// callers negate the maximum when presenting it.
pub fn drawdown_series(values: &[f64]) -> DrawdownSeries {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0f64;
    let mut drawdowns = Vec::with_capacity(values.len());

    for &v in values {
        if v > peak {
            peak = v;
        }
        let dd = if peak > 0.0 {
            ((peak - v) / peak * 100.0).max(0.0)
        } else {
            0.0
        };
        max_dd = max_dd.max(dd);
        drawdowns.push(dd);
    }

    DrawdownSeries {
        max_drawdown_pct: max_dd,
        drawdowns,
    }
}

pub fn total_return_pct(first: f64, last: f64) -> Option<f64> {
    if first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

/// Total return over a whole series; undefined for fewer than two points.
pub fn total_return_of(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    total_return_pct(values[0], values[values.len() - 1])
}

pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}

/// Compound annual growth rate in percent.
pub fn cagr(first: f64, last: f64, years: f64) -> Option<f64> {
    if years <= 0.0 || first == 0.0 {
        return None;
    }
    let growth = last / first;
    if growth < 0.0 {
        return None;
    }
    let rate = (growth.powf(1.0 / years) - 1.0) * 100.0;
    rate.is_finite().then_some(rate)
}

/// CAGR of a dated series, using its own first and last dates.
pub fn series_cagr(points: &[(NaiveDate, f64)]) -> Option<f64> {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) if points.len() >= 2 => (f, l),
        _ => return None,
    };
    cagr(first.1, last.1, years_between(first.0, last.0))
}

/// Reward/risk ratio used when no volatility series is available:
/// CAGR over max drawdown, with the drawdown floored at 1%.
pub fn return_over_drawdown(cagr: f64, max_drawdown_magnitude: f64) -> f64 {
    cagr / max_drawdown_magnitude.max(1.0)
}

/// Simple returns between adjacent values, skipping pairs with a zero prior.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Sampling frequency implied by the average spacing of `dates`.
pub fn periods_per_year(dates: &[NaiveDate]) -> Option<f64> {
    if dates.len() < 2 {
        return None;
    }
    let span = (dates[dates.len() - 1] - dates[0]).num_days() as f64;
    if span <= 0.0 {
        return None;
    }
    let avg_gap = span / (dates.len() - 1) as f64;
    Some(DAYS_PER_YEAR / avg_gap)
}

/// Annualized Sharpe ratio (zero risk-free rate) from period returns.
pub fn annualized_sharpe(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    if returns.len() < 2 || periods_per_year <= 0.0 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return None;
    }

    Some(mean / std_dev * periods_per_year.sqrt())
}
