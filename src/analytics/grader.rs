use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
    Ungraded,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
            Grade::Ungraded => "-",
        }
    }

    pub fn from_label(s: &str) -> Grade {
        match s.trim().to_uppercase().as_str() {
            "A" | "A+" | "A-" | "S" => Grade::A,
            "B" | "B+" | "B-" => Grade::B,
            "C" | "C+" | "C-" => Grade::C,
            "D" | "D+" | "D-" => Grade::D,
            "F" => Grade::F,
            _ => Grade::Ungraded,
        }
    }

    fn points(&self) -> Option<f64> {
        match self {
            Grade::A => Some(4.0),
            Grade::B => Some(3.0),
            Grade::C => Some(2.0),
            Grade::D => Some(1.0),
            Grade::F => Some(0.0),
            Grade::Ungraded => None,
        }
    }

    fn from_points(points: f64) -> Grade {
        if points >= 3.5 {
            Grade::A
        } else if points >= 2.5 {
            Grade::B
        } else if points >= 1.5 {
            Grade::C
        } else if points >= 0.5 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    TotalReturn,
    Cagr,
    MaxDrawdown,
    WinRate,
    ProfitFactor,
    ReturnOverDrawdown,
    SharpeRatio,
}

impl MetricKind {
    pub const ALL: [MetricKind; 7] = [
        MetricKind::TotalReturn,
        MetricKind::Cagr,
        MetricKind::MaxDrawdown,
        MetricKind::WinRate,
        MetricKind::ProfitFactor,
        MetricKind::ReturnOverDrawdown,
        MetricKind::SharpeRatio,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::TotalReturn => "total_return",
            MetricKind::Cagr => "cagr",
            MetricKind::MaxDrawdown => "max_drawdown",
            MetricKind::WinRate => "win_rate",
            MetricKind::ProfitFactor => "profit_factor",
            MetricKind::ReturnOverDrawdown => "return_over_drawdown",
            MetricKind::SharpeRatio => "sharpe_ratio",
        }
    }

    pub fn from_key(key: &str) -> Option<MetricKind> {
        match key {
            "total_return" | "totalReturn" => Some(MetricKind::TotalReturn),
            "cagr" => Some(MetricKind::Cagr),
            "max_drawdown" | "maxDrawdown" | "mdd" => Some(MetricKind::MaxDrawdown),
            "win_rate" | "winRate" => Some(MetricKind::WinRate),
            "profit_factor" | "profitFactor" => Some(MetricKind::ProfitFactor),
            "return_over_drawdown" | "returnOverDrawdown" => Some(MetricKind::ReturnOverDrawdown),
            "sharpe_ratio" | "sharpeRatio" | "sharpe" => Some(MetricKind::SharpeRatio),
            _ => None,
        }
    }

    /// Lower bounds for A, B, C, D. Anything below the last is F.
    fn thresholds(&self) -> [f64; 4] {
        match self {
            MetricKind::TotalReturn => [30.0, 15.0, 5.0, 0.0],
            MetricKind::Cagr => [20.0, 12.0, 6.0, 0.0],
            // Graded on -|mdd| so that shallower drawdowns rank higher.
            MetricKind::MaxDrawdown => [-10.0, -20.0, -30.0, -40.0],
            MetricKind::WinRate => [60.0, 50.0, 40.0, 30.0],
            MetricKind::ProfitFactor => [2.0, 1.5, 1.2, 1.0],
            MetricKind::ReturnOverDrawdown => [2.0, 1.0, 0.5, 0.0],
            MetricKind::SharpeRatio => [2.0, 1.5, 1.0, 0.5],
        }
    }
}

pub fn grade(kind: MetricKind, value: f64) -> Grade {
    if !value.is_finite() {
        return Grade::Ungraded;
    }
    let value = match kind {
        MetricKind::MaxDrawdown => -value.abs(),
        _ => value,
    };
    let [a, b, c, d] = kind.thresholds();
    if value >= a {
        Grade::A
    } else if value >= b {
        Grade::B
    } else if value >= c {
        Grade::C
    } else if value >= d {
        Grade::D
    } else {
        Grade::F
    }
}

pub fn grade_by_key(key: &str, value: f64) -> Grade {
    match MetricKind::from_key(key) {
        Some(kind) => grade(kind, value),
        None => Grade::Ungraded,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedMetric {
    pub kind: MetricKind,
    pub value: Option<f64>,
    pub grade: Grade,
}

fn metric_value(metrics: &Metrics, kind: MetricKind) -> Option<f64> {
    match kind {
        MetricKind::TotalReturn => metrics.total_return,
        MetricKind::Cagr => metrics.cagr,
        MetricKind::MaxDrawdown => Some(metrics.max_drawdown),
        MetricKind::WinRate => metrics.win_rate,
        MetricKind::ProfitFactor => metrics.profit_factor,
        MetricKind::ReturnOverDrawdown => metrics.return_over_drawdown,
        MetricKind::SharpeRatio => metrics.sharpe_ratio,
    }
}

pub fn grade_metrics(metrics: &Metrics) -> Vec<GradedMetric> {
    MetricKind::ALL
        .iter()
        .map(|&kind| {
            let value = metric_value(metrics, kind);
            GradedMetric {
                kind,
                value,
                grade: value.map_or(Grade::Ungraded, |v| grade(kind, v)),
            }
        })
        .collect()
}

/// Mean grade point of the graded entries; `Ungraded` when none are.
pub fn overall_grade(graded: &[GradedMetric]) -> Grade {
    let points: Vec<f64> = graded.iter().filter_map(|g| g.grade.points()).collect();
    if points.is_empty() {
        return Grade::Ungraded;
    }
    Grade::from_points(points.iter().sum::<f64>() / points.len() as f64)
}
