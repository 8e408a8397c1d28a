pub mod benchmark;
pub mod equity_stats;
pub mod grader;
pub mod metrics;
pub mod trade_stats;

pub use grader::{Grade, GradedMetric, MetricKind};
pub use metrics::{compare_benchmarks, compute_metrics};
