pub mod equity;
pub mod job;
pub mod metrics;
pub mod simulation;
pub mod trade;

pub use equity::EquityPoint;
pub use job::{EnhancedReport, JobHandle, JobSnapshot, JobStatus};
pub use metrics::{BenchmarkComparisonRow, CorrelationStrength, CostBreakdown, Metrics, StreakStats};
pub use simulation::*;
pub use trade::{ExitReason, Trade, TradeSide};
