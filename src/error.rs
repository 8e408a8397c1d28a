use chrono::NaiveDate;
use thiserror::Error;

use crate::backtesting::orchestrator::RunState;

/// Rejections raised locally, before anything is sent to the backtest service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("strategy id must not be empty")]
    MissingStrategy,

    #[error("benchmark must not be empty")]
    MissingBenchmark,

    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("backtest window of {days} days exceeds the {max_days} day limit")]
    RangeTooLong { days: i64, max_days: i64 },

    #[error("initial capital {capital} is below the minimum of {minimum}")]
    CapitalTooLow { capital: f64, minimum: f64 },

    #[error("{rule} is enabled with invalid magnitude {value}")]
    InvalidRiskRule { rule: &'static str, value: f64 },

    #[error("{field} must be a rate in [0, 1), got {value}")]
    InvalidRate { field: &'static str, value: f64 },

    #[error("{field} is out of range: {value}")]
    InvalidPositionSizing { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, request timeout.
    #[error("backtest service unreachable: {0}")]
    Unreachable(String),

    #[error("backtest service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode backtest service response: {0}")]
    Decode(String),

    /// The request never left this process: bad base URL, client setup.
    #[error("invalid backtest request: {0}")]
    Client(String),
}

impl TransportError {
    /// Whether the failure looks like the backend being down rather than the
    /// request being wrong. Only these failures trigger degraded mode.
    pub fn is_unavailable(&self) -> bool {
        match self {
            TransportError::Unreachable(_) => true,
            TransportError::Status { status, .. } => *status >= 500,
            TransportError::Decode(_) | TransportError::Client(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("backtest submission rejected: {0}")]
    SubmitRejected(TransportError),

    #[error("lost contact with backtest job: {0}")]
    PollFailed(TransportError),

    /// Carries the service-provided message verbatim.
    #[error("{0}")]
    JobFailed(String),

    #[error("cannot {operation} a run in state {state}")]
    InvalidState {
        operation: &'static str,
        state: RunState,
    },
}
