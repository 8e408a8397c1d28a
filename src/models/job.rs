use serde::{Deserialize, Serialize};
use std::fmt;

use super::equity::EquityPoint;
use super::metrics::Metrics;
use super::simulation::SimulationConfig;
use super::trade::Trade;

/// Remote job state. Owned by the service; the client only observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "running")]
    Running,
    #[serde(alias = "completed")]
    Completed,
    #[serde(alias = "failed")]
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// An accepted backtest job. Deliberately not `Clone`: the orchestrator
/// consumes it and only hands it back when a run times out.
#[derive(Debug)]
pub struct JobHandle {
    job_id: String,
    config: SimulationConfig,
}

impl JobHandle {
    pub fn new(job_id: String, config: SimulationConfig) -> Self {
        Self { job_id, config }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn into_config(self) -> SimulationConfig {
        self.config
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub backtest_id: String,
}

/// Response of `GET /backtest/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub equity_curve: Option<Vec<EquityPoint>>,
    #[serde(default)]
    pub trades: Option<Vec<Trade>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl JobSnapshot {
    pub fn with_status(id: &str, status: JobStatus) -> Self {
        Self {
            id: id.to_string(),
            status,
            metrics: None,
            equity_curve: None,
            trades: None,
            error_message: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteGradedMetric {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryEntry {
    pub term: String,
    pub description: String,
}

/// Response of `GET /backtest/{id}/enhanced`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedReport {
    #[serde(default)]
    pub graded_metrics: Vec<RemoteGradedMetric>,
    #[serde(default)]
    pub overall_grade: Option<String>,
    #[serde(default)]
    pub glossary: Vec<GlossaryEntry>,
}
