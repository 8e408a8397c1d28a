pub mod auth;
pub mod http;

pub use auth::Credentials;
pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::models::{EnhancedReport, JobSnapshot, SimulationConfig};

/// The remote backtest service, shared by every run in the process.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Returns the service-assigned job id.
    async fn submit(&self, config: &SimulationConfig) -> Result<String, TransportError>;
    async fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot, TransportError>;
    async fn fetch_enhanced(&self, job_id: &str) -> Result<EnhancedReport, TransportError>;
}
