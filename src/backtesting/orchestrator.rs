use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::OrchestratorError;
use crate::models::{JobHandle, JobSnapshot, JobStatus, SimulationConfig, ValidationLimits};
use crate::transport::JobTransport;

use super::report::BacktestReport;
use super::synthetic::SyntheticResultGenerator;

const GENERIC_FAILURE: &str = "backtest failed without a message from the service";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Submitting,
    Degraded,
    Polling,
    Completed,
    Failed,
    /// Can go back to `Polling` through `resume`.
    TimedOut,
    Cancelled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Failed | RunState::Cancelled
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Submitting => "submitting",
            RunState::Degraded => "degraded",
            RunState::Polling => "polling",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
            RunState::TimedOut => "timed out",
            RunState::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// One simulation request. Owns its cancellation token and lifecycle state,
/// so runs never share teardown.
#[derive(Debug)]
pub struct JobRun {
    token: CancellationToken,
    state: RunState,
}

impl JobRun {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// A handle that can stop this run from another task.
    pub fn canceller(&self) -> RunCanceller {
        RunCanceller {
            token: self.token.clone(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for JobRun {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct RunCanceller {
    token: CancellationToken,
}

impl RunCanceller {
    /// Idempotent. Has no visible effect once the run has finished.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub run_timeout: Duration,
    pub fallback_delay: Duration,
    pub synthetic_seed: Option<u64>,
    pub limits: ValidationLimits,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_polls: 150,
            run_timeout: Duration::from_secs(60),
            fallback_delay: Duration::from_millis(1200),
            synthetic_seed: None,
            limits: ValidationLimits::default(),
        }
    }
}

/// The service could not be reached at submission time.
#[derive(Debug)]
pub struct DegradedRun {
    pub config: SimulationConfig,
    pub cause: String,
}

#[derive(Debug)]
pub enum Submission {
    Accepted(JobHandle),
    Degraded(DegradedRun),
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(Box<BacktestReport>),
    /// No terminal status within the run timeout. The handle can be resumed.
    TimedOut(JobHandle),
    Cancelled,
}

impl RunOutcome {
    pub fn state(&self) -> RunState {
        match self {
            RunOutcome::Completed(_) => RunState::Completed,
            RunOutcome::TimedOut(_) => RunState::TimedOut,
            RunOutcome::Cancelled => RunState::Cancelled,
        }
    }

    pub fn into_report(self) -> Option<BacktestReport> {
        match self {
            RunOutcome::Completed(report) => Some(*report),
            _ => None,
        }
    }
}

enum PollEnd {
    Terminal(JobSnapshot),
    Exhausted,
    Cancelled,
}

pub struct JobOrchestrator {
    transport: Arc<dyn JobTransport>,
    settings: OrchestratorSettings,
}

impl JobOrchestrator {
    pub fn new(transport: Arc<dyn JobTransport>, settings: OrchestratorSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Validates locally, then hands the config to the service. An
    /// unreachable service degrades the run instead of failing it.
    pub async fn submit(
        &self,
        run: &mut JobRun,
        config: SimulationConfig,
    ) -> Result<Submission, OrchestratorError> {
        if run.state != RunState::Idle {
            return Err(OrchestratorError::InvalidState {
                operation: "submit",
                state: run.state,
            });
        }
        config.validate(&self.settings.limits)?;

        run.state = RunState::Submitting;
        info!(
            strategy = %config.strategy_id,
            start = %config.start_date,
            end = %config.end_date,
            "Submitting backtest"
        );

        match self.transport.submit(&config).await {
            Ok(job_id) => {
                info!(job_id = %job_id, "Backtest accepted");
                run.state = RunState::Polling;
                Ok(Submission::Accepted(JobHandle::new(job_id, config)))
            }
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "Backtest service unavailable, falling back to a simulated preview");
                run.state = RunState::Degraded;
                Ok(Submission::Degraded(DegradedRun {
                    config,
                    cause: e.to_string(),
                }))
            }
            Err(e) => {
                run.state = RunState::Failed;
                Err(OrchestratorError::SubmitRejected(e))
            }
        }
    }

    pub async fn run<F>(
        &self,
        run: &mut JobRun,
        submission: Submission,
        mut on_status: F,
    ) -> Result<RunOutcome, OrchestratorError>
    where
        F: FnMut(JobStatus) + Send,
    {
        match submission {
            Submission::Accepted(handle) => {
                if run.state != RunState::Polling {
                    return Err(OrchestratorError::InvalidState {
                        operation: "run",
                        state: run.state,
                    });
                }
                self.poll_with_deadline(run, handle, &mut on_status).await
            }
            Submission::Degraded(degraded) => {
                if run.state != RunState::Degraded {
                    return Err(OrchestratorError::InvalidState {
                        operation: "run",
                        state: run.state,
                    });
                }
                Ok(self.run_degraded(run, degraded, &mut on_status).await)
            }
        }
    }

    /// Polls a timed-out job again with a fresh timeout window.
    pub async fn resume<F>(
        &self,
        run: &mut JobRun,
        handle: JobHandle,
        mut on_status: F,
    ) -> Result<RunOutcome, OrchestratorError>
    where
        F: FnMut(JobStatus) + Send,
    {
        if run.state != RunState::TimedOut {
            return Err(OrchestratorError::InvalidState {
                operation: "resume",
                state: run.state,
            });
        }
        info!(job_id = %handle.job_id(), "Resuming backtest");
        run.state = RunState::Polling;
        self.poll_with_deadline(run, handle, &mut on_status).await
    }

    pub async fn submit_and_run<F>(
        &self,
        run: &mut JobRun,
        config: SimulationConfig,
        on_status: F,
    ) -> Result<RunOutcome, OrchestratorError>
    where
        F: FnMut(JobStatus) + Send,
    {
        let submission = self.submit(run, config).await?;
        self.run(run, submission, on_status).await
    }

    async fn run_degraded<F>(
        &self,
        run: &mut JobRun,
        degraded: DegradedRun,
        on_status: &mut F,
    ) -> RunOutcome
    where
        F: FnMut(JobStatus) + Send,
    {
        if run.token.is_cancelled() {
            return self.cancelled(run);
        }
        tokio::select! {
            _ = run.token.cancelled() => return self.cancelled(run),
            _ = sleep(self.settings.fallback_delay) => {}
        }
        if run.token.is_cancelled() {
            return self.cancelled(run);
        }

        let result = SyntheticResultGenerator::seeded(self.settings.synthetic_seed)
            .generate(&degraded.config);
        let report = BacktestReport::from_synthetic(degraded.config, result);

        on_status(JobStatus::Completed);
        run.state = RunState::Completed;
        info!(cause = %degraded.cause, "Simulated preview ready");
        RunOutcome::Completed(Box::new(report))
    }

    async fn poll_with_deadline<F>(
        &self,
        run: &mut JobRun,
        handle: JobHandle,
        on_status: &mut F,
    ) -> Result<RunOutcome, OrchestratorError>
    where
        F: FnMut(JobStatus) + Send,
    {
        let poll_token = run.token.child_token();
        let _guard = poll_token.clone().drop_guard();
        let deadline = Instant::now() + self.settings.run_timeout;

        // The timer is dropped as soon as the loop yields, so a result that
        // already arrived can never be overridden by the timeout.
        let ended = tokio::select! {
            biased;
            res = self.poll_until_terminal(&poll_token, handle.job_id(), on_status) => Some(res),
            _ = sleep_until(deadline) => None,
        };

        let end = match ended {
            Some(Ok(end)) => end,
            Some(Err(e)) => {
                run.state = RunState::Failed;
                return Err(e);
            }
            None => {
                poll_token.cancel();
                warn!(
                    job_id = %handle.job_id(),
                    timeout_secs = self.settings.run_timeout.as_secs(),
                    "Backtest still running at timeout"
                );
                run.state = RunState::TimedOut;
                return Ok(RunOutcome::TimedOut(handle));
            }
        };

        match end {
            PollEnd::Cancelled => Ok(self.cancelled(run)),
            PollEnd::Exhausted => {
                warn!(
                    job_id = %handle.job_id(),
                    max_polls = self.settings.max_polls,
                    "Poll limit reached without a terminal status"
                );
                run.state = RunState::TimedOut;
                Ok(RunOutcome::TimedOut(handle))
            }
            PollEnd::Terminal(snapshot) if snapshot.status == JobStatus::Failed => {
                run.state = RunState::Failed;
                let message = snapshot
                    .error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                warn!(job_id = %handle.job_id(), error = %message, "Backtest failed");
                Err(OrchestratorError::JobFailed(message))
            }
            PollEnd::Terminal(snapshot) => self.complete(run, handle, snapshot).await,
        }
    }

    async fn poll_until_terminal<F>(
        &self,
        token: &CancellationToken,
        job_id: &str,
        on_status: &mut F,
    ) -> Result<PollEnd, OrchestratorError>
    where
        F: FnMut(JobStatus) + Send,
    {
        for attempt in 1..=self.settings.max_polls {
            if token.is_cancelled() {
                return Ok(PollEnd::Cancelled);
            }
            tokio::select! {
                _ = token.cancelled() => return Ok(PollEnd::Cancelled),
                _ = sleep(self.settings.poll_interval) => {}
            }
            if token.is_cancelled() {
                return Ok(PollEnd::Cancelled);
            }

            let snapshot = tokio::select! {
                _ = token.cancelled() => return Ok(PollEnd::Cancelled),
                res = self.transport.fetch_status(job_id) => {
                    res.map_err(OrchestratorError::PollFailed)?
                }
            };
            if token.is_cancelled() {
                return Ok(PollEnd::Cancelled);
            }

            debug!(job_id, attempt, status = %snapshot.status, "Polled backtest");
            on_status(snapshot.status);

            if snapshot.status.is_terminal() {
                return Ok(PollEnd::Terminal(snapshot));
            }
        }
        Ok(PollEnd::Exhausted)
    }

    async fn complete(
        &self,
        run: &mut JobRun,
        handle: JobHandle,
        snapshot: JobSnapshot,
    ) -> Result<RunOutcome, OrchestratorError> {
        let enhanced = tokio::select! {
            _ = run.token.cancelled() => None,
            res = self.transport.fetch_enhanced(handle.job_id()) => match res {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(job_id = %handle.job_id(), error = %e, "Enhanced report unavailable");
                    None
                }
            },
        };
        if run.token.is_cancelled() {
            return Ok(self.cancelled(run));
        }

        let report = BacktestReport::from_remote(handle.into_config(), snapshot, enhanced);
        run.state = RunState::Completed;
        info!(
            job_id = report.job_id.as_deref().unwrap_or_default(),
            grade = %report.overall_grade,
            "Backtest completed"
        );
        Ok(RunOutcome::Completed(Box::new(report)))
    }

    fn cancelled(&self, run: &mut JobRun) -> RunOutcome {
        info!(from = %run.state, "Backtest run cancelled");
        run.state = RunState::Cancelled;
        RunOutcome::Cancelled
    }
}
