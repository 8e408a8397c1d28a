#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use backtest_client::backtesting::OrchestratorSettings;
use backtest_client::error::TransportError;
use backtest_client::models::{
    EnhancedReport, EquityPoint, ExitReason, JobSnapshot, JobStatus, SimulationConfig, Trade,
};
use backtest_client::transport::JobTransport;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sample_config() -> SimulationConfig {
    SimulationConfig::new(
        "momentum_power",
        date(2023, 1, 1),
        date(2023, 12, 31),
        10_000_000.0,
        "KOSPI",
    )
}

/// Default timings with a fixed seed so degraded runs are reproducible.
pub fn test_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        synthetic_seed: Some(42),
        ..OrchestratorSettings::default()
    }
}

/// Weekly points from 2023-01-02 with KOSPI at a quarter of the strategy value.
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

pub fn make_round_trips(pnls: &[f64]) -> Vec<Trade> {
    let base = date(2023, 1, 2);
    pnls.iter()
        .enumerate()
        .flat_map(|(i, &pnl)| {
            let open = base + Duration::days(14 * i as i64);
            [
                Trade::buy(open, "005930", 10.0, 100_000.0),
                Trade::sell(
                    open + Duration::days(10),
                    "005930",
                    10.0,
                    (1_000_000.0 + pnl) / 10.0,
                    pnl,
                    pnl / 10_000.0,
                    10,
                    ExitReason::Signal,
                ),
            ]
        })
        .collect()
}

/// A scripted backtest service. Every job walks through `script`, one entry
/// per poll, and then repeats the last entry.
pub struct MockTransport {
    script: Vec<JobStatus>,
    submit_error: Option<TransportError>,
    poll_error: Option<TransportError>,
    failure_message: Option<String>,
    enhanced_available: bool,
    polls_by_job: Mutex<HashMap<String, usize>>,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub enhanced_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new(script: &[JobStatus]) -> Self {
        Self {
            script: script.to_vec(),
            submit_error: None,
            poll_error: None,
            failure_message: None,
            enhanced_available: true,
            polls_by_job: Mutex::new(HashMap::new()),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            enhanced_calls: AtomicUsize::new(0),
        }
    }

    /// Running for `n` polls, then completed.
    pub fn completing_after(n: usize) -> Self {
        let mut script = vec![JobStatus::Running; n];
        script.push(JobStatus::Completed);
        Self::new(&script)
    }

    pub fn unreachable() -> Self {
        Self::new(&[]).with_submit_error(TransportError::Unreachable(
            "connection refused".to_string(),
        ))
    }

    pub fn with_submit_error(mut self, err: TransportError) -> Self {
        self.submit_error = Some(err);
        self
    }

    pub fn with_poll_error(mut self, err: TransportError) -> Self {
        self.poll_error = Some(err);
        self
    }

    pub fn with_failure_message(mut self, message: &str) -> Self {
        self.failure_message = Some(message.to_string());
        self
    }

    pub fn without_enhanced(mut self) -> Self {
        self.enhanced_available = false;
        self
    }

    pub fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn enhanced_fetches(&self) -> usize {
        self.enhanced_calls.load(Ordering::SeqCst)
    }

    fn snapshot(&self, job_id: &str, status: JobStatus) -> JobSnapshot {
        let mut snap = JobSnapshot::with_status(job_id, status);
        match status {
            JobStatus::Completed => {
                snap.equity_curve = Some(make_curve(&[
                    10_000_000.0,
                    10_300_000.0,
                    9_800_000.0,
                    10_900_000.0,
                    11_200_000.0,
                ]));
                snap.trades = Some(make_round_trips(&[80_000.0, -30_000.0, 45_000.0]));
            }
            JobStatus::Failed => snap.error_message = self.failure_message.clone(),
            _ => {}
        }
        snap
    }
}

#[async_trait]
impl JobTransport for MockTransport {
    async fn submit(&self, _config: &SimulationConfig) -> Result<String, TransportError> {
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.submit_error {
            Some(err) => Err(err.clone()),
            None => Ok(format!("bt-{}", n)),
        }
    }

    async fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot, TransportError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.poll_error {
            return Err(err.clone());
        }

        let idx = {
            let mut polls = self.polls_by_job.lock().unwrap();
            let count = polls.entry(job_id.to_string()).or_insert(0);
            let idx = *count;
            *count += 1;
            idx
        };
        let status = self
            .script
            .get(idx)
            .or(self.script.last())
            .copied()
            .unwrap_or(JobStatus::Running);
        Ok(self.snapshot(job_id, status))
    }

    async fn fetch_enhanced(&self, _job_id: &str) -> Result<EnhancedReport, TransportError> {
        self.enhanced_calls.fetch_add(1, Ordering::SeqCst);
        if !self.enhanced_available {
            return Err(TransportError::Status {
                status: 404,
                message: "not found".to_string(),
            });
        }
        Ok(EnhancedReport {
            overall_grade: Some("B".to_string()),
            ..EnhancedReport::default()
        })
    }
}
