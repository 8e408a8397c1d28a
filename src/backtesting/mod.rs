pub mod orchestrator;
pub mod report;
pub mod synthetic;

pub use orchestrator::{
    JobOrchestrator, JobRun, OrchestratorSettings, RunCanceller, RunOutcome, RunState, Submission,
};
pub use report::{BacktestReport, ResultSource};
pub use synthetic::{SyntheticResult, SyntheticResultGenerator};
