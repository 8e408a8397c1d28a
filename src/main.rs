use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use backtest_client::backtesting::{
    BacktestReport, JobOrchestrator, JobRun, RunOutcome,
};
use backtest_client::config::Config;
use backtest_client::models::SimulationConfig;
use backtest_client::transport::HttpTransport;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // Parse CLI args: [start YYYY-MM-DD] [end YYYY-MM-DD] [capital]
    let args: Vec<String> = std::env::args().collect();

    let today = Utc::now().with_timezone(&cfg.market_timezone).date_naive();
    let end = match args.get(2) {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let start = match args.get(1) {
        Some(s) => parse_date(s)?,
        None => end - Duration::days(cfg.max_range_days),
    };
    let capital: f64 = match args.get(3) {
        Some(s) => s
            .parse()
            .with_context(|| format!("invalid initial capital: {}", s))?,
        None => cfg.initial_capital,
    };

    let sim = SimulationConfig::new(&cfg.strategy_id, start, end, capital, &cfg.benchmark);

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║          BACKTEST CLIENT                                 ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Strategy:   {:<44}║", sim.strategy_id);
    println!("║  Period:     {:<44}║", format!("{} to {}", start, end));
    println!("║  Capital:    {:<44}║", format!("{:.0}", capital));
    println!("║  Benchmark:  {:<44}║", sim.benchmark);
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let transport = HttpTransport::new(&cfg).context("failed to build HTTP client")?;
    let orchestrator = JobOrchestrator::new(Arc::new(transport), cfg.orchestrator_settings());

    let mut run = JobRun::new();
    let canceller = run.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling backtest");
            canceller.cancel();
        }
    });

    let outcome = orchestrator
        .submit_and_run(&mut run, sim, |status| info!(%status, "Backtest status"))
        .await?;

    match outcome {
        RunOutcome::Completed(report) => {
            report.print_summary();
            let path = save_report(&report)?;
            println!("\nReport saved to: {}", path);
        }
        RunOutcome::TimedOut(handle) => {
            println!(
                "Backtest {} is still running on the service. Check back later.",
                handle.job_id()
            );
        }
        RunOutcome::Cancelled => {
            println!("Backtest cancelled.");
        }
    }

    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {}", s))
}

fn save_report(report: &BacktestReport) -> Result<String> {
    let dir = "data";
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir))?;

    let path = format!(
        "{}/backtest_{}_{}.json",
        dir,
        report.start.format("%Y%m%d"),
        report.end.format("%Y%m%d"),
    );
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path))?;

    Ok(path)
}
