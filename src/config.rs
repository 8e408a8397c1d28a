use chrono_tz::Tz;
use std::time::Duration;

use crate::backtesting::orchestrator::OrchestratorSettings;
use crate::models::{ValidationLimits, DEFAULT_MAX_RANGE_DAYS, DEFAULT_MIN_INITIAL_CAPITAL};

#[derive(Debug, Clone)]
pub struct Config {
    // Service
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,

    // Job lifecycle
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub run_timeout: Duration,
    pub fallback_delay: Duration,
    pub synthetic_seed: Option<u64>,

    // Validation
    pub max_range_days: i64,
    pub min_initial_capital: f64,

    // Defaults for new simulations
    pub strategy_id: String,
    pub benchmark: String,
    pub initial_capital: f64,
    pub market_timezone: Tz,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };
        let opt = |key: &str| -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.trim().is_empty())
        };

        Config {
            api_base_url: env("BACKTEST_API_URL", "http://localhost:3000/api/v1"),
            api_token: opt("BACKTEST_API_TOKEN"),
            request_timeout: Duration::from_secs(
                env("REQUEST_TIMEOUT_SECS", "30").parse().unwrap_or(30),
            ),
            poll_interval: Duration::from_millis(
                env("POLL_INTERVAL_MS", "2000").parse().unwrap_or(2000),
            ),
            max_polls: env("MAX_POLLS", "150").parse().unwrap_or(150),
            run_timeout: Duration::from_secs(env("RUN_TIMEOUT_SECS", "60").parse().unwrap_or(60)),
            fallback_delay: Duration::from_millis(
                env("FALLBACK_DELAY_MS", "1200").parse().unwrap_or(1200),
            ),
            synthetic_seed: opt("SYNTHETIC_SEED").and_then(|s| s.parse().ok()),
            max_range_days: env("MAX_RANGE_DAYS", "365")
                .parse()
                .unwrap_or(DEFAULT_MAX_RANGE_DAYS),
            min_initial_capital: env("MIN_INITIAL_CAPITAL", "1000000")
                .parse()
                .unwrap_or(DEFAULT_MIN_INITIAL_CAPITAL),
            strategy_id: env("STRATEGY_ID", "momentum_power"),
            benchmark: env("BENCHMARK", "KOSPI"),
            initial_capital: env("INITIAL_CAPITAL", "10000000")
                .parse()
                .unwrap_or(10_000_000.0),
            market_timezone: env("MARKET_TIMEZONE", "Asia/Seoul")
                .parse()
                .unwrap_or(chrono_tz::Asia::Seoul),
            log_level: env("LOG_LEVEL", "info"),
        }
    }

    pub fn validation_limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_range_days: self.max_range_days,
            min_initial_capital: self.min_initial_capital,
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            poll_interval: self.poll_interval,
            max_polls: self.max_polls,
            run_timeout: self.run_timeout,
            fallback_delay: self.fallback_delay,
            synthetic_seed: self.synthetic_seed,
            limits: self.validation_limits(),
        }
    }
}
