use anyhow::Context;
use std::time::Duration;

const DATABASE_URL_KEY: &str = "DATABASE_URL";
const RUST_LOG_KEY: &str = "RUST_LOG";
const RUST_BACKTRACE_KEY: &str = "RUST_BACKTRACE";
const RESORT_INTERVAL_SECS_KEY: &str = "RESORT_INTERVAL_SECS";

/// Environment-sourced configuration for the resort worker binary and any
/// other process wiring a `Postgres` store together.
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub rust_backtrace: String,
    /// How often the resort worker re-runs `Re-sort("all")`. Defaults to an
    /// hour, matching the sync worker's polling cadence.
    pub resort_interval: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().context("Failed to load environment")?;
        let database_url = load_env(DATABASE_URL_KEY)?;
        let rust_log = load_env(RUST_LOG_KEY)?;
        let rust_backtrace = load_env(RUST_BACKTRACE_KEY)?;
        let resort_interval = match std::env::var(RESORT_INTERVAL_SECS_KEY) {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .context("RESORT_INTERVAL_SECS must be a non-negative integer")?,
            ),
            Err(_) => Duration::from_secs(3600),
        };
        Ok(Self {
            database_url,
            rust_log,
            rust_backtrace,
            resort_interval,
        })
    }
}

fn load_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).context(format!("Failed to get variable from env: {}", key))
}
