//! Worker configuration.

use std::time::Duration;

use crate::dispatcher::DispatcherConfig;

/// Runtime configuration for the worker binary.
///
/// | Variable              | Default | Meaning                                    |
/// |-----------------------|---------|--------------------------------------------|
/// | `ENGINE_GATEWAY_URL`  | (none)  | Base URL of the workflow engine gateway    |
/// | `MAX_JOBS_PER_TYPE`   | 10      | In-flight executions allowed per job type  |
/// | `POLL_INTERVAL_MS`    | 250     | Delay between lease polls per job type     |
/// | `LOCK_DURATION_SECS`  | 30      | Lease duration requested on activation     |
/// | `MESSAGE_TTL_MS`      | 30000   | Correlation message time-to-live           |
/// | `SHUTDOWN_GRACE_SECS` | 10      | Drain window for in-flight jobs on shutdown|
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub gateway_url: String,
    pub max_jobs_per_type: usize,
    pub poll_interval: Duration,
    pub lock_duration: Duration,
    pub message_ttl: Duration,
    pub shutdown_grace: Duration,
}

impl WorkerConfig {
    /// Reads configuration from the environment. `ENGINE_GATEWAY_URL`
    /// must be set; everything else falls back to defaults.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let gateway_url = std::env::var("ENGINE_GATEWAY_URL")?;
        Ok(Self {
            gateway_url,
            max_jobs_per_type: env_parse("MAX_JOBS_PER_TYPE", 10),
            poll_interval: Duration::from_millis(env_parse("POLL_INTERVAL_MS", 250)),
            lock_duration: Duration::from_secs(env_parse("LOCK_DURATION_SECS", 30)),
            message_ttl: Duration::from_millis(env_parse("MESSAGE_TTL_MS", 30_000)),
            shutdown_grace: Duration::from_secs(env_parse("SHUTDOWN_GRACE_SECS", 10)),
        })
    }

    /// Dispatcher settings derived from this configuration.
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            poll_interval: self.poll_interval,
            lock_duration: self.lock_duration,
            shutdown_grace: self.shutdown_grace,
            ..DispatcherConfig::default()
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid number, got '{raw}'")),
        Err(_) => default,
    }
}
