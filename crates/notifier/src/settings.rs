//! YAML configuration, loaded via `appconfig::load` from `CONFIG_FILE`.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub kafka: bus::ConsumerConfig,
    #[serde(with = "humantime_serde", default = "default_shutdown_timeout")]
    pub graceful_shutdown_timeout: Duration,
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(10)
}
