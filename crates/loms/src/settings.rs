//! YAML configuration, loaded via `appconfig::load` from `CONFIG_FILE`.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub grpc: GrpcSettings,
    pub db: DbSettings,
    pub kafka: bus::ProducerConfig,
    pub outbox: OutboxSettings,
    #[serde(with = "humantime_serde", default = "default_shutdown_timeout")]
    pub graceful_shutdown_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct GrpcSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DbSettings {
    pub master_dsn: String,
    #[serde(default)]
    pub replica_dsns: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutboxSettings {
    pub batch_size: i64,
    #[serde(with = "humantime_serde")]
    pub period: Duration,
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(10)
}
