//! YAML configuration, loaded via `appconfig::load` from `CONFIG_FILE`.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub grpc: GrpcSettings,
    pub shard_table: ShardTableSettings,
    #[serde(with = "humantime_serde")]
    pub edit_interval: Duration,
    pub limit_rows_by_sku: u32,
    #[serde(with = "humantime_serde", default = "default_shutdown_timeout")]
    pub graceful_shutdown_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct GrpcSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct ShardTableSettings {
    pub bucket_count: u32,
    pub shards: Vec<ShardSettings>,
}

#[derive(Debug, Deserialize)]
pub struct ShardSettings {
    pub dsn: String,
    pub bucket_position: u32,
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(10)
}
