//! YAML configuration, loaded via `appconfig::load` from `CONFIG_FILE`.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: HttpSettings,
    pub product_service: ProductServiceSettings,
    pub loms: LomsSettings,
    #[serde(with = "humantime_serde", default = "default_shutdown_timeout")]
    pub graceful_shutdown_timeout: Duration,
    #[serde(with = "humantime_serde", default = "default_observer_interval")]
    pub repo_observer_interval: Duration,
}

#[derive(Debug, Deserialize)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct ProductServiceSettings {
    pub base_url: String,
    pub token: String,
    pub rps: u32,
    pub max_retries: u32,
    #[serde(default = "default_trigger_statuses")]
    pub retry_trigger_statuses: Vec<u16>,
}

#[derive(Debug, Deserialize)]
pub struct LomsSettings {
    pub address: String,
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_observer_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_trigger_statuses() -> Vec<u16> {
    vec![420, 429]
}
