//! Shared YAML configuration loading for every service binary: the file
//! path comes from the `CONFIG_FILE` env var, and any field can be
//! overridden by an `<PREFIX>__SECTION__FIELD`-style environment variable.

use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CONFIG_FILE is not set")]
    MissingConfigFileEnv,
    #[error("failed to load configuration")]
    Load(#[from] config::ConfigError),
}

/// Loads and deserializes a service's settings struct `T` from the YAML
/// file named by `CONFIG_FILE`, with `env_prefix`-prefixed environment
/// variables (double-underscore separated) applied on top.
pub fn load<T: DeserializeOwned>(env_prefix: &str) -> Result<T, ConfigError> {
    let path = std::env::var("CONFIG_FILE").map_err(|_| ConfigError::MissingConfigFileEnv)?;
    load_from(&path, env_prefix)
}

fn load_from<T: DeserializeOwned>(path: &str, env_prefix: &str) -> Result<T, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct Sample {
        host: String,
        port: u16,
    }

    #[test]
    fn loads_yaml_and_applies_env_override() {
        let (path, mut file) = tempfile_path();
        writeln!(file, "host: localhost\nport: 8080").unwrap();

        std::env::set_var("SAMPLETEST__PORT", "9090");
        let settings: Sample = load_from(path.to_str().unwrap(), "SAMPLETEST").unwrap();
        std::env::remove_var("SAMPLETEST__PORT");

        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.port, 9090);
    }

    fn tempfile_path() -> (std::path::PathBuf, std::fs::File) {
        let dir = std::env::temp_dir();
        let path = dir.join(format!(
            "appconfig-test-{:?}.yaml",
            std::thread::current().id()
        ));
        let file = std::fs::File::create(&path).unwrap();
        (path, file)
    }
}
