// src/core/config_manager.rs
//! Configuration loading: config.yaml sections plus environment overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_AUDIENCE: &str = "authenticated";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment_name: String,
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_audience")]
    pub jwt_audience: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_audience() -> Option<String> {
    Some(DEFAULT_AUDIENCE.to_string())
}

impl EnvironmentConfig {
    fn defaults(base_dir: &Path) -> Self {
        Self {
            database_path: base_dir.join("network_service.db"),
            port: DEFAULT_PORT,
            jwt_secret: None,
            jwt_audience: default_audience(),
        }
    }
}

impl ConfigManager {
    /// Load configuration for the environment named by `ENVIRONMENT`
    pub fn load() -> Result<Self> {
        let environment_name =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());
        app_log!(info, "Loading configuration for environment: {}", environment_name);

        let base_dir = std::env::current_dir().context("Failed to get current directory")?;
        let config_path = base_dir.join(CONFIG_FILE);

        let mut environment = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::parse(&content, &environment_name)?
        } else {
            app_log!(
                warn,
                "{} not found, using default configuration",
                config_path.display()
            );
            EnvironmentConfig::defaults(&base_dir)
        };

        Self::apply_overrides(&mut environment, |key| std::env::var(key).ok())?;
        environment.database_path = Self::resolve_path(&base_dir, &environment.database_path);

        Ok(Self {
            environment_name,
            environment,
        })
    }

    /// Pick the section matching `environment_name` out of a YAML document
    pub fn parse(content: &str, environment_name: &str) -> Result<EnvironmentConfig> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        Ok(match environment_name {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn apply_overrides<F>(config: &mut EnvironmentConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("ROCKET_PORT") {
            config.port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?;
        }
        if let Some(path) = lookup("NETWORK_DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(secret) = lookup("NETWORK_JWT_SECRET") {
            config.jwt_secret = Some(secret);
        }
        Ok(())
    }

    fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// The JWT secret is mandatory for the web server
    pub fn jwt_secret(&self) -> Result<&str> {
        self.environment
            .jwt_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("NETWORK_JWT_SECRET not set and no jwt_secret in config.yaml")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
local:
  database_path: data/network.db
  jwt_secret: local-secret
production:
  database_path: /app/data/network.db
  port: 9100
  jwt_audience: authenticated
"#;

    #[test]
    fn test_parse_selects_environment_section() {
        let local = ConfigManager::parse(SAMPLE, "local").unwrap();
        assert_eq!(local.database_path, PathBuf::from("data/network.db"));
        assert_eq!(local.port, DEFAULT_PORT);
        assert_eq!(local.jwt_secret.as_deref(), Some("local-secret"));

        let production = ConfigManager::parse(SAMPLE, "production").unwrap();
        assert_eq!(production.port, 9100);
        assert!(production.jwt_secret.is_none());
    }

    #[test]
    fn test_unknown_environment_falls_back_to_local() {
        let config = ConfigManager::parse(SAMPLE, "staging").unwrap();
        assert_eq!(config.database_path, PathBuf::from("data/network.db"));
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ROCKET_PORT", "8123"),
            ("NETWORK_JWT_SECRET", "from-env"),
            ("NETWORK_DATABASE_PATH", "/tmp/override.db"),
        ]
        .into_iter()
        .collect();

        let mut config = ConfigManager::parse(SAMPLE, "local").unwrap();
        ConfigManager::apply_overrides(&mut config, |key| {
            vars.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.port, 8123);
        assert_eq!(config.jwt_secret.as_deref(), Some("from-env"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/override.db"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = ConfigManager::parse(SAMPLE, "local").unwrap();
        let result = ConfigManager::apply_overrides(&mut config, |key| {
            (key == "ROCKET_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_relative_paths_resolve_against_base_dir() {
        let base = PathBuf::from("/srv/network");
        assert_eq!(
            ConfigManager::resolve_path(&base, Path::new("db/network.db")),
            PathBuf::from("/srv/network/db/network.db")
        );
        assert_eq!(
            ConfigManager::resolve_path(&base, Path::new("/var/network.db")),
            PathBuf::from("/var/network.db")
        );
    }
}
