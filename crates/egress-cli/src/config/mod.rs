//! Configuration management.

mod files;

pub use files::{load_hosts, load_policy, load_state, save_state};

use anyhow::Result;
use directories::ProjectDirs;
use fqdn_egress::EngineConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "FQDN_EGRESS_CONFIG";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Default state file location.
    pub state_path: Option<PathBuf>,

    /// Nameservers to query instead of the system configuration.
    #[serde(default)]
    pub nameservers: Vec<SocketAddr>,

    /// Maximum concurrent lookups.
    pub max_concurrent: Option<usize>,

    /// Attempts per DNS query.
    pub attempts: Option<usize>,

    /// DNS response cache size.
    pub cache_size: Option<usize>,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("io", "fqdn-egress", "fqdn-egress")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load configuration from file.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;

        Ok(config)
    }

    /// State file to use when none is given on the command line.
    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.state_path {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("state.json")),
        }
    }

    /// Engine settings, with command-line overrides applied.
    #[must_use]
    pub fn engine_config(&self, nameservers: &[SocketAddr], max_concurrent: Option<usize>) -> EngineConfig {
        let mut engine = EngineConfig::default();
        if let Some(max) = max_concurrent.or(self.max_concurrent) {
            engine = engine.max_concurrent(max);
        }
        if let Some(attempts) = self.attempts {
            engine = engine.attempts(attempts);
        }
        if let Some(size) = self.cache_size {
            engine = engine.cache_size(size);
        }
        let nameservers = if nameservers.is_empty() {
            self.nameservers.clone()
        } else {
            nameservers.to_vec()
        };
        engine.nameservers(nameservers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_overrides() {
        let config: Config = toml::from_str(
            r#"
            nameservers = ["9.9.9.9:53"]
            max_concurrent = 4
            attempts = 1
            "#,
        )
        .unwrap();

        let engine = config.engine_config(&[], None);
        assert_eq!(engine.max_concurrent, 4);
        assert_eq!(engine.lookup.attempts, 1);
        assert_eq!(engine.lookup.nameservers, vec!["9.9.9.9:53".parse().unwrap()]);

        let cli_ns: SocketAddr = "1.1.1.1:53".parse().unwrap();
        let engine = config.engine_config(&[cli_ns], Some(2));
        assert_eq!(engine.max_concurrent, 2);
        assert_eq!(engine.lookup.nameservers, vec![cli_ns]);
    }
}
