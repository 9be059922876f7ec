// ABOUTME: Configuration management for the topos client
// Resolves the service endpoint, request timeout and lock description from
// config files, environment variables and command-line overrides

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the endpoint
pub const ENV_ENDPOINT: &str = "TOPOS_ENDPOINT";
/// Environment variable overriding the request timeout in seconds
pub const ENV_TIMEOUT: &str = "TOPOS_TIMEOUT";
/// Environment variable overriding the lock description
pub const ENV_LOCK_DESCRIPTION: &str = "TOPOS_LOCK_DESCRIPTION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToposConfig {
    /// Base URL every request path is appended to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds, 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Description attached to locks (defaults to the host name)
    #[serde(default)]
    pub lock_description: Option<String>,
}

fn default_endpoint() -> String {
    "https://topos.grid.sara.nl/4.1/".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for ToposConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            lock_description: None,
        }
    }
}

/// One config file's settings; absent keys leave lower layers untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub lock_description: Option<String>,
}

/// Values given on the command line; they win over everything else
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ToposConfig {
    /// Load configuration from default locations, the environment and overrides
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        Self::load_from(&Self::get_config_paths(), &load_from_env(), overrides)
    }

    /// Layer `paths` (lowest precedence first, missing ones skipped), the
    /// explicit config file, `env` and `overrides` over the defaults
    pub fn load_from(
        paths: &[PathBuf],
        env: &HashMap<String, String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let mut config = Self::default();

        for path in paths {
            if path.exists() {
                config.merge(load_layer(path)?);
            }
        }

        if let Some(path) = &overrides.config_file {
            config.merge(load_layer(path)?);
        }

        config.apply_env(env)?;
        config.apply_overrides(overrides);
        config.validate()?;

        Ok(config)
    }

    /// Parse a single config file on top of the defaults
    pub fn load_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(load_layer(path)?);
        Ok(config)
    }

    /// Get configuration file paths, lowest precedence first
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/topos/config.toml")];

        if let Ok(config_dir) = Self::get_user_config_dir() {
            paths.push(config_dir.join("config.toml"));
        }

        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(".topos").join("config.toml"));
        }

        paths
    }

    /// Get user configuration directory (~/.topos)
    pub fn get_user_config_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home_dir.join(".topos"))
    }

    /// Apply every key `layer` sets, even one equal to the default
    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(endpoint) = layer.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(timeout_secs) = layer.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if layer.lock_description.is_some() {
            self.lock_description = layer.lock_description;
        }
    }

    fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<()> {
        if let Some(endpoint) = env.get(ENV_ENDPOINT) {
            self.endpoint.clone_from(endpoint);
        }
        if let Some(timeout) = env.get(ENV_TIMEOUT) {
            self.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT} must be a number of seconds, got {timeout:?}"))?;
        }
        if let Some(description) = env.get(ENV_LOCK_DESCRIPTION) {
            self.lock_description = Some(description.clone());
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(endpoint) = &overrides.endpoint {
            self.endpoint.clone_from(endpoint);
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
    }

    /// Check the endpoint parses and normalise it to end with a slash
    pub fn validate(&mut self) -> Result<()> {
        let url = self.endpoint_url()?;
        self.endpoint = url.to_string();
        Ok(())
    }

    /// Endpoint as a base URL that relative paths extend rather than replace
    pub fn endpoint_url(&self) -> Result<Url> {
        let mut url = Url::parse(self.endpoint.trim())
            .with_context(|| format!("Invalid endpoint URL {:?}", self.endpoint))?;

        if url.cannot_be_a_base() {
            anyhow::bail!("Endpoint {:?} cannot be used as a base URL", self.endpoint);
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }

    /// Request timeout, `None` when disabled
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

/// Parse the keys present in one config file
pub fn load_layer(path: &Path) -> Result<ConfigLayer> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}

/// Load configuration from environment
pub fn load_from_env() -> HashMap<String, String> {
    std::env::vars().filter(|(k, _)| k.starts_with("TOPOS_")).collect()
}
