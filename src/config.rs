//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `STRATA_*` environment variable overrides.

use crate::discovery::DiscoveryConfig;
use crate::snapshot::AssemblerLimits;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoverySection,

    #[serde(default)]
    pub assembler: AssemblerSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Series discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySection {
    /// Series processed concurrently per discovery call
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Feed used when a command does not name one
    #[serde(default)]
    pub feed: Option<String>,
}

fn default_concurrency() -> usize {
    8
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            feed: None,
        }
    }
}

impl DiscoverySection {
    pub fn to_discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            concurrency: self.concurrency,
        }
    }
}

/// Snapshot assembler limits
#[derive(Debug, Clone, Deserialize)]
pub struct AssemblerSection {
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,

    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: usize,
}

fn default_max_chunks() -> usize {
    AssemblerLimits::default().max_chunks
}

fn default_max_size_bytes() -> usize {
    AssemblerLimits::default().max_size_bytes
}

impl Default for AssemblerSection {
    fn default() -> Self {
        Self {
            max_chunks: default_max_chunks(),
            max_size_bytes: default_max_size_bytes(),
        }
    }
}

impl AssemblerSection {
    pub fn to_limits(&self) -> AssemblerLimits {
        AssemblerLimits {
            max_chunks: self.max_chunks,
            max_size_bytes: self.max_size_bytes,
        }
    }
}

/// Backing store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    /// JSON fixture loaded into the in-memory store
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("strata").join("config.toml")),
            Some(PathBuf::from("/etc/strata/config.toml")),
            Some(PathBuf::from("./strata.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Discovery overrides
        if let Some(concurrency) = lookup("STRATA_CONCURRENCY") {
            match concurrency.parse() {
                Ok(n) => self.discovery.concurrency = n,
                Err(_) => tracing::warn!(value = %concurrency, "Ignoring invalid STRATA_CONCURRENCY"),
            }
        }
        if let Some(feed) = lookup("STRATA_FEED") {
            self.discovery.feed = Some(feed);
        }

        // Assembler overrides
        if let Some(max_chunks) = lookup("STRATA_MAX_CHUNKS") {
            if let Ok(n) = max_chunks.parse() {
                self.assembler.max_chunks = n;
            }
        }
        if let Some(max_size) = lookup("STRATA_MAX_SIZE_BYTES") {
            if let Ok(n) = max_size.parse() {
                self.assembler.max_size_bytes = n;
            }
        }

        // Store overrides
        if let Some(fixture) = lookup("STRATA_FIXTURE") {
            self.store.fixture = Some(PathBuf::from(fixture));
        }

        // Logging overrides
        if let Some(level) = lookup("STRATA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("STRATA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Strata Configuration
#
# Environment variables override these settings:
# - STRATA_CONCURRENCY
# - STRATA_FEED
# - STRATA_MAX_CHUNKS
# - STRATA_MAX_SIZE_BYTES
# - STRATA_FIXTURE
# - STRATA_LOG_LEVEL
# - STRATA_LOG_FORMAT

[discovery]
# Number of series reassembled concurrently
concurrency = 8

# Default feed for discovery commands
# feed = "my-agent"

[assembler]
# Largest chunk count a snapshot may declare
max_chunks = 100000

# Largest compressed size a snapshot may declare (bytes)
max_size_bytes = 536870912

[store]
# JSON fixture loaded into the in-memory series store
# fixture = "./store.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
