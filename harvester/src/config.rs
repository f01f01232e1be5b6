//! Configuration loading for the harvester
//!
//! Configuration is loaded from:
//! 1. An explicit `--config` path
//! 2. Environment variable HARVESTER_CONFIG_PATH
//! 3. ~/.image-harvester/config.toml
//! 4. Default values
//!
//! Environment variables override file values: the source API keys (see
//! [`SourcesConfig::apply_env`]), `HARVESTER_DB_PATH` and `HARVESTER_PORT`.

use anyhow::{Context, Result};
use image_sources::SourcesConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database location (defaults to ~/.image-harvester/harvester.db)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Crawl defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Limit used when a request omits one
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    /// Record failing sources as job errors
    #[serde(default)]
    pub surface_source_errors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_limit() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            surface_source_errors: false,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults, then apply the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).or_else(Self::find_config_path);

        let mut config = match config_path {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from: {}", path.display());
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::info!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => {
                tracing::info!("No config path available, using defaults");
                Self::default()
            }
        };

        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn apply_env(&mut self) -> Result<()> {
        self.sources.apply_env();

        if let Ok(path) = std::env::var("HARVESTER_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Ok(port) = std::env::var("HARVESTER_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid HARVESTER_PORT: {}", port))?;
        }
        Ok(())
    }

    /// Find the configuration file path
    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("HARVESTER_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        dirs::home_dir().map(|home| home.join(".image-harvester").join("config.toml"))
    }
}
