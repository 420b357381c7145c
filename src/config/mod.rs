//! Configuration management
//!
//! This module handles loading and parsing configuration for ya-sites.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::services::news::DEFAULT_COUNT_ON_HOME_PAGE;
use crate::services::user::DEFAULT_SESSION_EXPIRATION_DAYS;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// News site configuration
    #[serde(default)]
    pub news: NewsConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Theme configuration
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL (`:memory:` for an in-memory database)
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/ya_sites.db".to_string()
}

/// News site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Number of news shown on the home page
    #[serde(default = "default_count_on_home_page")]
    pub count_on_home_page: u32,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            count_on_home_page: default_count_on_home_page(),
        }
    }
}

fn default_count_on_home_page() -> u32 {
    DEFAULT_COUNT_ON_HOME_PAGE
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session lifetime in days
    #[serde(default = "default_session_expiration_days")]
    pub session_expiration_days: i64,
    /// Where to go after login when no `next` is given
    #[serde(default = "default_login_redirect")]
    pub login_redirect: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_expiration_days: default_session_expiration_days(),
            login_redirect: default_login_redirect(),
        }
    }
}

fn default_session_expiration_days() -> i64 {
    DEFAULT_SESSION_EXPIRATION_DAYS
}

fn default_login_redirect() -> String {
    "/news/".to_string()
}

/// Theme configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Site name shown in page titles
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Optional directory with template overrides
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            path: None,
        }
    }
}

fn default_site_name() -> String {
    "YaSites".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - YA_SITES_SERVER_HOST
    /// - YA_SITES_SERVER_PORT
    /// - YA_SITES_DATABASE_URL
    /// - YA_SITES_NEWS_COUNT_ON_HOME_PAGE
    /// - YA_SITES_AUTH_SESSION_EXPIRATION_DAYS
    /// - YA_SITES_THEME_PATH
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the application cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.news.count_on_home_page == 0 {
            return Err(ConfigError::ValidationError(
                "news.count_on_home_page must be greater than zero".to_string(),
            ));
        }
        if self.auth.session_expiration_days <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.session_expiration_days must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("YA_SITES_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("YA_SITES_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(url) = std::env::var("YA_SITES_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(count) = std::env::var("YA_SITES_NEWS_COUNT_ON_HOME_PAGE") {
            if let Ok(count) = count.parse::<u32>() {
                self.news.count_on_home_page = count;
            }
        }

        if let Ok(days) = std::env::var("YA_SITES_AUTH_SESSION_EXPIRATION_DAYS") {
            if let Ok(days) = days.parse::<i64>() {
                self.auth.session_expiration_days = days;
            }
        }

        if let Ok(path) = std::env::var("YA_SITES_THEME_PATH") {
            self.theme.path = Some(PathBuf::from(path));
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}
