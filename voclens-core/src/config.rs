//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/voclens/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/voclens/` (~/.config/voclens/)
//! - Data: `$XDG_DATA_HOME/voclens/` (~/.local/share/voclens/)
//! - State/Logs: `$XDG_STATE_HOME/voclens/` (~/.local/state/voclens/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Messaging platform API access
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Narrative (LLM) API access
    #[serde(default)]
    pub narrative: NarrativeConfig,

    /// Report generation settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Messaging platform configuration
///
/// Covers both the open API (conversation/tag/team reads, team messages)
/// and the document API (article publishing).
#[derive(Debug, Deserialize, Clone)]
pub struct PlatformConfig {
    /// Open API base URL
    #[serde(default = "default_open_api_base_url")]
    pub open_api_base_url: String,

    /// Document API base URL
    #[serde(default = "default_document_api_base_url")]
    pub document_api_base_url: String,

    /// Desk base URL used to compose published document links
    #[serde(default = "default_desk_base_url")]
    pub desk_base_url: String,

    /// API access key
    pub access_key: Option<String>,

    /// API access secret
    pub access_secret: Option<String>,

    /// Workspace channel id (document link composition)
    pub channel_id: Option<String>,

    /// Document space id
    pub space_id: Option<String>,

    /// Author id used for published articles
    pub author_id: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_platform_timeout")]
    pub timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            open_api_base_url: default_open_api_base_url(),
            document_api_base_url: default_document_api_base_url(),
            desk_base_url: default_desk_base_url(),
            access_key: None,
            access_secret: None,
            channel_id: None,
            space_id: None,
            author_id: None,
            timeout_secs: default_platform_timeout(),
        }
    }
}

impl PlatformConfig {
    /// Check if platform access is fully configured
    pub fn is_ready(&self) -> bool {
        self.access_key.is_some() && self.access_secret.is_some()
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.access_key.is_none() {
            return Err(Error::Config(
                "platform.access_key is required".to_string(),
            ));
        }
        if self.access_secret.is_none() {
            return Err(Error::Config(
                "platform.access_secret is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate the extra fields document publishing needs
    pub fn validate_publishing(&self) -> Result<()> {
        self.validate()?;
        for (field, value) in [
            ("platform.channel_id", &self.channel_id),
            ("platform.space_id", &self.space_id),
            ("platform.author_id", &self.author_id),
        ] {
            if value.is_none() {
                return Err(Error::Config(format!(
                    "{} is required for document publishing",
                    field
                )));
            }
        }
        Ok(())
    }
}

fn default_open_api_base_url() -> String {
    "https://api.channel.io/open/v5".to_string()
}

fn default_document_api_base_url() -> String {
    "https://document-api.channel.io".to_string()
}

fn default_desk_base_url() -> String {
    "https://desk.channel.io".to_string()
}

fn default_platform_timeout() -> u64 {
    30
}

/// Narrative (LLM) API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct NarrativeConfig {
    /// API endpoint
    #[serde(default = "default_narrative_endpoint")]
    pub endpoint: String,

    /// API key (can also use env var NARRATIVE_API_KEY)
    pub api_key: Option<String>,

    /// Model to use
    #[serde(default = "default_narrative_model")]
    pub model: String,

    /// System prompt framing the analysis
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Response token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_narrative_timeout")]
    pub timeout_secs: u64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_narrative_endpoint(),
            api_key: None,
            model: default_narrative_model(),
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_narrative_timeout(),
        }
    }
}

impl NarrativeConfig {
    /// Resolve the API key from config or environment
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("NARRATIVE_API_KEY").ok())
    }
}

fn default_narrative_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_narrative_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_system_prompt() -> String {
    "You are a customer-support analyst. Given weekly VOC tag counts as JSON, \
     write a short trend analysis with actionable insights."
        .to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_narrative_timeout() -> u64 {
    60
}

/// Report generation settings
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Number of aggregation windows per report
    #[serde(default = "default_report_weeks")]
    pub weeks: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            weeks: default_report_weeks(),
        }
    }
}

fn default_report_weeks() -> u32 {
    8
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("voclens").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite database)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("voclens")
    }

    /// Returns the state directory path (for logs)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("voclens")
    }

    /// Returns the database file path
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("voclens.log")
    }
}
