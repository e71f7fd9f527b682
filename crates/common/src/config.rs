//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Chat-platform configuration.
    pub platform: PlatformConfig,
    /// Text-classifier configuration.
    pub classifier: ClassifierConfig,
    /// Triage thresholds.
    #[serde(default)]
    pub triage: TriageConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Chat-platform connection configuration.
///
/// The platform collaborator delivers message, edit, and reaction events to
/// the ingest endpoint and receives outbound sends through its REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the platform REST API.
    pub api_url: String,
    /// Bot token used to authenticate outbound requests.
    pub token: String,
    /// The bot's own user id, so its messages are never triaged.
    pub bot_user_id: u64,
    /// Guilds this instance moderates.
    #[serde(default)]
    pub guilds: Vec<GuildConfig>,
    /// Outbound request timeout in seconds.
    #[serde(default = "default_platform_timeout")]
    pub timeout_secs: u64,
}

/// Per-guild channel wiring, resolved ahead of time by the operator.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildConfig {
    /// Guild id.
    pub guild_id: u64,
    /// Channel whose messages are scored automatically.
    pub monitored_channel_id: u64,
    /// Channel that receives flag summaries and disposition confirmations.
    pub moderation_channel_id: u64,
}

/// Text-classifier configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Analyze endpoint URL.
    #[serde(default = "default_classifier_url")]
    pub api_url: String,
    /// API key appended to analyze requests.
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

/// Thresholds for the automated scoring decision.
#[derive(Debug, Clone, Deserialize)]
pub struct TriageConfig {
    /// A message is flagged when any non-flirtation score exceeds this.
    #[serde(default = "default_toxicity_threshold")]
    pub toxicity_threshold: f64,
    /// A message is flagged when the flirtation score exceeds this.
    #[serde(default = "default_flirtation_threshold")]
    pub flirtation_threshold: f64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            toxicity_threshold: default_toxicity_threshold(),
            flirtation_threshold: default_flirtation_threshold(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_platform_timeout() -> u64 {
    10
}

fn default_classifier_url() -> String {
    "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze".to_string()
}

const fn default_classifier_timeout() -> u64 {
    10
}

const fn default_toxicity_threshold() -> f64 {
    0.5
}

const fn default_flirtation_threshold() -> f64 {
    0.7
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `AEGIS_ENV`)
    /// 3. Environment variables with `AEGIS_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("AEGIS_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("AEGIS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("AEGIS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Look up the channel wiring for a guild.
    #[must_use]
    pub fn guild(&self, guild_id: u64) -> Option<&GuildConfig> {
        self.platform.guilds.iter().find(|g| g.guild_id == guild_id)
    }
}
