//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Chat configuration.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Subscription tiers and reveal quotas.
    #[serde(default)]
    pub subscription: SubscriptionConfig,
    /// Account lifecycle configuration.
    #[serde(default)]
    pub account: AccountConfig,
    /// Push notification configuration.
    #[serde(default)]
    pub push: PushConfig,
    /// Presentation settings.
    #[serde(default)]
    pub display: DisplayConfig,
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Chat configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatConfig {
    /// JSON file holding the predefined question catalog.
    /// The built-in catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<String>,
}

/// Maps a plan name to a tier and its contact reveal quota.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TierRule {
    /// Tier name reported to clients.
    pub tier: String,
    /// Case-insensitive substring looked up in the plan name.
    pub keyword: String,
    /// Number of distinct profiles the tier may reveal.
    pub quota: u32,
}

/// Subscription configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    /// Tier rules, checked in order.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierRule>,
    /// Refuse reveals of new profiles once the quota is used up.
    #[serde(default)]
    pub enforce_reveal_quota: bool,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            enforce_reveal_quota: false,
        }
    }
}

/// Account lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Days a soft-deleted account is kept before it is purged.
    #[serde(default = "default_retention_days")]
    pub deletion_retention_days: i64,
    /// Seconds between purge sweeps.
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            deletion_retention_days: default_retention_days(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

/// Push notification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Whether push delivery is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// FCM send endpoint.
    #[serde(default = "default_fcm_endpoint")]
    pub endpoint: String,
    /// FCM server key.
    #[serde(default)]
    pub server_key: Option<String>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_fcm_endpoint(),
            server_key: None,
        }
    }
}

/// Presentation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// IANA zone that timestamps are rendered in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// `strftime` pattern for rendered timestamps.
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            datetime_format: default_datetime_format(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    50
}

const fn default_min_connections() -> u32 {
    5
}

fn default_tiers() -> Vec<TierRule> {
    vec![
        TierRule {
            tier: "silver".to_string(),
            keyword: "silver".to_string(),
            quota: 27,
        },
        TierRule {
            tier: "gold".to_string(),
            keyword: "gold".to_string(),
            quota: 45,
        },
        TierRule {
            tier: "platinum".to_string(),
            keyword: "platinum".to_string(),
            quota: 120,
        },
    ]
}

const fn default_retention_days() -> i64 {
    30
}

const fn default_purge_interval() -> u64 {
    3600
}

fn default_fcm_endpoint() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_datetime_format() -> String {
    "%d %b %Y, %I:%M %p".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `SANGAM_ENV`)
    /// 3. Environment variables with `SANGAM__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("SANGAM_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SANGAM")
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
                config::Environment::with_prefix("SANGAM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                "[database]\nurl = \"postgres://localhost/sangam\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.account.deletion_retention_days, 30);
        assert_eq!(config.display.timezone, "Asia/Kolkata");
        assert!(!config.subscription.enforce_reveal_quota);
        assert!(!config.push.enabled);

        let quotas: Vec<u32> = config.subscription.tiers.iter().map(|t| t.quota).collect();
        assert_eq!(quotas, vec![27, 45, 120]);
    }

    #[test]
    fn test_overrides_tiers_and_format() {
        let toml = r#"
[database]
url = "postgres://localhost/sangam"

[logging]
format = "json"

[subscription]
enforce_reveal_quota = true
tiers = [{ tier = "basic", keyword = "basic", quota = 5 }]
"#;
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.subscription.enforce_reveal_quota);
        assert_eq!(config.subscription.tiers.len(), 1);
        assert_eq!(config.subscription.tiers[0].quota, 5);
    }
}
