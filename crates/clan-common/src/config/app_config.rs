//! Application configuration structs
//!
//! Loads configuration from environment variables. The configuration is
//! assembled once at startup into an explicit context value; nothing reads
//! the environment after initialization.

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub hiscores: HiscoresConfig,
    pub site: SiteConfig,
    pub storage: StorageConfig,
    pub reconcile: ReconcileConfig,
    pub schedule: ScheduleConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_clan_name")]
    pub clan_name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Hiscores endpoints and retry policy
#[derive(Debug, Clone, Deserialize)]
pub struct HiscoresConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
}

/// Community website endpoints and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Local persistence locations
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
    #[serde(default = "default_mirror_dir")]
    pub mirror_dir: String,
    #[serde(default = "default_permissions_path")]
    pub permissions_path: String,
}

/// Reconciliation tunables
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    /// Rename match scores below this are treated as probable renames
    #[serde(default = "default_rename_threshold")]
    pub rename_threshold: f64,
    /// Leaver counts above this suppress automatic external deranks
    #[serde(default = "default_leaver_cap")]
    pub leaver_cap: usize,
    /// Concurrent per-player detail fetches
    #[serde(default = "default_detail_concurrency")]
    pub detail_concurrency: usize,
}

/// Daily update scheduling
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// UTC hour of the daily full update
    #[serde(default = "default_update_hour")]
    pub update_hour: u32,
    /// Minutes of "update in progress" countdown before mutation
    #[serde(default = "default_countdown_minutes")]
    pub countdown_minutes: u32,
}

// Default value functions
fn default_clan_name() -> String {
    "clan".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retries() -> u32 {
    6
}

fn default_backup_dir() -> String {
    "./backup_memberlists".to_string()
}

fn default_mirror_dir() -> String {
    "./mirror".to_string()
}

fn default_permissions_path() -> String {
    "./permissions.json".to_string()
}

fn default_rename_threshold() -> f64 {
    2.0
}

fn default_leaver_cap() -> usize {
    10
}

fn default_detail_concurrency() -> usize {
    8
}

fn default_update_hour() -> u32 {
    20
}

fn default_countdown_minutes() -> u32 {
    5
}

/// Parse an optional variable: unset falls back, set-but-malformed is an error
fn parse_optional<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: fn() -> T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        None => Ok(default()),
    }
}

fn parse_environment(raw: Option<String>) -> Result<Environment, ConfigError> {
    match raw {
        Some(raw) => match raw.to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "development" => Ok(Environment::Development),
            _ => Err(ConfigError::InvalidValue("APP_ENV", raw)),
        },
        None => Ok(Environment::default()),
    }
}

fn parse_update_hour(raw: Option<String>) -> Result<u32, ConfigError> {
    let hour = parse_optional("UPDATE_HOUR", raw, default_update_hour)?;
    if hour >= 24 {
        return Err(ConfigError::InvalidValue("UPDATE_HOUR", hour.to_string()));
    }
    Ok(hour)
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required environment variable is missing, or if
    /// an optional one is set to a value that does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                clan_name: env::var("CLAN_NAME").unwrap_or_else(|_| default_clan_name()),
                env: parse_environment(env::var("APP_ENV").ok())?,
            },
            hiscores: HiscoresConfig {
                base_url: env::var("HISCORES_BASE_URL")
                    .map_err(|_| ConfigError::MissingVar("HISCORES_BASE_URL"))?,
                timeout_secs: parse_optional(
                    "HISCORES_TIMEOUT_SECS",
                    env::var("HISCORES_TIMEOUT_SECS").ok(),
                    default_timeout_secs,
                )?,
                retries: parse_optional(
                    "HISCORES_RETRIES",
                    env::var("HISCORES_RETRIES").ok(),
                    default_retries,
                )?,
            },
            site: SiteConfig {
                base_url: env::var("SITE_BASE_URL")
                    .map_err(|_| ConfigError::MissingVar("SITE_BASE_URL"))?,
                email: env::var("SITE_EMAIL").map_err(|_| ConfigError::MissingVar("SITE_EMAIL"))?,
                password: env::var("SITE_PASSWORD")
                    .map_err(|_| ConfigError::MissingVar("SITE_PASSWORD"))?,
                timeout_secs: parse_optional(
                    "SITE_TIMEOUT_SECS",
                    env::var("SITE_TIMEOUT_SECS").ok(),
                    default_timeout_secs,
                )?,
            },
            storage: StorageConfig {
                backup_dir: env::var("BACKUP_DIR").unwrap_or_else(|_| default_backup_dir()),
                mirror_dir: env::var("MIRROR_DIR").unwrap_or_else(|_| default_mirror_dir()),
                permissions_path: env::var("PERMISSIONS_PATH")
                    .unwrap_or_else(|_| default_permissions_path()),
            },
            reconcile: ReconcileConfig {
                rename_threshold: parse_optional(
                    "RENAME_THRESHOLD",
                    env::var("RENAME_THRESHOLD").ok(),
                    default_rename_threshold,
                )?,
                leaver_cap: parse_optional(
                    "LEAVER_CAP",
                    env::var("LEAVER_CAP").ok(),
                    default_leaver_cap,
                )?,
                detail_concurrency: parse_optional(
                    "DETAIL_CONCURRENCY",
                    env::var("DETAIL_CONCURRENCY").ok(),
                    default_detail_concurrency,
                )?,
            },
            schedule: ScheduleConfig {
                update_hour: parse_update_hour(env::var("UPDATE_HOUR").ok())?,
                countdown_minutes: parse_optional(
                    "COUNTDOWN_MINUTES",
                    env::var("COUNTDOWN_MINUTES").ok(),
                    default_countdown_minutes,
                )?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
