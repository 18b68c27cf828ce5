//! Environment-driven configuration.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// What happens to the legacy tables once an upgrade has committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyTablePolicy {
    /// Leave the legacy tables in place.
    #[default]
    Keep,
    /// Drop the legacy tables inside the committing transaction.
    Drop,
}

impl FromStr for LegacyTablePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "drop" => Ok(Self::Drop),
            other => Err(format!("expected `keep` or `drop`, got `{other}`")),
        }
    }
}

/// Process-wide settings, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Root of the `category/exercise/` asset tree.
    pub assets_dir: PathBuf,
    /// Directory that receives snapshot files.
    pub backup_dir: PathBuf,
    pub connect_attempts: u32,
    pub connect_retry_delay: Duration,
    pub max_connections: u32,
    pub legacy_tables: LegacyTablePolicy,
}

impl Config {
    /// Creates a configuration with defaults for everything but the URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            assets_dir: PathBuf::from("Fitness_Assets"),
            backup_dir: PathBuf::from("backups"),
            connect_attempts: 5,
            connect_retry_delay: Duration::from_secs(2),
            max_connections: 10,
            legacy_tables: LegacyTablePolicy::Keep,
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// `DATABASE_URL` is required. `ASSETS_DIR`, `BACKUP_DIR`,
    /// `DB_CONNECT_ATTEMPTS`, `DB_CONNECT_RETRY_DELAY_SECS`,
    /// `DB_MAX_CONNECTIONS` and `LEGACY_TABLES` fall back to the defaults of
    /// [`Config::new`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let mut config = Self::new(database_url);

        if let Ok(dir) = env::var("ASSETS_DIR") {
            config.assets_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("BACKUP_DIR") {
            config.backup_dir = PathBuf::from(dir);
        }
        if let Some(attempts) = parse_var::<u32>("DB_CONNECT_ATTEMPTS")? {
            config.connect_attempts = attempts.max(1);
        }
        if let Some(secs) = parse_var::<u64>("DB_CONNECT_RETRY_DELAY_SECS")? {
            config.connect_retry_delay = Duration::from_secs(secs);
        }
        if let Some(max) = parse_var::<u32>("DB_MAX_CONNECTIONS")? {
            config.max_connections = max;
        }
        if let Some(policy) = parse_var::<LegacyTablePolicy>("LEGACY_TABLES")? {
            config.legacy_tables = policy;
        }

        Ok(config)
    }
}

fn parse_var<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    let Ok(value) = env::var(key) else {
        return Ok(None);
    };
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_policy_parses_case_insensitively() {
        assert_eq!("Drop".parse::<LegacyTablePolicy>(), Ok(LegacyTablePolicy::Drop));
        assert_eq!(" keep ".parse::<LegacyTablePolicy>(), Ok(LegacyTablePolicy::Keep));
        assert!("archive".parse::<LegacyTablePolicy>().is_err());
    }

    #[test]
    fn new_uses_documented_defaults() {
        let config = Config::new("sqlite::memory:");
        assert_eq!(config.assets_dir, PathBuf::from("Fitness_Assets"));
        assert_eq!(config.connect_attempts, 5);
        assert_eq!(config.connect_retry_delay, Duration::from_secs(2));
        assert_eq!(config.legacy_tables, LegacyTablePolicy::Keep);
    }
}
