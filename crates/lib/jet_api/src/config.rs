//! Application configuration.
//!
//! Loaded from a YAML file, then overridden key by key from environment
//! variables. Non-empty environment values win; numeric values that fail to
//! parse are ignored and the file value is kept.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use jet_core::seed::{SeedUser, default_seed_users};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub jwt: JwtConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    pub version: String,
    pub port: u16,
    /// `debug`, `release` or `test`.
    pub mode: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "jet".into(),
            version: jet_core::version().into(),
            port: 8080,
            mode: "release".into(),
        }
    }
}

impl AppSection {
    pub fn is_debug(&self) -> bool {
        self.mode == "debug"
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
    pub timezone: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    pub conn_max_lifetime_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            user: "postgres".into(),
            password: String::new(),
            dbname: "jet".into(),
            sslmode: "disable".into(),
            timezone: "UTC".into(),
            max_open_conns: 10,
            max_idle_conns: 2,
            conn_max_lifetime_secs: 3600,
            acquire_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("sslmode", &self.sslmode)
            .field("timezone", &self.timezone)
            .field("max_open_conns", &self.max_open_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("conn_max_lifetime_secs", &self.conn_max_lifetime_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Connection parameters for the store.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let ssl_mode = PgSslMode::from_str(&self.sslmode)
            .map_err(|_| ConfigError::Invalid(format!("unknown sslmode '{}'", self.sslmode)))?;
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.dbname)
            .ssl_mode(ssl_mode)
            .options([("timezone", self.timezone.as_str())]);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        Ok(options)
    }

    /// Pool sizing and timeouts.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_open_conns)
            .min_connections(self.max_idle_conns.min(self.max_open_conns))
            .max_lifetime(Duration::from_secs(self.conn_max_lifetime_secs))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(ConfigError::Invalid(format!("unknown log format '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File,
    Both,
}

impl FromStr for LogOutput {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "file" => Ok(Self::File),
            "both" => Ok(Self::Both),
            other => Err(ConfigError::Invalid(format!("unknown log output '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `info,jet_api=debug`.
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Used when `output` is `file` or `both`.
    pub file_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Json,
            output: LogOutput::Stdout,
            file_path: PathBuf::from("logs/app.log"),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HMAC signing secret. Required.
    pub secret: String,
    pub expire_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expire_hours: 24,
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expire_hours", &self.expire_hours)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub enabled: bool,
    pub users: Vec<SeedUser>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            users: default_seed_users(),
        }
    }
}

fn override_string(target: &mut String, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        *target = v;
    }
}

fn override_parsed<T: FromStr>(target: &mut T, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.is_empty())
        && let Ok(parsed) = v.parse()
    {
        *target = parsed;
    }
}

impl AppConfig {
    /// Reads `path` (if given), applies process environment overrides and
    /// validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_yaml(&raw)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        override_string(&mut self.app.name, lookup("APP_NAME"));
        override_parsed(&mut self.app.port, lookup("APP_PORT"));
        override_string(&mut self.app.mode, lookup("APP_MODE"));

        override_string(&mut self.database.host, lookup("DB_HOST"));
        override_parsed(&mut self.database.port, lookup("DB_PORT"));
        override_string(&mut self.database.user, lookup("DB_USER"));
        override_string(&mut self.database.password, lookup("DB_PASSWORD"));
        override_string(&mut self.database.dbname, lookup("DB_NAME"));
        override_string(&mut self.database.sslmode, lookup("DB_SSLMODE"));

        override_string(&mut self.logging.level, lookup("LOG_LEVEL"));
        override_parsed(&mut self.logging.format, lookup("LOG_FORMAT"));
        override_parsed(&mut self.logging.output, lookup("LOG_OUTPUT"));
        if let Some(path) = lookup("LOG_FILE_PATH").filter(|v| !v.is_empty()) {
            self.logging.file_path = PathBuf::from(path);
        }

        override_string(&mut self.jwt.secret, lookup("JWT_SECRET"));
        override_parsed(&mut self.jwt.expire_hours, lookup("JWT_EXPIRE_HOURS"));
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Invalid(
                "jwt.secret is required (set it in the config file or JWT_SECRET)".into(),
            ));
        }
        if self.jwt.expire_hours <= 0 {
            return Err(ConfigError::Invalid(
                "jwt.expire_hours must be positive".into(),
            ));
        }
        if chrono::Duration::try_hours(self.jwt.expire_hours).is_none() {
            return Err(ConfigError::Invalid(format!(
                "jwt.expire_hours {} is out of range",
                self.jwt.expire_hours
            )));
        }
        if !matches!(self.app.mode.as_str(), "debug" | "release" | "test") {
            return Err(ConfigError::Invalid(format!(
                "app.mode must be debug, release or test, got '{}'",
                self.app.mode
            )));
        }
        if self.database.max_open_conns == 0 {
            return Err(ConfigError::Invalid(
                "database.max_open_conns must be at least 1".into(),
            ));
        }
        self.database.connect_options()?;
        Ok(())
    }

    /// Token lifetime. Saturates for values `validate` rejects.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.jwt.expire_hours).unwrap_or(chrono::Duration::MAX)
    }
}
