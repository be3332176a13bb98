//! Start-up configuration read from the environment (after `.env`).

use std::fmt;
use std::time::Duration;

use crate::attendance::Schedule;
use crate::attendance::store::DEFAULT_CAPACITY;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_MODULE: &str = "R209";
const DEFAULT_BOARD_IDLE_MINUTES: u64 = 240;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {key}: '{value}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// What the page handlers need from the configuration.
#[derive(Debug, Clone)]
pub struct BoardSettings {
    pub schedule: Schedule,
    pub default_module: String,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self { schedule: Schedule::default(), default_module: DEFAULT_MODULE.to_string() }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub schedule: Schedule,
    pub default_module: String,
    pub board_idle: Duration,
    pub max_boards: usize,
    pub db_max_connections: u32,
    pub seed_demo_roster: bool,
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}

fn parse_flag(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => Err(ConfigError::Invalid { key, value: other.to_string() }),
    }
}

impl AppConfig {
    pub fn board_settings(&self) -> BoardSettings {
        BoardSettings {
            schedule: self.schedule.clone(),
            default_module: self.default_module.clone(),
        }
    }

    /// Reads `.env` when present, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let schedule = match lookup("ATTENDANCE_SLOTS") {
            None => Schedule::default(),
            Some(csv) => Schedule::from_csv(&csv)
                .ok_or(ConfigError::Invalid { key: "ATTENDANCE_SLOTS", value: csv })?,
        };

        let idle_minutes = parse_number("BOARD_IDLE_MINUTES", lookup("BOARD_IDLE_MINUTES"), DEFAULT_BOARD_IDLE_MINUTES)?;
        if idle_minutes == 0 {
            return Err(ConfigError::Invalid { key: "BOARD_IDLE_MINUTES", value: "0".into() });
        }

        let max_boards = parse_number("MAX_OPEN_BOARDS", lookup("MAX_OPEN_BOARDS"), DEFAULT_CAPACITY)?;
        if max_boards == 0 {
            return Err(ConfigError::Invalid { key: "MAX_OPEN_BOARDS", value: "0".into() });
        }

        Ok(Self {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            session_key: lookup("SESSION_KEY"),
            schedule,
            default_module: lookup("DEFAULT_MODULE").unwrap_or_else(|| DEFAULT_MODULE.to_string()),
            board_idle: Duration::from_secs(idle_minutes * 60),
            max_boards,
            db_max_connections: parse_number("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?,
            seed_demo_roster: parse_flag("SEED_DEMO_ROSTER", lookup("SEED_DEMO_ROSTER"))?,
        })
    }
}
