use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_DB_URL: &str = "sqlite:study.sqlite3?mode=rwc";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

pub const DB_URL_ENV: &str = "STUDY_DB_URL";
pub const LISTEN_ADDR_ENV: &str = "STUDY_LISTEN_ADDR";
pub const LOG_FORMAT_ENV: &str = "STUDY_LOG_FORMAT";

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{flag} requires a value")]
    MissingValue { flag: &'static str },
    #[error("unknown argument: {0}")]
    UnknownArg(String),
    #[error("invalid database url: {raw:?}")]
    InvalidDbUrl { raw: String },
    #[error("invalid listen address: {raw}")]
    InvalidListenAddr { raw: String },
    #[error("invalid log format (expected text or json): {raw}")]
    InvalidLogFormat { raw: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.eq_ignore_ascii_case("text") {
            Ok(LogFormat::Text)
        } else if raw.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(ConfigError::InvalidLogFormat {
                raw: raw.to_owned(),
            })
        }
    }
}

/// Server settings. Flags win over environment variables, which win over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub listen_addr: SocketAddr,
    pub log_format: LogFormat,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ConfigError> {
    args.next().ok_or(ConfigError::MissingValue { flag })
}

fn parse_listen_addr(raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidListenAddr {
            raw: raw.to_owned(),
        })
}

impl Config {
    /// Resolve from the process arguments and environment.
    ///
    /// Returns `Ok(None)` when help was requested.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unknown flags or malformed values.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::from_sources(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Resolve from explicit sources.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unknown flags or malformed values.
    pub fn from_sources(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let mut db_url = env(DB_URL_ENV).unwrap_or_else(|| DEFAULT_DB_URL.to_owned());
        let mut listen_addr = match env(LISTEN_ADDR_ENV) {
            Some(raw) => parse_listen_addr(&raw)?,
            None => parse_listen_addr(DEFAULT_LISTEN_ADDR)?,
        };
        let log_format = match env(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_url = require_value(&mut args, "--db")?,
                "--listen" => {
                    let value = require_value(&mut args, "--listen")?;
                    listen_addr = parse_listen_addr(&value)?;
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ConfigError::UnknownArg(arg)),
            }
        }

        if db_url.trim().is_empty() {
            return Err(ConfigError::InvalidDbUrl { raw: db_url });
        }

        Ok(Some(Self {
            db_url,
            listen_addr,
            log_format,
        }))
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  study-server [--db <sqlite_url>] [--listen <addr>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --listen {DEFAULT_LISTEN_ADDR}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {DB_URL_ENV}, {LISTEN_ADDR_ENV}, {LOG_FORMAT_ENV} (text|json), RUST_LOG");
}
