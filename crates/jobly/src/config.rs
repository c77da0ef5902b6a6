//! Database configuration.
//!
//! Configuration comes either from the environment (with `.env` support) or
//! from a TOML file with a `[database]` table:
//!
//! ```toml
//! [database]
//! url = "postgres://${PGUSER}@localhost/jobly"
//! max_pool_size = 8
//! ```

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;
use std::path::Path;

/// Default maximum number of pooled connections.
pub const DEFAULT_POOL_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub max_pool_size: usize,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    database: DatabaseConfig,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Read configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Variables:
    /// - `DATABASE_URL` (required)
    /// - `TEST_DATABASE_URL`, used instead when `JOBLY_ENV=test`
    /// - `JOBLY_POOL_SIZE` (optional, defaults to [`DEFAULT_POOL_SIZE`])
    pub fn from_env() -> JoblyResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`DatabaseConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let testing = lookup("JOBLY_ENV").is_some_and(|env| env == "test");
        let url = testing
            .then(|| lookup("TEST_DATABASE_URL"))
            .flatten()
            .or_else(|| lookup("DATABASE_URL"))
            .ok_or_else(|| JoblyError::config("DATABASE_URL is not set"))?;

        let max_pool_size = match lookup("JOBLY_POOL_SIZE") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                JoblyError::config(format!("JOBLY_POOL_SIZE is not a number: {raw}"))
            })?,
            None => DEFAULT_POOL_SIZE,
        };

        let config = Self { url, max_pool_size };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document, expanding `${VAR}` references in `url`.
    pub fn from_toml_str(raw: &str) -> JoblyResult<Self> {
        Self::from_toml_str_with(raw, |key| std::env::var(key).ok())
    }

    fn from_toml_str_with(
        raw: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> JoblyResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| JoblyError::config(format!("failed to parse config: {e}")))?;

        let mut config = file.database;
        config.url = expand_env_vars(&config.url, &lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> JoblyResult<()> {
        if self.url.trim().is_empty() {
            return Err(JoblyError::config("database url must not be empty"));
        }
        if self.max_pool_size == 0 {
            return Err(JoblyError::config("max_pool_size must be at least 1"));
        }
        Ok(())
    }
}

fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(JoblyError::config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(JoblyError::config("invalid env var reference: ${}"));
            }

            let value = lookup(&key).ok_or_else(|| {
                JoblyError::config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&value);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
