use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_SIGNAL_WINDOW_DAYS: i64 = 90;
pub const DEFAULT_RECOMMENDATION_LIMIT: i64 = 10;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub signal_window_days: i64,
    pub recommendation_default_limit: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            signal_window_days: parse_or("SIGNAL_WINDOW_DAYS", DEFAULT_SIGNAL_WINDOW_DAYS)?,
            recommendation_default_limit: parse_or(
                "RECOMMENDATION_DEFAULT_LIMIT",
                DEFAULT_RECOMMENDATION_LIMIT,
            )?,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}
