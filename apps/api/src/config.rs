use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::matching::scorer::{ScoreWeights, DEFAULT_WEIGHTS};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Default scoring weights; requests may override per call.
    pub weights: ScoreWeights,
    pub embeddings_enabled: bool,
    pub embedding_cache_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            weights: ScoreWeights {
                hard: parse_env_or("MATCH_HARD_WEIGHT", DEFAULT_WEIGHTS.hard)?,
                soft: parse_env_or("MATCH_SOFT_WEIGHT", DEFAULT_WEIGHTS.soft)?,
            },
            embeddings_enabled: parse_bool(
                &std::env::var("EMBEDDINGS_ENABLED").unwrap_or_else(|_| "true".to_string()),
            )
            .context("EMBEDDINGS_ENABLED must be true or false")?,
            embedding_cache_dir: std::env::var("EMBEDDING_CACHE_DIR").ok().map(PathBuf::from),
            max_upload_bytes: parse_env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{other}'"),
    }
}
