//! API server configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use learnhub_core::auth::jwt::DEFAULT_TOKEN_TTL_SECS;
use learnhub_core::auth::roles::DEFAULT_ROLE_LOOKUP_TIMEOUT;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};

/// Length of a generated JWT secret.
const GENERATED_SECRET_LEN: usize = 64;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8787").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Lifetime of issued tokens, in seconds.
    pub token_ttl_secs: i64,
    /// Upper bound on a single role lookup.
    pub role_lookup_timeout: Duration,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                 | Default                                   |
    /// |--------------------------|-------------------------------------------|
    /// | `BIND_ADDR`              | `127.0.0.1:8787`                          |
    /// | `DATABASE_URL`           | `postgres://localhost:5432/learnhub`      |
    /// | `JWT_SECRET`             | generated & persisted to file             |
    /// | `TOKEN_TTL_SECS`         | `604800` (7 days)                         |
    /// | `ROLE_LOOKUP_TIMEOUT_MS` | `5000`                                    |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8787".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/learnhub".into()),
            jwt_secret: resolve_jwt_secret(),
            token_ttl_secs: env_or("TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS),
            role_lookup_timeout: Duration::from_millis(env_or(
                "ROLE_LOOKUP_TIMEOUT_MS",
                DEFAULT_ROLE_LOOKUP_TIMEOUT.as_millis() as u64,
            )),
        }
    }
}

/// Parse a positive number from an environment variable, falling back to
/// `default` when unset, invalid or not greater than zero.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + Default + PartialOrd + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Copy + Default + PartialOrd + std::fmt::Display,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => value,
        Ok(_) => {
            warn!(key, value = raw, %default, "value must be greater than zero, using default");
            default
        }
        Err(_) => {
            warn!(key, value = raw, %default, "invalid value, using default");
            default
        }
    }
}

/// Resolve the JWT secret: env var `JWT_SECRET` → persisted file → freshly generated.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    let path = jwt_secret_path();
    match load_or_create_secret(&path) {
        Ok(secret) => secret,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not persist JWT secret; using an ephemeral one");
            generate_secret()
        }
    }
}

/// Read the secret stored at `path`, generating and writing one if the file
/// is missing or empty.
pub fn load_or_create_secret(path: &Path) -> std::io::Result<String> {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
    let secret = generate_secret();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &secret)?;
    info!(path = %path.display(), "generated new JWT secret");
    Ok(secret)
}

fn generate_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("learnhub")
        .join("jwt-secret")
}
