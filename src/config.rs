//! Runtime configuration, read from the environment (and `.env` through dotenv).

use std::{env, path::PathBuf, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};

use crate::consts;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub secure_cookies: bool,
    pub cors_origin: String,
    pub uploads_dir: PathBuf,
    /// Administrator created at startup when both are present
    pub admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so that it can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET is not defined in environment variables"))?;

        let token_ttl_days =
            parse_or(&lookup, "TOKEN_TTL_DAYS", consts::DEFAULT_TOKEN_TTL_DAYS)?;
        if !(1..=consts::MAX_TOKEN_TTL_DAYS).contains(&token_ttl_days) {
            bail!(
                "Invalid value for TOKEN_TTL_DAYS: {token_ttl_days} (expected 1 to {})",
                consts::MAX_TOKEN_TTL_DAYS
            );
        }

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            http_port: parse_or(&lookup, "HTTP_PORT", consts::DEFAULT_HTTP_PORT)?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| consts::DEFAULT_DATABASE_URL.to_string()),
            db_max_connections: parse_or(
                &lookup,
                "DB_MAX_CONNECTIONS",
                consts::DEFAULT_DB_MAX_CONNECTIONS,
            )?,
            jwt_secret,
            token_ttl_days,
            secure_cookies: parse_or(&lookup, "COOKIE_SECURE", true)?,
            cors_origin: lookup("CORS_ORIGIN")
                .unwrap_or_else(|| consts::DEFAULT_CORS_ORIGIN.to_string()),
            uploads_dir: lookup("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(consts::DEFAULT_UPLOADS_DIR)),
            admin,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
