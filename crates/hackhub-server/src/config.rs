use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me",
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub seed_demo: bool,
    pub signup_credits: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("HACKHUB_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("HACKHUB_JWT_SECRET is unset or still a placeholder");
        }

        let token_ttl_days: i64 = var("HACKHUB_TOKEN_TTL_DAYS", "30")
            .parse()
            .context("HACKHUB_TOKEN_TTL_DAYS must be a number of days")?;
        if token_ttl_days <= 0 {
            bail!("HACKHUB_TOKEN_TTL_DAYS must be positive");
        }
        let signup_credits: i64 = var("HACKHUB_SIGNUP_CREDITS", "100")
            .parse()
            .context("HACKHUB_SIGNUP_CREDITS must be an integer")?;
        if signup_credits < 0 {
            bail!("HACKHUB_SIGNUP_CREDITS cannot be negative");
        }

        Ok(Self {
            host: var("HACKHUB_HOST", "0.0.0.0"),
            port: var("HACKHUB_PORT", "3000")
                .parse()
                .context("HACKHUB_PORT must be a port number")?,
            db_path: var("HACKHUB_DB_PATH", "hackhub.db").into(),
            jwt_secret,
            token_ttl_days,
            seed_demo: matches!(
                var("HACKHUB_SEED_DEMO", "false").to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
            signup_credits,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}
