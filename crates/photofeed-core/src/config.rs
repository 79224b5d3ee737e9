//! Configuration module
//!
//! Environment-driven configuration for the API binary. Call
//! `Config::from_env()` after loading the dotenv file, then `validate()` to
//! fail fast on misconfiguration.

use std::env;

use anyhow::{bail, Context};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DETECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SMTP_PORT: u16 = 465;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub environment: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// External object-detection endpoint (multipart POST).
    pub detection_url: String,
    pub detection_timeout_secs: u64,
    /// Upper bound on the blob write + commit sequence per upload.
    pub storage_timeout_secs: u64,
    // SMTP / notification settings; absent as a group disables the notifier.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub from_email: Option<String>,
    /// Public base URL used to build links in notification mails.
    pub base_url: String,
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let detection_url =
            env::var("DETECTION_URL").context("DETECTION_URL must be set")?;

        let server_port = env_parsed("PORT", DEFAULT_PORT);
        let base_url = env_opt("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", server_port));

        Ok(Config {
            database_url,
            server_port,
            environment: env_opt("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
            db_max_connections: env_parsed("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            db_timeout_seconds: env_parsed("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS),
            detection_url,
            detection_timeout_secs: env_parsed(
                "DETECTION_TIMEOUT_SECS",
                DEFAULT_DETECTION_TIMEOUT_SECS,
            ),
            storage_timeout_secs: env_parsed(
                "STORAGE_TIMEOUT_SECS",
                DEFAULT_STORAGE_TIMEOUT_SECS,
            ),
            smtp_host: env_opt("SMTP_HOST"),
            smtp_port: env_parsed("SMTP_PORT", DEFAULT_SMTP_PORT),
            smtp_user: env_opt("SMTP_USER"),
            smtp_password: env_opt("SMTP_PASS"),
            from_email: env_opt("FROM_EMAIL"),
            base_url,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            bail!("DATABASE_URL must be a postgres connection string");
        }
        if !self.detection_url.starts_with("http://")
            && !self.detection_url.starts_with("https://")
        {
            bail!("DETECTION_URL must be an http(s) URL");
        }
        // SMTP settings come as a group: a host without a from-address (or the
        // reverse) is a misconfiguration rather than "notifier disabled".
        if self.smtp_host.is_some() != self.from_email.is_some() {
            bail!("SMTP_HOST and FROM_EMAIL must be set together");
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// SMTP is configured and the notifier should run.
    pub fn smtp_configured(&self) -> bool {
        self.smtp_host.is_some() && self.from_email.is_some()
    }
}
