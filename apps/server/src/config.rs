use std::{net::SocketAddr, time::Duration};

use anyhow::{bail, Context};

use crate::auth::decode_secret_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub jwt_secret: Vec<u8>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, applying defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("CP_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid CP_LISTEN_ADDR")?;
        let db_path = lookup("CP_DB_PATH").unwrap_or_else(|| "./db/commipay.db".into());
        let cors_allow = lookup("CP_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = lookup("CP_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .context("Invalid CP_REQUEST_TIMEOUT_MS")?;
        let raw_secret = lookup("CP_JWT_SECRET").context("CP_JWT_SECRET must be set")?;
        let jwt_secret = decode_secret_key(&raw_secret).context("Invalid CP_JWT_SECRET")?;
        let log_format = match lookup("CP_LOG_FORMAT") {
            None => LogFormat::Text,
            Some(value) if value.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(other) => bail!("Invalid CP_LOG_FORMAT '{other}', expected text or json"),
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            jwt_secret,
            log_format,
        })
    }
}
