/*
 * Responsibility
 * - Read environment / .env (secret, token key, source order, failure format)
 * - Validate values up front (missing or broken config fails startup)
 */
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::services::auth::{JwtSecret, TokenSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// How a rejected request is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureFormat {
    Plain,
    Html(String),
    Json(serde_json::Value),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub jwt_secret: JwtSecret,
    pub token_key: String,
    pub token_sources: Vec<TokenSource>,
    pub failure_format: FailureFormat,

    pub request_body_limit_bytes: usize,
    pub request_timeout_seconds: u64,
}

const DEFAULT_SOURCES: &str = "bearer,cookie,body,query";
const DEFAULT_JSON_BODY: &str = r#"{"error":"unauthorized"}"#;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let jwt_secret = JwtSecret::new(jwt_secret).map_err(|_| ConfigError::Invalid("JWT_SECRET"))?;

        let token_key = lookup("JWT_TOKEN_KEY").unwrap_or_else(|| "jwt".to_string());

        let token_sources = lookup("JWT_TOKEN_SOURCES")
            .unwrap_or_else(|| DEFAULT_SOURCES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(TokenSource::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::Invalid("JWT_TOKEN_SOURCES"))?;

        let failure_body = lookup("AUTH_FAILURE_BODY");
        let failure_format = match lookup("AUTH_FAILURE_FORMAT")
            .unwrap_or_else(|| "json".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "plain" | "text" => FailureFormat::Plain,
            "html" => FailureFormat::Html(failure_body.unwrap_or_default()),
            "json" => {
                let raw = failure_body.unwrap_or_else(|| DEFAULT_JSON_BODY.to_string());
                let body = serde_json::from_str(&raw)
                    .map_err(|_| ConfigError::Invalid("AUTH_FAILURE_BODY"))?;
                FailureFormat::Json(body)
            }
            _ => return Err(ConfigError::Invalid("AUTH_FAILURE_FORMAT")),
        };

        let request_body_limit_bytes = lookup("REQUEST_BODY_LIMIT_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let request_timeout_seconds = lookup("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            addr,
            app_env,
            jwt_secret,
            token_key,
            token_sources,
            failure_format,
            request_body_limit_bytes,
            request_timeout_seconds,
        })
    }
}
