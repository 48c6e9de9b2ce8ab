//! Token extraction strategies.
//!
//! Each variant looks in exactly one request location. The value is returned as-is;
//! only `Bearer` strips its scheme prefix.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::services::auth::request::{AuthRequest, ParsedBody};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSource {
    /// `Authorization: Bearer <token>` (the key is ignored)
    Bearer,
    Cookie,
    /// Form body first, then JSON object body
    Body,
    Query,
    /// CGI-style server parameters
    Server,
}

impl TokenSource {
    pub fn extract(&self, request: &dyn AuthRequest, key: &str) -> Option<String> {
        match self {
            Self::Bearer => request
                .header("authorization")
                .first()
                .and_then(|value| value.strip_prefix(BEARER_PREFIX))
                .map(str::to_string),
            Self::Cookie => request.cookie_params().get(key).cloned(),
            Self::Body => match request.parsed_body() {
                ParsedBody::Form(map) => map.get(key).cloned(),
                ParsedBody::Object(map) => map
                    .get(key)
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                ParsedBody::None => None,
            },
            Self::Query => request.query_params().get(key).cloned(),
            Self::Server => request.server_params().get(key).cloned(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bearer => "bearer",
            Self::Cookie => "cookie",
            Self::Body => "body",
            Self::Query => "query",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown token source: {0}")]
pub struct UnknownTokenSource(pub String);

impl FromStr for TokenSource {
    type Err = UnknownTokenSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(Self::Bearer),
            "cookie" => Ok(Self::Cookie),
            "body" => Ok(Self::Body),
            "query" => Ok(Self::Query),
            "server" => Ok(Self::Server),
            _ => Err(UnknownTokenSource(s.to_string())),
        }
    }
}
