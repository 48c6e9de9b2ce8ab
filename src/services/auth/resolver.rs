use tracing::debug;

use crate::services::auth::request::AuthRequest;
use crate::services::auth::source::TokenSource;

/// Ordered chain of token sources sharing one lookup key.
///
/// Insertion order is priority order. The first source that yields a non-empty
/// value wins; later sources are not consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResolver {
    key: String,
    sources: Vec<TokenSource>,
}

impl TokenResolver {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sources: Vec::new(),
        }
    }

    /// Bearer header, cookie, body, query.
    pub fn with_default_sources(key: impl Into<String>) -> Self {
        Self::new(key)
            .with_source(TokenSource::Bearer)
            .with_source(TokenSource::Cookie)
            .with_source(TokenSource::Body)
            .with_source(TokenSource::Query)
    }

    pub fn add_source(&mut self, source: TokenSource) -> &mut Self {
        self.sources.push(source);
        self
    }

    pub fn with_source(mut self, source: TokenSource) -> Self {
        self.add_source(source);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn sources(&self) -> &[TokenSource] {
        &self.sources
    }

    pub fn resolve(&self, request: &dyn AuthRequest) -> Option<String> {
        self.sources.iter().find_map(|source| {
            let token = source
                .extract(request, &self.key)
                .filter(|token| !token.is_empty())?;
            debug!(source = %source, key = %self.key, "token resolved");
            Some(token)
        })
    }
}
