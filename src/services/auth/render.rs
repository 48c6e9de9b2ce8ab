//! Failure rendering and the request-level guard.
//!
//! The renderer is chosen at startup (plain / html / json) and only ever runs on
//! the failure path. A successful decision turns into `Verdict::Proceed`.

use std::sync::Arc;

use axum::{
    http::{HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::services::auth::authenticator::Authenticator;
use crate::services::auth::decision::AuthDecision;
use crate::services::auth::jwt::Claims;
use crate::services::auth::request::AuthRequest;
use crate::services::auth::source::TokenSource;

/// Carries the decision message, since HTTP/2 has no reason phrase.
pub const REASON_HEADER: HeaderName = HeaderName::from_static("x-auth-reason");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub status_code: u16,
    pub reason_phrase: String,
    pub content_type: &'static str,
    pub body: String,
}

impl IntoResponse for RenderedResponse {
    fn into_response(self) -> Response {
        let status = axum::http::StatusCode::from_u16(self.status_code)
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, self.body).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.content_type),
        );
        // reason phrases are ASCII in practice; drop the header rather than fail
        if let Ok(reason) = HeaderValue::from_str(&self.reason_phrase) {
            headers.insert(REASON_HEADER, reason);
        }
        response
    }
}

pub trait FailureRenderer: Send + Sync {
    fn render(&self, decision: &AuthDecision) -> RenderedResponse;
}

/// Body is the decision message itself.
#[derive(Debug, Clone, Default)]
pub struct PlainText;

impl FailureRenderer for PlainText {
    fn render(&self, decision: &AuthDecision) -> RenderedResponse {
        RenderedResponse {
            status_code: decision.code,
            reason_phrase: decision.message.clone(),
            content_type: "text/plain; charset=utf-8",
            body: decision.message.clone(),
        }
    }
}

/// Fixed HTML body, independent of the decision.
#[derive(Debug, Clone)]
pub struct Html {
    body: String,
}

impl Html {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl FailureRenderer for Html {
    fn render(&self, decision: &AuthDecision) -> RenderedResponse {
        RenderedResponse {
            status_code: decision.code,
            reason_phrase: decision.message.clone(),
            content_type: "text/html",
            body: self.body.clone(),
        }
    }
}

/// Fixed JSON body, independent of the decision.
#[derive(Debug, Clone)]
pub struct Json {
    body: String,
}

impl Json {
    pub fn new(body: &serde_json::Value) -> Self {
        Self {
            body: body.to_string(),
        }
    }
}

impl FailureRenderer for Json {
    fn render(&self, decision: &AuthDecision) -> RenderedResponse {
        RenderedResponse {
            status_code: decision.code,
            reason_phrase: decision.message.clone(),
            content_type: "application/json",
            body: self.body.clone(),
        }
    }
}

#[derive(Debug)]
pub enum Verdict {
    /// Authenticated; hand the request to the next stage.
    Proceed(Claims),
    Reject(RenderedResponse),
}

#[derive(Clone)]
pub struct AuthGuard {
    authenticator: Arc<Authenticator>,
    renderer: Arc<dyn FailureRenderer>,
}

impl std::fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGuard")
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

impl AuthGuard {
    pub fn new(authenticator: Arc<Authenticator>, renderer: Arc<dyn FailureRenderer>) -> Self {
        Self {
            authenticator,
            renderer,
        }
    }

    pub fn needs_body(&self) -> bool {
        self.authenticator
            .resolver()
            .sources()
            .contains(&TokenSource::Body)
    }

    pub fn handle(&self, request: &dyn AuthRequest) -> Verdict {
        match self.authenticator.authenticate_claims(request) {
            Ok(claims) => Verdict::Proceed(claims),
            Err(outcome) => {
                let decision = AuthDecision::from_outcome(outcome);
                let resolver = self.authenticator.resolver();
                warn!(
                    outcome = outcome.code(),
                    status = decision.code,
                    reason = %decision.message,
                    key = %resolver.key(),
                    sources = ?resolver.sources(),
                    "jwt authentication failed"
                );
                Verdict::Reject(self.renderer.render(&decision))
            }
        }
    }
}
