//! Token validation state machine.
//!
//! Steps run in a fixed order and stop at the first failure:
//! decode/signature -> `exp` -> `nbf`.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::Algorithm;
use jsonwebtoken::errors::ErrorKind;
use serde_json::Value;

use crate::services::auth::jwt::{Claims, JwtCodec, JwtSecret};

/// Closed set of authentication outcomes.
///
/// Codes are stable and meant for logs / diagnostics; the HTTP mapping lives in
/// `AuthDecision`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationOutcome {
    Valid,
    Malformed,
    InvalidSignature,
    Expired,
    NotYetValid,
    Undecodable,
    TokenNotFound,
}

impl ValidationOutcome {
    pub fn code(&self) -> u8 {
        match self {
            Self::Valid => 0,
            Self::Malformed => 1,
            Self::InvalidSignature => 2,
            Self::Expired => 3,
            Self::NotYetValid => 4,
            Self::Undecodable => 5,
            Self::TokenNotFound => 11,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Valid => "Ok",
            Self::Malformed => "Token is invalid.",
            Self::InvalidSignature => "Signature is invalid.",
            Self::Expired => "Token has expired.",
            Self::NotYetValid => "Token is not yet valid.",
            Self::Undecodable => "Token could not be decoded.",
            Self::TokenNotFound => "JSON Web Token not set.",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Valid)
    }

    fn from_jwt_error(kind: &ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => {
                Self::Malformed
            }
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            _ => Self::Undecodable,
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenValidator {
    codec: JwtCodec,
}

impl TokenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self, token: &str, secret: &JwtSecret) -> ValidationOutcome {
        self.validate_at(token, secret, Utc::now().timestamp())
    }

    /// `now` is unix seconds.
    pub fn validate_at(&self, token: &str, secret: &JwtSecret, now: i64) -> ValidationOutcome {
        match self.verify_at(token, secret, now) {
            Ok(_) => ValidationOutcome::Valid,
            Err(outcome) => outcome,
        }
    }

    pub fn verify(&self, token: &str, secret: &JwtSecret) -> Result<Claims, ValidationOutcome> {
        self.verify_at(token, secret, Utc::now().timestamp())
    }

    /// Like `validate_at`, but hands back the claims on success.
    pub fn verify_at(
        &self,
        token: &str,
        secret: &JwtSecret,
        now: i64,
    ) -> Result<Claims, ValidationOutcome> {
        let claims = self
            .codec
            .decode(token, secret)
            .map_err(|e| match e.kind() {
                // jsonwebtoken rejects unknown `alg` names while parsing the header
                ErrorKind::Json(_) if has_unknown_alg(token) => ValidationOutcome::Undecodable,
                kind => ValidationOutcome::from_jwt_error(kind),
            })?;

        if let Some(exp) = claims.exp() {
            let exp = numeric_date(exp).ok_or(ValidationOutcome::Malformed)?;
            if now as f64 >= exp {
                return Err(ValidationOutcome::Expired);
            }
        }

        if let Some(nbf) = claims.nbf() {
            let nbf = numeric_date(nbf).ok_or(ValidationOutcome::Malformed)?;
            if (now as f64) < nbf {
                return Err(ValidationOutcome::NotYetValid);
            }
        }

        Ok(claims)
    }
}

// Header is a JSON object whose `alg` is a string jsonwebtoken has no variant for.
fn has_unknown_alg(token: &str) -> bool {
    let Some(header) = token.split('.').next() else {
        return false;
    };
    URL_SAFE_NO_PAD
        .decode(header)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
        .and_then(|header| {
            header
                .get("alg")
                .and_then(Value::as_str)
                .map(|alg| alg.parse::<Algorithm>().is_err())
        })
        .unwrap_or(false)
}

// RFC 7519 NumericDate: seconds, possibly fractional.
fn numeric_date(value: &Value) -> Option<f64> {
    value.as_f64()
}
