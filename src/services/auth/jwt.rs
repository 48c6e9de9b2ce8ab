use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("jwt secret must not be empty")]
    EmptySecret,
    #[error("failed to sign jwt: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Shared HMAC secret.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone, PartialEq, Eq)]
pub struct JwtSecret(String);

impl JwtSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, JwtError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret(**redacted**)")
    }
}

/// Decoded JWT payload.
///
/// Kept as a raw JSON object: callers decide which claims they care about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn exp(&self) -> Option<&Value> {
        self.get("exp")
    }

    pub fn nbf(&self) -> Option<&Value> {
        self.get("nbf")
    }

    pub fn iss(&self) -> Option<&str> {
        self.get("iss").and_then(Value::as_str)
    }

    pub fn sub(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }
}

/// HMAC (HS256/384/512) encode/decode primitive.
///
/// `decode` only checks structure and signature. Temporal claims (`exp`, `nbf`) are
/// left to the caller so their checks can run in a fixed order.
#[derive(Debug, Clone)]
pub struct JwtCodec {
    validation: Validation,
}

impl Default for JwtCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl JwtCodec {
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self { validation }
    }

    pub fn decode(
        &self,
        token: &str,
        secret: &JwtSecret,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let data = jsonwebtoken::decode::<Claims>(token, &key, &self.validation)?;
        Ok(data.claims)
    }

    pub fn encode(claims: &Claims, secret: &JwtSecret) -> Result<String, JwtError> {
        Self::encode_with(Algorithm::HS256, claims, secret)
    }

    pub fn encode_with(
        algorithm: Algorithm,
        claims: &Claims,
        secret: &JwtSecret,
    ) -> Result<String, JwtError> {
        let mut header = Header::new(algorithm);
        header.typ = Some("JWT".to_string());
        let key = EncodingKey::from_secret(secret.as_bytes());
        jsonwebtoken::encode(&header, claims, &key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            JwtError::Encode(e)
        })
    }
}
