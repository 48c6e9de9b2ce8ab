use crate::services::auth::validator::ValidationOutcome;

/// HTTP-facing result of one authentication attempt.
///
/// `code` is always 200, 400 or 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub code: u16,
    pub message: String,
}

impl AuthDecision {
    pub fn from_outcome(outcome: ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Valid => Self {
                code: 200,
                message: "Ok".to_string(),
            },
            ValidationOutcome::TokenNotFound => Self {
                code: 400,
                message: format!("Bad Request: {}", outcome.message()),
            },
            ValidationOutcome::Malformed
            | ValidationOutcome::InvalidSignature
            | ValidationOutcome::Expired
            | ValidationOutcome::NotYetValid
            | ValidationOutcome::Undecodable => Self {
                code: 401,
                message: format!("Unauthorized: {}", outcome.message()),
            },
        }
    }
}

impl From<ValidationOutcome> for AuthDecision {
    fn from(outcome: ValidationOutcome) -> Self {
        Self::from_outcome(outcome)
    }
}
