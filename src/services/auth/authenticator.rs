/*
 * Responsibility
 * - resolve -> validate -> decision
 * - "no token" is plain data (TokenNotFound), the validator is never called for it
 * - No per-request state: one instance is shared by every request
 */
use crate::services::auth::decision::AuthDecision;
use crate::services::auth::jwt::{Claims, JwtSecret};
use crate::services::auth::request::AuthRequest;
use crate::services::auth::resolver::TokenResolver;
use crate::services::auth::validator::{TokenValidator, ValidationOutcome};

#[derive(Debug, Clone)]
pub struct Authenticator {
    resolver: TokenResolver,
    validator: TokenValidator,
    secret: JwtSecret,
}

impl Authenticator {
    pub fn new(resolver: TokenResolver, validator: TokenValidator, secret: JwtSecret) -> Self {
        Self {
            resolver,
            validator,
            secret,
        }
    }

    pub fn resolver(&self) -> &TokenResolver {
        &self.resolver
    }

    pub fn authenticate(&self, request: &dyn AuthRequest) -> AuthDecision {
        let outcome = match self.authenticate_claims(request) {
            Ok(_) => ValidationOutcome::Valid,
            Err(outcome) => outcome,
        };
        AuthDecision::from_outcome(outcome)
    }

    pub fn authenticate_claims(&self, request: &dyn AuthRequest) -> Result<Claims, ValidationOutcome> {
        let token = self
            .resolver
            .resolve(request)
            .ok_or(ValidationOutcome::TokenNotFound)?;

        self.validator.verify(&token, &self.secret)
    }
}
