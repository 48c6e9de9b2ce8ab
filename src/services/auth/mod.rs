pub mod authenticator;
pub mod decision;
pub mod factory;
pub mod jwt;
pub mod render;
pub mod request;
pub mod resolver;
pub mod source;
pub mod validator;

pub use authenticator::Authenticator;
pub use decision::AuthDecision;
pub use factory::build_auth_guard;
pub use jwt::{Claims, JwtCodec, JwtError, JwtSecret};
pub use render::{AuthGuard, FailureRenderer, Html, Json, PlainText, RenderedResponse, Verdict};
pub use request::{AuthRequest, ParsedBody, RequestSnapshot};
pub use resolver::TokenResolver;
pub use source::TokenSource;
pub use validator::{TokenValidator, ValidationOutcome};
