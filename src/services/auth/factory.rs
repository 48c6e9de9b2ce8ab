/// Factory: build the request guard from application `Config`.
use std::sync::Arc;

use crate::config::{Config, FailureFormat};
use crate::services::auth::{
    AuthGuard, Authenticator, FailureRenderer, Html, Json, PlainText, TokenResolver,
    TokenValidator,
};

pub fn build_auth_guard(config: &Config) -> Arc<AuthGuard> {
    let mut resolver = TokenResolver::new(config.token_key.clone());
    for source in &config.token_sources {
        resolver.add_source(*source);
    }

    let authenticator = Authenticator::new(resolver, TokenValidator::new(), config.jwt_secret.clone());

    let renderer: Arc<dyn FailureRenderer> = match &config.failure_format {
        FailureFormat::Plain => Arc::new(PlainText),
        FailureFormat::Html(body) => Arc::new(Html::new(body.clone())),
        FailureFormat::Json(body) => Arc::new(Json::new(body)),
    };

    Arc::new(AuthGuard::new(Arc::new(authenticator), renderer))
}
