/*
 * Responsibility
 * - URL layout of v1
 * - /health is public; everything merged from `protected` sits behind the JWT guard
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, me::me};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/me", get(me));
    let protected = middleware::auth::jwt::apply(protected, state);

    Router::new()
        .route("/health", get(health))
        .merge(protected)
}
