/*
 * Responsibility
 * - GET /me: echo the claims of the authenticated token
 * - Only reachable once the guard has let the request through
 */
use axum::Json;

use crate::api::v1::extractors::AuthClaims;
use crate::services::auth::Claims;

pub async fn me(AuthClaims(claims): AuthClaims) -> Json<Claims> {
    Json(claims)
}
