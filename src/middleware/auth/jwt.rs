//! JWT guard middleware.
//!
//! Resolves the token from the configured sources, validates it and either:
//! - inserts the decoded `Claims` into request extensions and calls the next service, or
//! - returns the rendered failure response (400 / 401) without calling it.

use axum::{
    Router,
    body::{self, Body},
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use http_body_util::LengthLimitError;

use crate::error::AppError;
use crate::services::auth::{RequestSnapshot, Verdict};
use crate::state::AppState;

/// Put the JWT guard in front of every route of `router`.
///
/// ```ignore
/// let protected = Router::new().route("/me", get(me));
/// let protected = middleware::auth::jwt::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8: State has to be handed in explicitly via `from_fn_with_state`
    router.layer(middleware::from_fn_with_state(state, jwt_middleware))
}

async fn jwt_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();

    let (snapshot, body) = if state.needs_body() {
        let bytes = body::to_bytes(body, state.body_limit).await.map_err(|err| {
            if exceeds_limit(&err) {
                return AppError::PayloadTooLarge;
            }
            tracing::warn!(error = %err, "failed to buffer request body for token lookup");
            AppError::bad_request("INVALID_BODY", "request body could not be read")
        })?;
        let snapshot = RequestSnapshot::from_parts(&parts, &bytes);
        (snapshot, Body::from(bytes))
    } else {
        (RequestSnapshot::from_parts(&parts, &[]), body)
    };

    match state.guard.handle(&snapshot) {
        Verdict::Proceed(claims) => {
            let mut req = Request::from_parts(parts, body);
            // middleware -> extractor
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Verdict::Reject(rendered) => Ok(rendered.into_response()),
    }
}

// Without Content-Length the limit trips while reading, possibly inside the
// RequestBodyLimitLayer body, so the error can be nested.
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
