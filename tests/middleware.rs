#![allow(clippy::expect_used)]

//! End-to-end checks of the JWT guard through the real router and middleware stack.

use std::collections::HashMap;

use anyhow::Result;
use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::Utc;
use jwt_gate::app::build_router;
use jwt_gate::config::Config;
use jwt_gate::services::auth::render::REASON_HEADER;
use jwt_gate::services::auth::{Claims, JwtCodec, JwtSecret};
use tower::ServiceExt;

const SECRET: &str = "Secret123!456$";

fn app(vars: &[(&str, &str)]) -> Router {
    let mut env: HashMap<String, String> = HashMap::from([
        ("JWT_SECRET".to_string(), SECRET.to_string()),
        ("JWT_TOKEN_KEY".to_string(), "jwt".to_string()),
    ]);
    for (k, v) in vars {
        env.insert(k.to_string(), v.to_string());
    }

    let config = Config::from_lookup(|key| env.get(key).cloned()).expect("config");
    let state = jwt_gate::app::build_state(&config);
    build_router(state, &config)
}

fn issue(claims: Claims, secret: &str) -> String {
    let secret = JwtSecret::new(secret).expect("non-empty secret");
    JwtCodec::encode(&claims, &secret).expect("encode")
}

fn localhost_token() -> String {
    issue(Claims::new().with("iss", "localhost"), SECRET)
}

fn reason(res: &Response) -> Option<&str> {
    res.headers().get(REASON_HEADER).and_then(|v| v.to_str().ok())
}

async fn body_string(res: Response) -> Result<String> {
    let bytes = body::to_bytes(res.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn health_is_public() -> Result<()> {
    let res = app(&[])
        .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty())?)
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn token_in_query_passes_through_to_handler() -> Result<()> {
    let token = localhost_token();
    let res = app(&[])
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/me?jwt={token}"))
                .header(header::COOKIE, "foo=bar")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("x-request-id").is_some());
    let claims: serde_json::Value = serde_json::from_str(&body_string(res).await?)?;
    assert_eq!(claims["iss"], "localhost");
    Ok(())
}

#[tokio::test]
async fn missing_token_is_bad_request_with_configured_body() -> Result<()> {
    let token = localhost_token();
    let res = app(&[
        ("JWT_TOKEN_KEY", ""),
        ("AUTH_FAILURE_FORMAT", "json"),
        ("AUTH_FAILURE_BODY", r#"{"message":"denied"}"#),
    ])
    .oneshot(
        Request::builder()
            .uri(format!("/api/v1/me?jwt={token}"))
            .body(Body::empty())?,
    )
    .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(reason(&res), Some("Bad Request: JSON Web Token not set."));
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    assert_eq!(body_string(res).await?, r#"{"message":"denied"}"#);
    Ok(())
}

#[tokio::test]
async fn wrong_secret_is_unauthorized() -> Result<()> {
    let token = issue(Claims::new().with("iss", "localhost"), "1Secret23!456$");
    let res = app(&[
        ("JWT_TOKEN_KEY", "foo"),
        ("AUTH_FAILURE_FORMAT", "html"),
        ("AUTH_FAILURE_BODY", "<h1>Fail!</h1>"),
    ])
    .oneshot(
        Request::builder()
            .uri("/api/v1/me")
            .header(header::COOKIE, format!("foo={token}"))
            .body(Body::empty())?,
    )
    .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(reason(&res), Some("Unauthorized: Signature is invalid."));
    assert_eq!(body_string(res).await?, "<h1>Fail!</h1>");
    Ok(())
}

#[tokio::test]
async fn expired_bearer_token_is_unauthorized() -> Result<()> {
    let token = issue(
        Claims::new().with("exp", Utc::now().timestamp() - 60),
        SECRET,
    );
    let res = app(&[("AUTH_FAILURE_FORMAT", "plain")])
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(res).await?, "Unauthorized: Token has expired.");
    Ok(())
}

#[tokio::test]
async fn not_yet_valid_token_is_unauthorized() -> Result<()> {
    let token = issue(
        Claims::new().with("nbf", Utc::now().timestamp() + 3600),
        SECRET,
    );
    let res = app(&[("AUTH_FAILURE_FORMAT", "plain")])
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/me?jwt={token}"))
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(reason(&res), Some("Unauthorized: Token is not yet valid."));
    Ok(())
}

#[tokio::test]
async fn token_in_json_body_is_found_and_body_is_kept() -> Result<()> {
    let token = localhost_token();
    let res = app(&[])
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/me")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::json!({ "jwt": token }).to_string()))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn body_is_ignored_when_not_a_configured_source() -> Result<()> {
    let token = localhost_token();
    let res = app(&[("JWT_TOKEN_SOURCES", "bearer,query")])
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/me")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("jwt={token}")))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn server_source_reads_cgi_header_params() -> Result<()> {
    let token = localhost_token();
    let res = app(&[
        ("JWT_TOKEN_SOURCES", "server"),
        ("JWT_TOKEN_KEY", "HTTP_X_JWT"),
    ])
    .oneshot(
        Request::builder()
            .uri("/api/v1/me")
            .header("x-jwt", token)
            .body(Body::empty())?,
    )
    .await?;

    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn source_order_decides_which_token_is_used() -> Result<()> {
    let good = localhost_token();
    let bad = issue(Claims::new(), "someone-else");

    // cookie first: the bad cookie token shadows the good query token
    let res = app(&[("JWT_TOKEN_SOURCES", "cookie,query")])
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/me?jwt={good}"))
                .header(header::COOKIE, format!("jwt={bad}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // query first: the good token wins
    let res = app(&[("JWT_TOKEN_SOURCES", "query,cookie")])
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/me?jwt={good}"))
                .header(header::COOKIE, format!("jwt={bad}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_payload_too_large_without_content_length() -> Result<()> {
    let body = serde_json::json!({ "jwt": localhost_token() }).to_string();
    let res = app(&[("REQUEST_BODY_LIMIT_BYTES", "16")])
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_payload_too_large_with_content_length() -> Result<()> {
    let body = serde_json::json!({ "jwt": localhost_token() }).to_string();
    let res = app(&[("REQUEST_BODY_LIMIT_BYTES", "16")])
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, body.len())
                .body(Body::from(body))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}
