/*
 * Responsibility
 * - Read-only view over the five places a token can live (header / cookie / body / query / server)
 * - Building that view from an axum request (parts + buffered body)
 * - TokenSource only talks to the `AuthRequest` trait, never to axum directly
 */
use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{header, request::Parts};
use url::form_urlencoded;

/// Parsed request body.
///
/// `Form` is a flat key/value body (urlencoded form), `Object` is a JSON object body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ParsedBody {
    #[default]
    None,
    Form(HashMap<String, String>),
    Object(serde_json::Map<String, serde_json::Value>),
}

/// Lookups a token source may perform against an inbound request.
pub trait AuthRequest {
    /// All values for a header. Header names are case-insensitive.
    fn header(&self, name: &str) -> Vec<&str>;
    fn cookie_params(&self) -> &HashMap<String, String>;
    fn parsed_body(&self) -> &ParsedBody;
    fn query_params(&self) -> &HashMap<String, String>;
    fn server_params(&self) -> &HashMap<String, String>;
}

/// Owned snapshot of a request, taken once per request before token resolution.
#[derive(Debug, Clone, Default)]
pub struct RequestSnapshot {
    headers: Vec<(String, String)>,
    cookies: HashMap<String, String>,
    body: ParsedBody,
    query: HashMap<String, String>,
    server: HashMap<String, String>,
}

impl RequestSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from request parts and the already-buffered body bytes.
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let headers: Vec<(String, String)> = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let mut cookies = HashMap::new();
        for value in parts.headers.get_all(header::COOKIE) {
            if let Ok(raw) = value.to_str() {
                parse_cookie_header(raw, &mut cookies);
            }
        }

        let query = parts
            .uri
            .query()
            .map(parse_urlencoded)
            .unwrap_or_default();

        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let body = parse_body(content_type, body);

        let mut server = HashMap::new();
        server.insert("REQUEST_METHOD".to_string(), parts.method.to_string());
        server.insert(
            "REQUEST_URI".to_string(),
            parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| parts.uri.path().to_string()),
        );
        server.insert(
            "QUERY_STRING".to_string(),
            parts.uri.query().unwrap_or_default().to_string(),
        );
        server.insert(
            "SERVER_PROTOCOL".to_string(),
            format!("{:?}", parts.version),
        );
        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            server.insert("REMOTE_ADDR".to_string(), addr.ip().to_string());
        }
        for (name, value) in &headers {
            server
                .entry(cgi_header_key(name))
                .or_insert_with(|| value.clone());
        }

        Self {
            headers,
            cookies,
            body,
            query,
            server,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: ParsedBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_server_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.server.insert(name.into(), value.into());
        self
    }
}

impl AuthRequest for RequestSnapshot {
    fn header(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn cookie_params(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    fn parsed_body(&self) -> &ParsedBody {
        &self.body
    }

    fn query_params(&self) -> &HashMap<String, String> {
        &self.query
    }

    fn server_params(&self) -> &HashMap<String, String> {
        &self.server
    }
}

// `a=1; b=2`. The first occurrence of a name wins.
fn parse_cookie_header(raw: &str, out: &mut HashMap<String, String>) {
    for pair in raw.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        out.entry(name.to_string())
            .or_insert_with(|| value.to_string());
    }
}

fn parse_urlencoded(raw: &str) -> HashMap<String, String> {
    form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

fn parse_body(content_type: &str, bytes: &[u8]) -> ParsedBody {
    if bytes.is_empty() {
        return ParsedBody::None;
    }

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/x-www-form-urlencoded" => {
            ParsedBody::Form(form_urlencoded::parse(bytes).into_owned().collect())
        }
        "application/json" => match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(serde_json::Value::Object(map)) => ParsedBody::Object(map),
            _ => ParsedBody::None,
        },
        _ => ParsedBody::None,
    }
}

// `x-forwarded-for` -> `HTTP_X_FORWARDED_FOR`
fn cgi_header_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 5);
    key.push_str("HTTP_");
    for c in name.chars() {
        key.push(if c == '-' { '_' } else { c.to_ascii_uppercase() });
    }
    key
}
