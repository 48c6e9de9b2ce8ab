/*
 * Responsibility
 * - Public entry points for middleware (re-export)
 * - http::apply (transport concerns), auth::jwt::apply (token guard)
 */
pub mod auth;
pub mod http;
