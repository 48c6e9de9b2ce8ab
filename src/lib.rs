//! JWT request authentication for axum services.
//!
//! A token is looked up across request locations (bearer header, cookie, body,
//! query, server params) in a configured order, validated (structure, signature,
//! `exp`, `nbf`) and turned into a pass / 400 / 401 decision.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
