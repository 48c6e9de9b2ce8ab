/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Clone is cheap (everything behind Arc); nothing in here is mutated per request
 */
use std::sync::Arc;

use crate::services::auth::AuthGuard;

#[derive(Clone, Debug)]
pub struct AppState {
    pub guard: Arc<AuthGuard>,
    pub body_limit: usize,
}

impl AppState {
    pub fn new(guard: Arc<AuthGuard>, body_limit: usize) -> Self {
        Self { guard, body_limit }
    }

    /// Body sources need the buffered body; everything else can stream through.
    pub fn needs_body(&self) -> bool {
        self.guard.needs_body()
    }
}
