/*
 * Responsibility
 * - Domain logic that does not depend on routing (token lookup / validation / rendering)
 */
pub mod auth;
