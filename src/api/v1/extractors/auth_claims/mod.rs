/*!
 * Authenticated claims extractor
 *
 * Responsibility:
 * - Hand the claims verified by the JWT guard to handlers
 * - The guard stores `Claims` in request extensions; this only reads them back
 */

mod core;

pub use self::core::AuthClaims;
