use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints matched by the default public prefixes. The gate lets these through without
/// asking the rights oracle anything.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Always reachable while the root override is on.
        .route("/", get(handlers::index))
        // POST /login
        // Exchanges a known user id for a session token.
        .route("/login", post(handlers::login))
        // POST /register
        // Creates an account with the 'user' role.
        .route("/register", post(handlers::register))
        .route("/robots.txt", get(handlers::robots))
}
