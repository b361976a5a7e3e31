use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// User Router Module
///
/// Endpoints under the default user prefixes. The gate only forwards requests that the
/// rights oracle grants user rights, so the `AuthUser` extractor in the handlers resolves.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/repo", get(handlers::who_am_i))
        .route("/repo/{*rest}", get(handlers::who_am_i))
        .route("/data", get(handlers::who_am_i))
        .route("/data/{*rest}", get(handlers::who_am_i))
}
