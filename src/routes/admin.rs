use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Endpoints under the default admin prefix. Only requests with admin rights get here.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/rules
        // The path policy currently being enforced.
        .route("/rules", get(handlers::get_rules))
        // GET /admin/users/{id}
        .route("/users/{id}", get(handlers::get_user))
}
