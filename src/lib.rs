use axum::{Router, extract::FromRef, http::HeaderName, middleware};

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// The gate itself: rule table, rights contract, decision and middleware.
pub mod gate;
pub mod oracle;
pub mod rules;

// User state behind the rights oracle.
pub mod auth;
pub mod directory;

pub mod config;
pub mod handlers;
pub mod models;

// Demo site routes, grouped by the access the default policy gives them.
pub mod routes;
use routes::{admin, public, user};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use directory::{DirectoryState, InMemoryUserDirectory, PostgresUserDirectory};
pub use gate::{DenyFunction, Permissions, permission_denied, permissions_middleware};
pub use oracle::{OracleState, RightsOracle, StaticRightsOracle};
pub use rules::{Access, PathRuleSet};

/// AppState
///
/// Shared state for every request: the user directory, the loaded configuration and the
/// gate guarding the site.
#[derive(Clone)]
pub struct AppState {
    pub directory: DirectoryState,
    pub config: AppConfig,
    pub permissions: Permissions,
}

impl AppState {
    /// new
    ///
    /// Builds a gate whose rights oracle resolves users from session tokens against
    /// `directory`, using the path policy described by `config.gate`.
    pub fn new(directory: DirectoryState, config: AppConfig) -> Self {
        let oracle: OracleState = std::sync::Arc::new(auth::UserStateOracle::new(
            directory.clone(),
            config.clone(),
        ));
        let permissions = Permissions::with_rules(oracle, config.gate.rules());
        Self {
            directory,
            config,
            permissions,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for DirectoryState {
    fn from_ref(app_state: &AppState) -> DirectoryState {
        app_state.directory.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for Permissions {
    fn from_ref(app_state: &AppState) -> Permissions {
        app_state.permissions.clone()
    }
}

/// create_router
///
/// Assembles the site and puts the gate in front of all of it. The gate is applied with
/// `layer`, not `route_layer`, so paths without a route are still decided by the policy.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(public::public_routes())
        .merge(user::user_routes())
        .nest("/admin", admin::admin_routes())
        .layer(middleware::from_fn_with_state(
            state.permissions.clone(),
            permissions_middleware,
        ))
        .with_state(state);

    // Observability layers sit outside the gate so denied requests are traced too.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying method, uri and the `x-request-id` header, so every
/// log line of a request (including the gate's denial) can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
