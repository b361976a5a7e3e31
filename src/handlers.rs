use crate::{
    AppState,
    auth::{AuthUser, issue_token},
    config::Env,
    gate::Permissions,
    models::{LoginRequest, ROLE_USER, RegisterUserRequest, TokenResponse, User, WhoAmI},
    rules::PathRuleSet,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, Uri},
};
use uuid::Uuid;

/// Lifetime of tokens handed out by POST /login.
const SESSION_TTL_SECS: u64 = 3600;

// --- Public ---

/// index
///
/// [Public Route] Landing page. Reachable by anyone through the root override.
pub async fn index() -> &'static str {
    "permission-gate is running"
}

pub async fn robots() -> &'static str {
    "User-agent: *\nDisallow: /admin\n"
}

/// login
///
/// [Public Route] Issues a session token for an existing user, without credentials.
/// Only served in `Env::Local`; elsewhere the route answers `404 Not Found`.
/// Unknown ids get `401 Unauthorized`.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, StatusCode> {
    if state.config.env != Env::Local {
        return Err(StatusCode::NOT_FOUND);
    }

    let user = state
        .directory
        .get_user(payload.user_id)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = issue_token(user.id, &state.config.jwt_secret, SESSION_TTL_SECS).map_err(|e| {
        tracing::error!("failed to sign session token: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!(user_id = %user.id, "session issued");
    Ok(Json(TokenResponse { token }))
}

/// register
///
/// [Public Route] Creates a new account with the `user` role.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), StatusCode> {
    if payload.email.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let user = User {
        id: Uuid::new_v4(),
        email: payload.email,
        role: ROLE_USER.to_string(),
    };

    match state.directory.create_user(user).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "user registered");
            Ok((StatusCode::CREATED, Json(user)))
        }
        Err(e) => {
            tracing::error!("registration failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// --- User ---

/// who_am_i
///
/// [User Route] Echoes the resolved identity and the path that was reached.
pub async fn who_am_i(user: AuthUser, uri: Uri) -> Json<WhoAmI> {
    Json(WhoAmI {
        id: user.id,
        email: user.email,
        role: user.role,
        path: uri.path().to_string(),
    })
}

// --- Admin ---

/// get_user
///
/// [Admin Route] Looks up any account by id.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, StatusCode> {
    state
        .directory
        .get_user(id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// get_rules
///
/// [Admin Route] Snapshot of the policy the gate is currently enforcing.
pub async fn get_rules(State(permissions): State<Permissions>) -> Json<PathRuleSet> {
    Json(permissions.rules())
}
