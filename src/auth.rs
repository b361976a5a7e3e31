use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    directory::DirectoryState,
    oracle::RightsOracle,
};

/// Header accepted in `Env::Local` in place of a bearer token.
pub const LOCAL_USER_HEADER: &str = "x-user-id";

/// Claims
///
/// The payload of a session JWT. Signed with the configured secret and validated on every
/// request that needs user or admin rights.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id in the directory.
    pub sub: Uuid,
    /// Expiration Time (exp): the token is refused after this instant.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == crate::models::ROLE_ADMIN
    }
}

/// issue_token
///
/// Signs a session token for `user_id`, valid for `ttl_secs` seconds from now.
pub fn issue_token(
    user_id: Uuid,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + ttl_secs) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// resolve_user
///
/// Works out who a request belongs to.
///
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming a known user is enough.
/// 2. Otherwise the `Authorization: Bearer <jwt>` header is decoded and validated
///    (signature and expiry).
/// 3. The token subject must still exist in the directory, so deleted users lose access
///    even while holding an unexpired token.
///
/// Every failure is `401 Unauthorized`.
pub async fn resolve_user(
    parts: &Parts,
    directory: &DirectoryState,
    config: &AppConfig,
) -> Result<AuthUser, StatusCode> {
    if config.env == Env::Local {
        let bypass_id = parts
            .headers
            .get(LOCAL_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|id| Uuid::parse_str(id).ok());

        if let Some(user_id) = bypass_id {
            if let Some(user) = directory.get_user(user_id).await {
                return Ok(AuthUser {
                    id: user.id,
                    email: user.email,
                    role: user.role,
                });
            }
        }
        // A bad or unknown bypass id falls through to the token check.
    }

    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
            other => tracing::debug!("session token rejected: {:?}", other),
        }
        StatusCode::UNAUTHORIZED
    })?;

    let user = directory
        .get_user(token_data.claims.sub)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    Ok(AuthUser {
        id: user.id,
        email: user.email,
        role: user.role,
    })
}

/// AuthUser Extractor
///
/// Lets handlers behind the gate take the resolved identity as an argument.
/// Rejection: `401 Unauthorized`.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    DirectoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let directory = DirectoryState::from_ref(state);
        let config = AppConfig::from_ref(state);
        resolve_user(parts, &directory, &config).await
    }
}

/// UserStateOracle
///
/// The rights oracle backed by session tokens and the user directory. Any request that
/// resolves to a known user has user rights; admin rights additionally need the `admin`
/// role. Unresolvable requests have neither.
#[derive(Clone)]
pub struct UserStateOracle {
    directory: DirectoryState,
    config: AppConfig,
}

impl UserStateOracle {
    pub fn new(directory: DirectoryState, config: AppConfig) -> Self {
        Self { directory, config }
    }
}

#[async_trait]
impl RightsOracle for UserStateOracle {
    async fn has_admin_rights(&self, parts: &Parts) -> bool {
        resolve_user(parts, &self.directory, &self.config)
            .await
            .map(|user| user.is_admin())
            .unwrap_or(false)
    }

    async fn has_user_rights(&self, parts: &Parts) -> bool {
        resolve_user(parts, &self.directory, &self.config)
            .await
            .is_ok()
    }
}
