use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use permission_gate::{
    AppState, DirectoryState, InMemoryUserDirectory, RightsOracle,
    auth::{AuthUser, Claims, UserStateOracle, issue_token, resolve_user},
    config::{AppConfig, Env},
    models::User,
};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);
const TEST_ADMIN_ID: Uuid = Uuid::from_u128(2);

fn directory() -> DirectoryState {
    Arc::new(InMemoryUserDirectory::with_users([
        User {
            id: TEST_USER_ID,
            email: "test@example.com".to_string(),
            role: "user".to_string(),
        },
        User {
            id: TEST_ADMIN_ID,
            email: "admin@example.com".to_string(),
            role: "admin".to_string(),
        },
    ]))
}

fn config(env: Env) -> AppConfig {
    AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

/// Signs claims directly so tests can produce tokens `issue_token` never would.
fn token_with_times(user_id: Uuid, iat: u64, exp: u64, secret: &str) -> String {
    let claims = Claims {
        sub: user_id,
        iat: iat as usize,
        exp: exp as usize,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn get_request_parts(uri: Uri) -> Parts {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(mut parts: Parts, token: &str) -> Parts {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

fn with_bypass(mut parts: Parts, user_id: Uuid) -> Parts {
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&user_id.to_string()).unwrap(),
    );
    parts
}

// --- resolve_user ---

#[tokio::test]
async fn test_resolve_success_with_valid_jwt() {
    let token = issue_token(TEST_USER_ID, TEST_JWT_SECRET, 3600).unwrap();
    let parts = with_bearer(get_request_parts("/repo".parse().unwrap()), &token);

    let user = resolve_user(&parts, &directory(), &config(Env::Production))
        .await
        .unwrap();

    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.email, "test@example.com");
    assert!(!user.is_admin());
}

#[tokio::test]
async fn test_resolve_failure_with_missing_header() {
    let parts = get_request_parts("/repo".parse().unwrap());

    let result = resolve_user(&parts, &directory(), &config(Env::Production)).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_resolve_failure_without_bearer_scheme() {
    let token = issue_token(TEST_USER_ID, TEST_JWT_SECRET, 3600).unwrap();
    let mut parts = get_request_parts("/repo".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Token {}", token)).unwrap(),
    );

    let result = resolve_user(&parts, &directory(), &config(Env::Production)).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_resolve_failure_with_expired_jwt() {
    // Well past the default validation leeway.
    let issued = now() - 7200;
    let token = token_with_times(TEST_USER_ID, issued, issued + 60, TEST_JWT_SECRET);
    let parts = with_bearer(get_request_parts("/repo".parse().unwrap()), &token);

    let result = resolve_user(&parts, &directory(), &config(Env::Production)).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_resolve_failure_with_wrong_secret() {
    let token = issue_token(TEST_USER_ID, "some-other-secret", 3600).unwrap();
    let parts = with_bearer(get_request_parts("/repo".parse().unwrap()), &token);

    let result = resolve_user(&parts, &directory(), &config(Env::Production)).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_resolve_failure_for_unknown_subject() {
    let token = issue_token(Uuid::new_v4(), TEST_JWT_SECRET, 3600).unwrap();
    let parts = with_bearer(get_request_parts("/repo".parse().unwrap()), &token);

    let result = resolve_user(&parts, &directory(), &config(Env::Production)).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_bypass_success() {
    let parts = with_bypass(get_request_parts("/admin".parse().unwrap()), TEST_ADMIN_ID);

    let user = resolve_user(&parts, &directory(), &config(Env::Local))
        .await
        .unwrap();

    assert_eq!(user.id, TEST_ADMIN_ID);
    assert!(user.is_admin());
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let parts = with_bypass(get_request_parts("/admin".parse().unwrap()), TEST_ADMIN_ID);

    let result = resolve_user(&parts, &directory(), &config(Env::Production)).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_bypass_unknown_user_falls_through_to_token() {
    let token = issue_token(TEST_USER_ID, TEST_JWT_SECRET, 3600).unwrap();
    let parts = with_bearer(
        with_bypass(get_request_parts("/repo".parse().unwrap()), Uuid::new_v4()),
        &token,
    );

    let user = resolve_user(&parts, &directory(), &config(Env::Local))
        .await
        .unwrap();

    assert_eq!(user.id, TEST_USER_ID);
}

// --- AuthUser Extractor ---

#[tokio::test]
async fn test_extractor_uses_app_state() {
    let state = AppState::new(directory(), config(Env::Production));
    let token = issue_token(TEST_ADMIN_ID, TEST_JWT_SECRET, 3600).unwrap();
    let mut parts = with_bearer(get_request_parts("/admin".parse().unwrap()), &token);

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();

    assert_eq!(user.id, TEST_ADMIN_ID);
    assert_eq!(user.role, "admin");
}

// --- UserStateOracle ---

#[tokio::test]
async fn test_oracle_grants_user_rights_to_known_user() {
    let oracle = UserStateOracle::new(directory(), config(Env::Production));
    let token = issue_token(TEST_USER_ID, TEST_JWT_SECRET, 3600).unwrap();
    let parts = with_bearer(get_request_parts("/repo".parse().unwrap()), &token);

    assert!(oracle.has_user_rights(&parts).await);
    assert!(!oracle.has_admin_rights(&parts).await);
}

#[tokio::test]
async fn test_oracle_grants_both_rights_to_admin() {
    let oracle = UserStateOracle::new(directory(), config(Env::Production));
    let token = issue_token(TEST_ADMIN_ID, TEST_JWT_SECRET, 3600).unwrap();
    let parts = with_bearer(get_request_parts("/admin".parse().unwrap()), &token);

    assert!(oracle.has_admin_rights(&parts).await);
    assert!(oracle.has_user_rights(&parts).await);
}

#[tokio::test]
async fn test_oracle_fails_closed_for_anonymous_requests() {
    let oracle = UserStateOracle::new(directory(), config(Env::Production));
    let parts = with_bearer(get_request_parts("/admin".parse().unwrap()), "not-a-jwt");

    assert!(!oracle.has_admin_rights(&parts).await);
    assert!(!oracle.has_user_rights(&parts).await);
}
