use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role value carried by administrators.
pub const ROLE_ADMIN: &str = "admin";
/// Role value carried by ordinary registered users.
pub const ROLE_USER: &str = "user";

// --- Core Schemas (Mapped to Database) ---

/// User
///
/// A known account as stored in the `profiles` table. Every resolvable user has user
/// rights; the `role` decides whether they also have admin rights.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    // 'user' or 'admin'.
    pub role: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

// --- Request Payloads ---

/// RegisterUserRequest
///
/// Input payload for the public registration endpoint (POST /register).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
}

/// LoginRequest
///
/// Input payload for POST /login. The demo site trusts the id and only checks it exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user_id: Uuid,
}

// --- Responses ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// WhoAmI
///
/// Echo returned by the protected pages: who the request resolved to and which path
/// they reached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhoAmI {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub path: String,
}
