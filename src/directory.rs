use crate::models::User;
use async_trait::async_trait;
use sqlx::PgPool;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// UserDirectory
///
/// The abstract contract for looking up and registering accounts. The rights oracle
/// resolves request identities through it without knowing the backing store.
///
/// **Send + Sync + async_trait** are required to make `Arc<dyn UserDirectory>` shareable
/// across Axum's asynchronous task boundaries.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Lookup failures of any kind read as "no such user".
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn create_user(&self, user: User) -> Result<User, String>;
}

/// DirectoryState
///
/// The concrete type used to share the directory across the application state.
pub type DirectoryState = Arc<dyn UserDirectory>;

/// InMemoryUserDirectory
///
/// Process-local directory used when no database is configured, and by the tests.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the directory with a fixed set of accounts.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    async fn create_user(&self, user: User) -> Result<User, String> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(format!("user {} already exists", user.id));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

/// PostgresUserDirectory
///
/// Directory backed by the `profiles(id, email, role)` table.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    /// get_user
    ///
    /// A database error is logged and reported as a missing user, so callers fail closed.
    async fn get_user(&self, id: Uuid) -> Option<User> {
        match sqlx::query_as::<_, User>("SELECT id, email, role FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(user_id = %id, "profile lookup failed: {}", e);
                None
            }
        }
    }

    async fn create_user(&self, user: User) -> Result<User, String> {
        sqlx::query_as::<_, User>(
            "INSERT INTO profiles (id, email, role) VALUES ($1, $2, $3) RETURNING id, email, role",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.to_string())
    }
}
