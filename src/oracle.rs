use async_trait::async_trait;
use axum::http::request::Parts;
use std::sync::Arc;

/// RightsOracle
///
/// The capability the gate needs from whatever authenticates requests. Both questions are
/// answered from evidence carried by the request itself (a session token, a header).
///
/// Implementations must return a definite answer: when the backing store is unreachable
/// or the evidence cannot be verified, the answer is `false`.
///
/// **Send + Sync + async_trait** make `Arc<dyn RightsOracle>` shareable across Axum's
/// request tasks, and allow implementations to await network or storage lookups.
#[async_trait]
pub trait RightsOracle: Send + Sync {
    async fn has_admin_rights(&self, parts: &Parts) -> bool;
    async fn has_user_rights(&self, parts: &Parts) -> bool;
}

/// OracleState
///
/// The shared handle the gate keeps to its rights oracle.
pub type OracleState = Arc<dyn RightsOracle>;

/// StaticRightsOracle
///
/// Answers every request the same way. Useful for wiring a gate before a real user
/// store exists, and for opening or locking a whole deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRightsOracle {
    pub admin: bool,
    pub user: bool,
}

impl StaticRightsOracle {
    pub fn new(admin: bool, user: bool) -> Self {
        Self { admin, user }
    }

    /// Grants nothing: only public paths get through.
    pub fn deny_all() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RightsOracle for StaticRightsOracle {
    async fn has_admin_rights(&self, _parts: &Parts) -> bool {
        self.admin
    }

    async fn has_user_rights(&self, _parts: &Parts) -> bool {
        self.user
    }
}
