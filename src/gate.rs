use axum::{
    extract::{Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    oracle::OracleState,
    rules::{Access, PathRuleSet},
};

/// DenyFunction
///
/// Builds the response sent back when the gate rejects a request. Swapped at
/// configuration time through `Permissions::set_deny_function`.
pub type DenyFunction = Arc<dyn Fn(&Parts) -> Response + Send + Sync>;

/// permission_denied
///
/// The default denial responder: 403 Forbidden with a fixed plain-text body.
pub fn permission_denied(_parts: &Parts) -> Response {
    (StatusCode::FORBIDDEN, "Permission denied.").into_response()
}

/// Permissions
///
/// The request-authorization gate. Holds the path rule table, the rights oracle that
/// answers "is this an admin" / "is this a user", and the denial responder.
///
/// Cloning is cheap and every clone shares the same configuration, which is how the
/// gate is handed to Axum as middleware state while configuration code keeps a handle.
/// Independently constructed gates never share anything.
///
/// Reads happen on every request; mutations are expected during startup or
/// administrative windows. The locks are never held across an oracle call.
#[derive(Clone)]
pub struct Permissions {
    rules: Arc<RwLock<PathRuleSet>>,
    oracle: Arc<RwLock<OracleState>>,
    denied: Arc<RwLock<DenyFunction>>,
}

impl Permissions {
    /// A gate with the built-in default policy and the default denial responder.
    pub fn new(oracle: OracleState) -> Self {
        Self::with_rules(oracle, PathRuleSet::default())
    }

    pub fn with_rules(oracle: OracleState, rules: PathRuleSet) -> Self {
        let denied: DenyFunction = Arc::new(permission_denied);
        Self {
            rules: Arc::new(RwLock::new(rules)),
            oracle: Arc::new(RwLock::new(oracle)),
            denied: Arc::new(RwLock::new(denied)),
        }
    }

    // --- Administrative surface ---

    /// A point-in-time copy of the current rule table.
    pub fn rules(&self) -> PathRuleSet {
        read(&self.rules).clone()
    }

    pub fn add_admin_path(&self, prefix: impl Into<String>) {
        write(&self.rules).add_admin_prefix(prefix);
    }

    pub fn add_user_path(&self, prefix: impl Into<String>) {
        write(&self.rules).add_user_prefix(prefix);
    }

    pub fn add_public_path(&self, prefix: impl Into<String>) {
        write(&self.rules).add_public_prefix(prefix);
    }

    pub fn set_admin_paths(&self, prefixes: Vec<String>) {
        write(&self.rules).set_admin_prefixes(prefixes);
    }

    pub fn set_user_paths(&self, prefixes: Vec<String>) {
        write(&self.rules).set_user_prefixes(prefixes);
    }

    pub fn set_public_paths(&self, prefixes: Vec<String>) {
        write(&self.rules).set_public_prefixes(prefixes);
    }

    pub fn set_root_is_public(&self, root_is_public: bool) {
        write(&self.rules).set_root_is_public(root_is_public);
    }

    /// Drops every admin and user prefix. Most of the site becomes public.
    pub fn clear(&self) {
        write(&self.rules).clear();
    }

    pub fn rights_oracle(&self) -> OracleState {
        read(&self.oracle).clone()
    }

    pub fn set_rights_oracle(&self, oracle: OracleState) {
        *write(&self.oracle) = oracle;
    }

    pub fn deny_function(&self) -> DenyFunction {
        read(&self.denied).clone()
    }

    pub fn set_deny_function<F>(&self, f: F)
    where
        F: Fn(&Parts) -> Response + Send + Sync + 'static,
    {
        *write(&self.denied) = Arc::new(f);
    }

    // --- Decision ---

    /// reject
    ///
    /// Decides whether a request must be turned away. The rule table settles public and
    /// unmatched paths on its own; admin and user paths ask the oracle exactly one
    /// question. A passing rights check accepts the request without consulting the
    /// lower-priority lists.
    pub async fn reject(&self, parts: &Parts) -> bool {
        let path = parts.uri.path();
        let access = read(&self.rules).classify(path);

        let rejected = match access {
            Access::Public => false,
            Access::Denied => true,
            Access::Admin => !self.rights_oracle().has_admin_rights(parts).await,
            Access::User => !self.rights_oracle().has_user_rights(parts).await,
        };

        if rejected {
            tracing::debug!(path, ?access, "permission denied");
        }
        rejected
    }

    /// handle
    ///
    /// Runs the decision and either hands the request to the denial responder or
    /// forwards it to the rest of the middleware chain, never both.
    pub async fn handle(&self, request: Request, next: Next) -> Response {
        let (parts, body) = request.into_parts();

        if self.reject(&parts).await {
            let deny = self.deny_function();
            return deny(&parts);
        }

        next.run(Request::from_parts(parts, body)).await
    }
}

/// permissions_middleware
///
/// Adapter for `axum::middleware::from_fn_with_state`, placing the gate in front of
/// every route of a router.
pub async fn permissions_middleware(
    State(permissions): State<Permissions>,
    request: Request,
    next: Next,
) -> Response {
    permissions.handle(request, next).await
}

// A panic while holding the write lock cannot leave a half-applied mutation behind,
// every mutator is a single assignment or push.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
