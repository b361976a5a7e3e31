use std::env;

use crate::rules::PathRuleSet;

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Holds the service's entire configuration state. Immutable once loaded; the gate's rule
/// table is built from it at startup and only changes through the gate's own
/// administrative calls afterwards.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local `x-user-id` bypass and log format.
    pub env: Env,
    // Secret used to sign and validate session JWTs (HS256).
    pub jwt_secret: String,
    // Postgres connection string. `None` selects the in-memory user directory.
    pub db_url: Option<String>,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Overrides for the gate's default path policy.
    pub gate: GateConfig,
}

/// Env
///
/// Defines the runtime context, switching between development conveniences and the
/// hardened production setup.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// GateConfig
///
/// Optional replacements for the default path policy. A list that is `None` keeps the
/// built-in default; a list that is `Some` replaces it entirely.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GateConfig {
    pub admin_prefixes: Option<Vec<String>>,
    pub user_prefixes: Option<Vec<String>>,
    pub public_prefixes: Option<Vec<String>>,
    pub root_is_public: Option<bool>,
}

impl GateConfig {
    /// from_env
    ///
    /// Reads `GATE_ADMIN_PREFIXES`, `GATE_USER_PREFIXES`, `GATE_PUBLIC_PREFIXES`
    /// (comma-separated) and `GATE_ROOT_IS_PUBLIC` (`true`/`false`).
    pub fn from_env() -> Self {
        Self {
            admin_prefixes: env::var("GATE_ADMIN_PREFIXES").ok().map(|v| parse_prefixes(&v)),
            user_prefixes: env::var("GATE_USER_PREFIXES").ok().map(|v| parse_prefixes(&v)),
            public_prefixes: env::var("GATE_PUBLIC_PREFIXES").ok().map(|v| parse_prefixes(&v)),
            root_is_public: env::var("GATE_ROOT_IS_PUBLIC").ok().and_then(|v| {
                match v.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => Some(true),
                    "false" | "0" | "no" => Some(false),
                    other => {
                        tracing::warn!("ignoring unrecognised GATE_ROOT_IS_PUBLIC value {:?}", other);
                        None
                    }
                }
            }),
        }
    }

    /// Applies the overrides on top of the default policy.
    pub fn rules(&self) -> PathRuleSet {
        let mut rules = PathRuleSet::default();
        if let Some(prefixes) = &self.admin_prefixes {
            rules.set_admin_prefixes(prefixes.clone());
        }
        if let Some(prefixes) = &self.user_prefixes {
            rules.set_user_prefixes(prefixes.clone());
        }
        if let Some(prefixes) = &self.public_prefixes {
            rules.set_public_prefixes(prefixes.clone());
        }
        if let Some(root_is_public) = self.root_is_public {
            rules.set_root_is_public(root_is_public);
        }
        rules
    }
}

/// parse_prefixes
///
/// Splits a comma-separated list, trimming whitespace. Empty entries are dropped, since
/// an empty prefix would match every path.
pub fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for AppConfig {
    /// default
    ///
    /// Safe, non-panicking values for test setup: local mode, no database, default policy.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            db_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            gate: GateConfig::default(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables at startup.
    ///
    /// # Panics
    /// Panics in production when `JWT_SECRET` is not set, so the service never starts
    /// signing sessions with the well-known local secret.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        Self {
            env,
            jwt_secret,
            db_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            gate: GateConfig::from_env(),
        }
    }
}
