use serde::Serialize;

/// Access
///
/// The requirement a request path resolves to once the rule table has been applied.
/// `Admin` and `User` still need the rights oracle to answer; `Public` and `Denied`
/// are final without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    User,
    Admin,
    Denied,
}

/// PathRuleSet
///
/// The authorization policy: three ordered lists of path prefixes plus the root override.
/// A path matches a prefix when it starts with the literal characters of that prefix.
/// Evaluation order (admin, then user, then public) is the tie-break when lists overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathRuleSet {
    admin_prefixes: Vec<String>,
    user_prefixes: Vec<String>,
    public_prefixes: Vec<String>,
    root_is_public: bool,
}

impl Default for PathRuleSet {
    /// default
    ///
    /// The built-in site policy: `/admin` for administrators, `/repo` and `/data` for
    /// logged in users, the login and registration pages plus common static assets for
    /// everyone, and "/" always public.
    ///
    /// The landing page is reachable through the root override only. A literal "/" in the
    /// public list would prefix-match every path and open the whole site.
    fn default() -> Self {
        Self {
            admin_prefixes: vec!["/admin".to_string()],
            user_prefixes: vec!["/repo".to_string(), "/data".to_string()],
            public_prefixes: [
                "/login",
                "/register",
                "/favicon.ico",
                "/style",
                "/img",
                "/js",
                "/robots.txt",
                "/sitemap_index.xml",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            root_is_public: true,
        }
    }
}

impl PathRuleSet {
    /// A policy with no prefixes and no root override. Every path is denied.
    pub fn empty() -> Self {
        Self {
            admin_prefixes: Vec::new(),
            user_prefixes: Vec::new(),
            public_prefixes: Vec::new(),
            root_is_public: false,
        }
    }

    pub fn admin_prefixes(&self) -> &[String] {
        &self.admin_prefixes
    }

    pub fn user_prefixes(&self) -> &[String] {
        &self.user_prefixes
    }

    pub fn public_prefixes(&self) -> &[String] {
        &self.public_prefixes
    }

    pub fn root_is_public(&self) -> bool {
        self.root_is_public
    }

    pub fn set_root_is_public(&mut self, root_is_public: bool) {
        self.root_is_public = root_is_public;
    }

    // --- Mutators ---
    // No content validation: an empty prefix matches every path.

    pub fn add_admin_prefix(&mut self, prefix: impl Into<String>) {
        self.admin_prefixes.push(prefix.into());
    }

    pub fn add_user_prefix(&mut self, prefix: impl Into<String>) {
        self.user_prefixes.push(prefix.into());
    }

    pub fn add_public_prefix(&mut self, prefix: impl Into<String>) {
        self.public_prefixes.push(prefix.into());
    }

    pub fn set_admin_prefixes(&mut self, prefixes: Vec<String>) {
        self.admin_prefixes = prefixes;
    }

    pub fn set_user_prefixes(&mut self, prefixes: Vec<String>) {
        self.user_prefixes = prefixes;
    }

    pub fn set_public_prefixes(&mut self, prefixes: Vec<String>) {
        self.public_prefixes = prefixes;
    }

    /// clear
    ///
    /// Empties the admin and user lists. The public list and the root override are kept,
    /// so afterwards only the public-prefix check governs access.
    pub fn clear(&mut self) {
        self.admin_prefixes.clear();
        self.user_prefixes.clear();
    }

    /// classify
    ///
    /// Maps a request path to the access it requires, without consulting any rights.
    ///
    /// 1. "/" with the root override enabled is `Public`.
    /// 2. Any admin prefix match is `Admin`, regardless of the other lists.
    /// 3. Otherwise any user prefix match is `User`.
    /// 4. Otherwise a public prefix match is `Public`, anything else is `Denied`.
    pub fn classify(&self, path: &str) -> Access {
        if self.root_is_public && path == "/" {
            return Access::Public;
        }
        if matches_any(&self.admin_prefixes, path) {
            return Access::Admin;
        }
        if matches_any(&self.user_prefixes, path) {
            return Access::User;
        }
        if matches_any(&self.public_prefixes, path) {
            Access::Public
        } else {
            Access::Denied
        }
    }
}

fn matches_any(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}
