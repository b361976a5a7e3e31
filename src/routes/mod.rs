//! Router Module Index
//!
//! Groups the demo site's routes by the access the gate's default policy gives them.
//! The routers themselves carry no access checks: the gate, layered over the merged
//! router, decides every request from its path.

/// Landing, login, registration and static files.
pub mod public;

/// Pages under the default user prefixes (`/repo`, `/data`).
pub mod user;

/// Pages under the default admin prefix (`/admin`).
pub mod admin;
