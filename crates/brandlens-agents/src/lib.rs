//! BrandLens Agents
//!
//! Collaborator implementations for the critique workflow: the HTTP
//! client for the remote agents service, and a deterministic local stub
//! for offline runs and demos.

pub mod config;
pub mod http;
pub mod stub;

pub use config::AgentsConfig;
pub use http::HttpAgents;
pub use stub::StubAgents;

/// BrandLens agents version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
