//! Chefito recipe backend.
//!
//! Serves the recipe catalog and text-to-speech behind per-route admission
//! control, with subscription entitlements gating premium recipes.

pub mod admin;
pub mod admission;
pub mod config;
pub mod entitlements;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod recipes;
pub mod speech;

pub use config::ChefitoConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
