//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → ChefitoConfig (validated, immutable)
//!     → consumed once at startup by HttpServer
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - Limits and windows are fixed for the process lifetime

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, AdmissionConfig, CatalogConfig, ChefitoConfig, EntitlementConfig, ListenerConfig,
    ObservabilityConfig, RoutePoliciesConfig, RoutePolicyConfig, SpeechConfig, TimeoutConfig,
};
