//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::admission::{RejectPolicy, UnknownClientPolicy};

/// Root configuration for the Chefito backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ChefitoConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request admission (rate limiting) for protected routes.
    pub admission: AdmissionConfig,

    /// Recipe catalog source.
    pub catalog: CatalogConfig,

    /// Free premium views granted to non-subscribers.
    pub entitlements: EntitlementConfig,

    /// Text-to-speech endpoint settings.
    pub speech: SpeechConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Admission configuration shared by all protected routes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Header the client key is read from.
    pub client_header: String,

    /// How often expired windows are swept, in seconds.
    pub sweep_interval_secs: u64,

    /// Windows older than this many window lengths are evicted.
    pub retention_multiplier: u32,

    /// Per-route policies.
    pub routes: RoutePoliciesConfig,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            client_header: "x-forwarded-for".to_string(),
            sweep_interval_secs: 60,
            retention_multiplier: 2,
            routes: RoutePoliciesConfig::default(),
        }
    }
}

/// One policy per protected route group. Each gets its own controller.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutePoliciesConfig {
    pub recipes: RoutePolicyConfig,
    pub speech: RoutePolicyConfig,
}

impl Default for RoutePoliciesConfig {
    fn default() -> Self {
        Self {
            recipes: RoutePolicyConfig {
                retry_after_secs: Some(60),
                ..RoutePolicyConfig::default()
            },
            speech: RoutePolicyConfig::default(),
        }
    }
}

/// Admission policy for a single route group.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutePolicyConfig {
    /// Maximum requests per client per window.
    pub limit: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Fixed `Retry-After` value sent with 429 responses; omitted when unset.
    pub retry_after_secs: Option<u64>,

    /// Whether rejected requests keep counting.
    pub reject_policy: RejectPolicy,

    /// Handling of requests without a client header.
    pub unknown_clients: UnknownClientPolicy,
}

impl Default for RoutePolicyConfig {
    fn default() -> Self {
        Self {
            limit: 60,
            window_ms: 60_000,
            retry_after_secs: None,
            reject_policy: RejectPolicy::Count,
            unknown_clients: UnknownClientPolicy::Shared,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON file with the recipes to serve. Empty catalog when unset.
    pub recipes_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EntitlementConfig {
    /// Premium recipes a non-subscriber may open for free.
    pub free_recipes: u32,
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self { free_recipes: 3 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Longest text accepted for synthesis, in characters.
    pub max_text_chars: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            max_text_chars: 5000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

/// Placeholder key rejected by validation when the admin API is enabled.
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: ChefitoConfig = toml::from_str("").unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.admission.client_header, "x-forwarded-for");
        assert_eq!(config.admission.routes.recipes.limit, 60);
        assert_eq!(config.admission.routes.recipes.window_ms, 60_000);
        assert_eq!(config.admission.routes.recipes.retry_after_secs, Some(60));
        assert_eq!(config.admission.routes.speech.retry_after_secs, None);
        assert_eq!(config.entitlements.free_recipes, 3);
    }

    #[test]
    fn test_partial_route_override() {
        let config: ChefitoConfig = toml::from_str(
            r#"
            [admission.routes.speech]
            limit = 10
            reject_policy = "freeze"
            unknown_clients = { mode = "reject" }
            "#,
        )
        .unwrap();

        let speech = &config.admission.routes.speech;
        assert_eq!(speech.limit, 10);
        assert_eq!(speech.window_ms, 60_000);
        assert_eq!(speech.reject_policy, RejectPolicy::Freeze);
        assert_eq!(speech.unknown_clients, UnknownClientPolicy::Reject);
        assert_eq!(config.admission.routes.recipes.limit, 60);
    }
}
