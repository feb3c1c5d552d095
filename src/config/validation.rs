//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits and windows > 0, addresses parse)
//! - Refuse to expose the admin API with the placeholder key
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ChefitoConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::admission::UnknownClientPolicy;
use crate::config::schema::{ChefitoConfig, RoutePolicyConfig, PLACEHOLDER_API_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: String },

    #[error("admission.client_header '{0}' is not a valid header name")]
    InvalidHeader(String),

    #[error("admission.retention_multiplier must be at least 1")]
    RetentionTooShort,

    #[error("admin.api_key must be changed when the admin API is enabled")]
    PlaceholderApiKey,
}

pub fn validate_config(config: &ChefitoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.observability.metrics_enabled {
        check_address("observability.metrics_address", &config.observability.metrics_address, &mut errors);
    }
    if config.admin.enabled {
        check_address("admin.bind_address", &config.admin.bind_address, &mut errors);
        if config.admin.api_key == PLACEHOLDER_API_KEY || config.admin.api_key.is_empty() {
            errors.push(ValidationError::PlaceholderApiKey);
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs".into() });
    }

    let admission = &config.admission;
    if axum::http::HeaderName::from_bytes(admission.client_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeader(admission.client_header.clone()));
    }
    if admission.sweep_interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "admission.sweep_interval_secs".into() });
    }
    if admission.retention_multiplier < 1 {
        errors.push(ValidationError::RetentionTooShort);
    }
    check_route("recipes", &admission.routes.recipes, &mut errors);
    check_route("speech", &admission.routes.speech, &mut errors);

    if config.speech.max_text_chars == 0 {
        errors.push(ValidationError::Zero { field: "speech.max_text_chars".into() });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_route(name: &str, route: &RoutePolicyConfig, errors: &mut Vec<ValidationError>) {
    if route.limit == 0 {
        errors.push(ValidationError::Zero { field: format!("admission.routes.{}.limit", name) });
    }
    if route.window_ms == 0 {
        errors.push(ValidationError::Zero { field: format!("admission.routes.{}.window_ms", name) });
    }
    if let UnknownClientPolicy::Strict { limit: 0 } = route.unknown_clients {
        errors.push(ValidationError::Zero {
            field: format!("admission.routes.{}.unknown_clients.limit", name),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ChefitoConfig::default()).is_ok());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: ChefitoConfig = toml::from_str(include_str!("../../chefito.example.toml")).unwrap();
        assert_eq!(
            config.admission.routes.speech.unknown_clients,
            UnknownClientPolicy::Strict { limit: 20 }
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ChefitoConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.admission.client_header = "bad header".into();
        config.admission.retention_multiplier = 0;
        config.admission.routes.recipes.unknown_clients = UnknownClientPolicy::Strict { limit: 0 };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::RetentionTooShort));
        assert!(errors.contains(&ValidationError::Zero {
            field: "admission.routes.recipes.unknown_clients.limit".into()
        }));
    }

    #[test]
    fn test_admin_requires_real_key() {
        let mut config = ChefitoConfig::default();
        config.admin.enabled = true;
        assert_eq!(validate_config(&config).unwrap_err(), vec![ValidationError::PlaceholderApiKey]);

        config.admin.api_key = "s3cret".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = ChefitoConfig::default();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
