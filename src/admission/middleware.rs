//! Admission middleware for protected routes.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::admission::client_key::{extract_client_key, ClientKey, UNKNOWN_CLIENT_KEY};
use crate::admission::clock::{Clock, SystemClock};
use crate::admission::controller::{AdmissionController, AdmissionPolicy, AdmissionStats, Decision};
use crate::config::RoutePolicyConfig;
use crate::http::response::ApiError;
use crate::observability::metrics;

/// How requests without a client header are admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum UnknownClientPolicy {
    /// All unidentified clients share the `"unknown"` bucket of the route's controller.
    #[default]
    Shared,
    /// Unidentified clients share one bucket on a separate controller with its own limit.
    Strict { limit: u32 },
    /// Unidentified clients are always rejected.
    Reject,
}

/// Clock shared by every controller of a guard.
pub type SharedClock = Arc<dyn Clock>;

type GuardController = AdmissionController<SharedClock>;

enum UnknownHandling {
    Shared,
    Separate(GuardController),
    Reject,
}

struct RouteGuardInner {
    name: String,
    controller: GuardController,
    unknown: UnknownHandling,
    retry_after_secs: Option<u64>,
    client_header: String,
}

/// Admission state owned by one protected route group.
#[derive(Clone)]
pub struct RouteGuard {
    inner: Arc<RouteGuardInner>,
}

/// Result of checking one request against a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionCheck {
    pub key: ClientKey,
    pub decision: Decision,
    /// Count held by the bucket that decided, `None` when no bucket was consulted.
    pub count: Option<u32>,
}

/// Stats for one guard, as served by the admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStats {
    pub route: String,
    pub clients: AdmissionStats,
    pub unknown_clients: Option<AdmissionStats>,
    pub retry_after_secs: Option<u64>,
}

impl RouteGuard {
    pub fn new(
        name: impl Into<String>,
        policy: AdmissionPolicy,
        unknown_policy: UnknownClientPolicy,
        retry_after_secs: Option<u64>,
        client_header: impl Into<String>,
    ) -> Self {
        Self::with_clock(
            name,
            policy,
            unknown_policy,
            retry_after_secs,
            client_header,
            Arc::new(SystemClock),
        )
    }

    /// Like [`RouteGuard::new`], with every controller reading `clock`.
    pub fn with_clock(
        name: impl Into<String>,
        policy: AdmissionPolicy,
        unknown_policy: UnknownClientPolicy,
        retry_after_secs: Option<u64>,
        client_header: impl Into<String>,
        clock: SharedClock,
    ) -> Self {
        let unknown = match unknown_policy {
            UnknownClientPolicy::Shared => UnknownHandling::Shared,
            UnknownClientPolicy::Strict { limit } => UnknownHandling::Separate(
                AdmissionController::with_clock(AdmissionPolicy { limit, ..policy }, clock.clone()),
            ),
            UnknownClientPolicy::Reject => UnknownHandling::Reject,
        };

        Self {
            inner: Arc::new(RouteGuardInner {
                name: name.into(),
                controller: AdmissionController::with_clock(policy, clock),
                unknown,
                retry_after_secs,
                client_header: client_header.into().to_lowercase(),
            }),
        }
    }

    /// Build a guard from its route section of the config file.
    pub fn from_config(
        name: &str,
        config: &RoutePolicyConfig,
        client_header: &str,
        clock: SharedClock,
    ) -> Self {
        let policy = AdmissionPolicy::new(config.limit, Duration::from_millis(config.window_ms))
            .with_reject_policy(config.reject_policy);
        Self::with_clock(
            name,
            policy,
            config.unknown_clients,
            config.retry_after_secs,
            client_header,
            clock,
        )
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn controller(&self) -> &AdmissionController<SharedClock> {
        &self.inner.controller
    }

    /// Derive the client key from `headers` and record the request.
    pub fn check(&self, headers: &HeaderMap) -> AdmissionCheck {
        let key = extract_client_key(headers, &self.inner.client_header);
        let (decision, count) = match (&key, &self.inner.unknown) {
            (ClientKey::Unknown, UnknownHandling::Separate(controller)) => {
                let (decision, count) = controller.record(UNKNOWN_CLIENT_KEY);
                (decision, Some(count))
            }
            (ClientKey::Unknown, UnknownHandling::Reject) => (Decision::Reject, None),
            _ => {
                let (decision, count) = self.inner.controller.record(key.as_str());
                (decision, Some(count))
            }
        };
        AdmissionCheck { key, decision, count }
    }

    /// 429 response sent for a rejected request.
    pub fn rejection(&self) -> Response {
        ApiError::TooManyRequests {
            retry_after_secs: self.inner.retry_after_secs,
        }
        .into_response()
    }

    /// Evict windows older than `multiplier` windows from every controller.
    pub fn sweep(&self, retention_multiplier: u32) -> usize {
        let mut evicted = sweep_controller(&self.inner.controller, retention_multiplier);
        if let UnknownHandling::Separate(controller) = &self.inner.unknown {
            evicted += sweep_controller(controller, retention_multiplier);
        }
        evicted
    }

    pub fn tracked_keys(&self) -> usize {
        let unknown = match &self.inner.unknown {
            UnknownHandling::Separate(controller) => controller.tracked_keys(),
            _ => 0,
        };
        self.inner.controller.tracked_keys() + unknown
    }

    pub fn stats(&self) -> RouteStats {
        RouteStats {
            route: self.inner.name.clone(),
            clients: self.inner.controller.snapshot(),
            unknown_clients: match &self.inner.unknown {
                UnknownHandling::Separate(controller) => Some(controller.snapshot()),
                _ => None,
            },
            retry_after_secs: self.inner.retry_after_secs,
        }
    }
}

fn sweep_controller(controller: &GuardController, retention_multiplier: u32) -> usize {
    let retention = controller.policy().window.saturating_mul(retention_multiplier);
    controller.sweep(retention)
}

/// Gate a route behind its [`RouteGuard`].
pub async fn admission_middleware(
    State(guard): State<RouteGuard>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let check = guard.check(request.headers());
    metrics::record_admission(guard.name(), check.decision);

    if check.decision.is_admitted() {
        return next.run(request).await;
    }

    tracing::warn!(
        route = %guard.name(),
        client = %check.key.as_str(),
        count = ?check.count,
        "Rate limit exceeded"
    );
    guard.rejection()
}
