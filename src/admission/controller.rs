//! Fixed-window admission controller.
//!
//! # Responsibilities
//! - Track request counts per client key within a window
//! - Decide admit/reject for each request
//! - Evict expired windows on demand
//!
//! # Design Decisions
//! - Window anchored at the first request seen in it; a burst straddling
//!   the boundary can admit up to `2 x limit` requests
//! - Per-key updates happen under the map's entry guard, so counts are exact
//!   even on a multi-threaded runtime
//! - Any string is a valid key; `""` and `"unknown"` are ordinary buckets

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::admission::clock::{Clock, SystemClock};

/// What happens to the stored count when a request is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectPolicy {
    /// Every rejected call keeps incrementing the count until the window rolls over.
    #[default]
    Count,
    /// The count stops at `limit + 1` once the client is over budget.
    Freeze,
}

/// Limit and window for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub limit: u32,
    pub window: Duration,
    pub reject_policy: RejectPolicy,
}

impl AdmissionPolicy {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            reject_policy: RejectPolicy::Count,
        }
    }

    pub fn with_reject_policy(mut self, reject_policy: RejectPolicy) -> Self {
        self.reject_policy = reject_policy;
        self
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::new(60, Duration::from_millis(60_000))
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Reject,
}

impl Decision {
    pub fn is_admitted(self) -> bool {
        matches!(self, Decision::Admit)
    }

    /// Label used for metrics and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Admit => "admit",
            Decision::Reject => "reject",
        }
    }
}

/// Per-key window state.
#[derive(Debug, Clone, Copy)]
struct ClientWindowState {
    count: u32,
    window_start: Instant,
}

impl ClientWindowState {
    fn fresh(now: Instant) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }
}

/// Point-in-time view of a controller, served by the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionStats {
    pub limit: u32,
    pub window_ms: u64,
    pub reject_policy: RejectPolicy,
    pub tracked_keys: usize,
}

/// Admits at most `limit` requests per client key per window.
#[derive(Debug)]
pub struct AdmissionController<C: Clock = SystemClock> {
    windows: DashMap<String, ClientWindowState>,
    policy: AdmissionPolicy,
    clock: C,
}

impl AdmissionController {
    /// Create a controller on the system clock.
    pub fn new(policy: AdmissionPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: Clock> AdmissionController<C> {
    pub fn with_clock(policy: AdmissionPolicy, clock: C) -> Self {
        Self {
            windows: DashMap::new(),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Record a request for `client_key` and return whether it is admitted.
    pub fn check_and_record(&self, client_key: &str) -> bool {
        self.decide(client_key).is_admitted()
    }

    /// Record a request for `client_key` and return the decision.
    pub fn decide(&self, client_key: &str) -> Decision {
        self.record(client_key).0
    }

    /// Record a request for `client_key`, returning the decision together with
    /// the count stored for the key once this request is applied.
    pub fn record(&self, client_key: &str) -> (Decision, u32) {
        let now = self.clock.now();

        match self.windows.entry(client_key.to_owned()) {
            Entry::Vacant(vacant) => {
                vacant.insert(ClientWindowState::fresh(now));
                (Decision::Admit, 1)
            }
            Entry::Occupied(mut occupied) => {
                let state = occupied.get_mut();

                if now.saturating_duration_since(state.window_start) > self.policy.window {
                    *state = ClientWindowState::fresh(now);
                    return (Decision::Admit, state.count);
                }

                let next = state.count.saturating_add(1);
                let decision = if next > self.policy.limit {
                    state.count = match self.policy.reject_policy {
                        RejectPolicy::Count => next,
                        RejectPolicy::Freeze => next.min(self.policy.limit.saturating_add(1)),
                    };
                    Decision::Reject
                } else {
                    state.count = next;
                    Decision::Admit
                };
                (decision, state.count)
            }
        }
    }

    /// Current count stored for `client_key`, if any.
    pub fn count(&self, client_key: &str) -> Option<u32> {
        self.windows.get(client_key).map(|state| state.count)
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Remove entries whose window started more than `retention` ago.
    ///
    /// Returns the number of evicted entries.
    pub fn sweep(&self, retention: Duration) -> usize {
        let now = self.clock.now();
        let mut evicted = 0;
        self.windows.retain(|_, state| {
            let keep = now.saturating_duration_since(state.window_start) <= retention;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    pub fn snapshot(&self) -> AdmissionStats {
        AdmissionStats {
            limit: self.policy.limit,
            window_ms: u64::try_from(self.policy.window.as_millis()).unwrap_or(u64::MAX),
            reject_policy: self.policy.reject_policy,
            tracked_keys: self.windows.len(),
        }
    }
}
