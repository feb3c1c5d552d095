//! Entitlement caching.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Subscription state of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub premium: bool,
    pub free_recipes_remaining: u32,
}

/// Result of asking to open a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Opened with a free view; `remaining` views are left.
    GrantedFree { remaining: u32 },
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementSummary {
    pub premium: usize,
    pub free: usize,
}

/// A thread-safe cache of entitlements keyed by user id.
#[derive(Clone)]
pub struct EntitlementCache {
    inner: Arc<DashMap<String, Entitlement>>,
    free_recipes: u32,
}

impl EntitlementCache {
    /// Create an empty cache; unseen users start with `free_recipes` free views.
    pub fn new(free_recipes: u32) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            free_recipes,
        }
    }

    fn initial(&self) -> Entitlement {
        Entitlement {
            premium: false,
            free_recipes_remaining: self.free_recipes,
        }
    }

    /// Entitlement of `user`, or the starting entitlement if never seen.
    pub fn get(&self, user: &str) -> Entitlement {
        self.inner
            .get(user)
            .map(|r| *r.value())
            .unwrap_or_else(|| self.initial())
    }

    pub fn set_premium(&self, user: &str, premium: bool) -> Entitlement {
        let initial = self.initial();
        let mut entry = self.inner.entry(user.to_string()).or_insert(initial);
        entry.premium = premium;
        *entry
    }

    /// Add `count` free views to `user`.
    pub fn grant_free(&self, user: &str, count: u32) -> Entitlement {
        let initial = self.initial();
        let mut entry = self.inner.entry(user.to_string()).or_insert(initial);
        entry.free_recipes_remaining = entry.free_recipes_remaining.saturating_add(count);
        *entry
    }

    /// Decide whether `user` may open a recipe, spending a free view if needed.
    pub fn authorize(&self, user: &str, premium_content: bool) -> Access {
        if !premium_content {
            return Access::Granted;
        }

        let initial = self.initial();
        let mut entry = self.inner.entry(user.to_string()).or_insert(initial);
        if entry.premium {
            Access::Granted
        } else if entry.free_recipes_remaining > 0 {
            entry.free_recipes_remaining -= 1;
            Access::GrantedFree {
                remaining: entry.free_recipes_remaining,
            }
        } else {
            Access::Denied
        }
    }

    pub fn summary(&self) -> EntitlementSummary {
        let premium = self.inner.iter().filter(|r| r.value().premium).count();
        EntitlementSummary {
            premium,
            free: self.inner.len() - premium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_views_run_out() {
        let cache = EntitlementCache::new(2);

        assert_eq!(cache.authorize("ana", true), Access::GrantedFree { remaining: 1 });
        assert_eq!(cache.authorize("ana", true), Access::GrantedFree { remaining: 0 });
        assert_eq!(cache.authorize("ana", true), Access::Denied);

        // Free recipes never spend views.
        assert_eq!(cache.authorize("ana", false), Access::Granted);
        assert_eq!(cache.get("ana").free_recipes_remaining, 0);
    }

    #[test]
    fn test_premium_users_are_always_granted() {
        let cache = EntitlementCache::new(0);
        cache.set_premium("luis", true);

        for _ in 0..5 {
            assert_eq!(cache.authorize("luis", true), Access::Granted);
        }
        assert_eq!(cache.summary(), EntitlementSummary { premium: 1, free: 0 });
    }

    #[test]
    fn test_unseen_user_defaults() {
        let cache = EntitlementCache::new(3);
        let e = cache.get("nobody");
        assert!(!e.premium);
        assert_eq!(e.free_recipes_remaining, 3);
        assert_eq!(cache.summary(), EntitlementSummary { premium: 0, free: 0 });
    }

    #[test]
    fn test_grant_free_adds_views() {
        let cache = EntitlementCache::new(0);
        assert_eq!(cache.authorize("eva", true), Access::Denied);

        let e = cache.grant_free("eva", 2);
        assert_eq!(e.free_recipes_remaining, 2);
        assert_eq!(cache.authorize("eva", true), Access::GrantedFree { remaining: 1 });
    }
}
