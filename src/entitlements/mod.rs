//! Subscription entitlements.
//!
//! # Data Flow
//! ```text
//! Premium recipe request (x-user-id header)
//!     → cache.rs (premium flag, free views remaining)
//!     → Access decision consumed by the recipe handler
//!
//! Subscription provider updates:
//!     → admin API → cache.rs (set premium / grant free views)
//! ```

pub mod cache;

pub use cache::{Access, Entitlement, EntitlementCache, EntitlementSummary};

/// Header carrying the caller's user id, set by the auth layer in front of us.
pub const USER_ID_HEADER: &str = "x-user-id";
