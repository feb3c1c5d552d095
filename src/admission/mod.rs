//! Request admission subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request on a protected route:
//!     → client_key.rs (derive key from forwarded-address header)
//!     → middleware.rs (apply unknown-client policy)
//!     → controller.rs (fixed-window count per key, admit/reject)
//!     → handler on admit, 429 on reject
//!
//! Background:
//!     sweeper.rs periodically evicts expired windows from every controller
//! ```
//!
//! # Design Decisions
//! - One controller instance per protected route group; instances never share state
//! - Window is anchored at the first request of the window, not a sliding log
//! - Rejected requests still count unless the route opts into `RejectPolicy::Freeze`
//! - Controllers never fail; the decision is the whole signal

pub mod client_key;
pub mod clock;
pub mod controller;
pub mod middleware;
pub mod sweeper;

pub use client_key::{extract_client_key, ClientKey, UNKNOWN_CLIENT_KEY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{AdmissionController, AdmissionPolicy, AdmissionStats, Decision, RejectPolicy};
pub use middleware::{admission_middleware, AdmissionCheck, RouteGuard, SharedClock, UnknownClientPolicy};
pub use sweeper::Sweeper;
