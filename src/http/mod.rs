//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, tracing, timeout)
//!     → admission middleware (protected routes only)
//!     → recipes / speech handlers
//!     → response.rs (errors rendered as JSON)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::{AppState, HttpServer, ServerError};
