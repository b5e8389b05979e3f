//! # Axum Helpers
//!
//! Shared pieces for the service's HTTP surface.
//!
//! - **[`errors`]**: `AppError`, `ErrorCode` and the JSON error body
//! - **[`server`]**: router assembly, health/readiness helpers, graceful shutdown

pub mod errors;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use server::{
    HealthCheckFuture, HealthResponse, create_app, create_router, health_router,
    run_health_checks, shutdown_signal,
};
