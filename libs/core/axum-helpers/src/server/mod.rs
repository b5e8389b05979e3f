//! Server infrastructure: router assembly, health endpoints and shutdown.
//!
//! ```ignore
//! use axum_helpers::server::{create_app, create_router, health_router, shutdown_signal};
//!
//! let app = create_router(
//!     health_router(settings.app).merge(routes),
//!     &settings.server.api_prefix,
//! );
//! create_app(app, &settings.server, shutdown_signal()).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_app, create_router};
pub use health::{HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::shutdown_signal;
