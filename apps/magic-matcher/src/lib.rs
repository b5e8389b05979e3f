//! magic-matcher service
//!
//! Wires the Milvus client into an axum process: settings from the
//! environment, ordered dependency startup/shutdown and the monitor routes.

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod server;
pub mod state;

pub use config::Settings;
pub use server::run;
pub use state::AppState;
