pub mod monitor;

use axum::Router;

use crate::state::AppState;

/// Every route the service exposes, before the API prefix is applied.
pub fn routes(state: &AppState) -> Router {
    monitor::router(state.clone())
}
