use axum_helpers::server::{create_app, create_router, shutdown_signal};
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::WrapErr;
use tracing::{error, info};

use crate::api;
use crate::config::Settings;
use crate::lifecycle::Lifecycle;
use crate::state::AppState;

/// Load settings, start dependencies, serve until SIGINT/SIGTERM, then stop
/// dependencies in reverse order.
pub async fn run() -> eyre::Result<()> {
    // Before any fallible operation so startup errors get colored reports
    install_color_eyre();

    let settings = Settings::from_env().wrap_err("Failed to load configuration")?;
    init_tracing(&settings.environment);

    let state = AppState::new(settings);
    let lifecycle = Lifecycle::standard();
    lifecycle.startup(&state).await?;

    let server = &state.settings.server;
    let app = create_router(api::routes(&state), &server.api_prefix);

    info!(
        name = state.settings.app.name,
        version = state.settings.app.version,
        "Starting service"
    );
    let served = create_app(app, server, shutdown_signal())
        .await
        .wrap_err("Server error");

    // Dependencies are released even when serving failed
    let stopped = lifecycle.shutdown(&state).await;
    if let Err(e) = &stopped {
        error!("Shutdown finished with errors: {:#}", e);
    }

    served?;
    stopped?;
    info!("Shutdown complete");
    Ok(())
}
