//! Ordered startup and shutdown of the service's dependencies.
//!
//! Dependencies start in registration order and stop in reverse. A failed
//! startup rolls everything back before the failure is returned.

use async_trait::async_trait;
use domain_vector::{MilvusClient, MilvusClientConfig};
use eyre::WrapErr;
use tracing::{error, info, warn};

use crate::state::AppState;

/// A process-scoped resource with startup and shutdown hooks
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dependency: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_startup(&self, state: &AppState) -> eyre::Result<()>;

    /// Must tolerate being called for a dependency that never started.
    async fn on_shutdown(&self, state: &AppState) -> eyre::Result<()>;
}

pub struct Lifecycle {
    dependencies: Vec<Box<dyn Dependency>>,
}

impl Lifecycle {
    pub fn new(dependencies: Vec<Box<dyn Dependency>>) -> Self {
        Self { dependencies }
    }

    /// `BaseDependency`, then `MilvusDependency`
    pub fn standard() -> Self {
        Self::new(vec![Box::new(BaseDependency), Box::new(MilvusDependency)])
    }

    pub async fn startup(&self, state: &AppState) -> eyre::Result<()> {
        for dependency in &self.dependencies {
            if let Err(e) = dependency.on_startup(state).await {
                error!(dependency = dependency.name(), "Dependency failed to start: {:#}", e);

                // The startup error is what the caller needs; rollback failures are only logged
                if let Err(rollback) = self.shutdown(state).await {
                    warn!("Rollback after failed startup also failed: {:#}", rollback);
                }

                return Err(e.wrap_err(format!("Failed to start {}", dependency.name())));
            }
        }

        info!(count = self.dependencies.len(), "All dependencies started");
        Ok(())
    }

    /// Run every shutdown hook in reverse order and return the first failure.
    pub async fn shutdown(&self, state: &AppState) -> eyre::Result<()> {
        let mut first_error = None;

        for dependency in self.dependencies.iter().rev() {
            if let Err(e) = dependency.on_shutdown(state).await {
                error!(dependency = dependency.name(), "Dependency failed to shut down: {:#}", e);
                first_error
                    .get_or_insert(e.wrap_err(format!("Failed to stop {}", dependency.name())));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Marks the application instance itself in the logs.
pub struct BaseDependency;

#[async_trait]
impl Dependency for BaseDependency {
    fn name(&self) -> &'static str {
        "base"
    }

    async fn on_startup(&self, state: &AppState) -> eyre::Result<()> {
        info!(
            name = state.settings.app.name,
            version = state.settings.app.version,
            "App instance: start"
        );
        Ok(())
    }

    async fn on_shutdown(&self, _state: &AppState) -> eyre::Result<()> {
        info!("App instance: shutdown");
        Ok(())
    }
}

/// Owns the shared Milvus client stored in [`AppState`].
pub struct MilvusDependency;

#[async_trait]
impl Dependency for MilvusDependency {
    fn name(&self) -> &'static str {
        "milvus"
    }

    async fn on_startup(&self, state: &AppState) -> eyre::Result<()> {
        let settings = &state.settings.milvus;
        info!(
            base_url = %settings.base_url(),
            collection = %settings.collection_nm,
            "Milvus dependency: start"
        );

        let client = MilvusClient::new(MilvusClientConfig::from(settings))
            .wrap_err("Failed to create Milvus client")?;

        if let Some(previous) = state.set_milvus(client).await {
            previous.close().await;
        }
        Ok(())
    }

    async fn on_shutdown(&self, state: &AppState) -> eyre::Result<()> {
        info!("Milvus dependency: shutdown");
        if let Some(client) = state.take_milvus().await {
            client.close().await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use core_config::milvus::MilvusConfig;
    use eyre::eyre;
    use mockall::Sequence;

    fn state() -> AppState {
        AppState::new(Settings::for_tests(MilvusConfig::new("127.0.0.1", 19121, "items")))
    }

    fn named(name: &'static str) -> MockDependency {
        let mut dependency = MockDependency::new();
        dependency.expect_name().return_const(name);
        dependency
    }

    fn has_cause(err: &eyre::Report, message: &str) -> bool {
        err.chain().any(|cause| cause.to_string() == message)
    }

    #[tokio::test]
    async fn test_startup_in_order_shutdown_in_reverse() {
        let mut seq = Sequence::new();
        let mut first = named("first");
        let mut second = named("second");

        first
            .expect_on_startup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        second
            .expect_on_startup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        second
            .expect_on_shutdown()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        first
            .expect_on_shutdown()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let lifecycle = Lifecycle::new(vec![Box::new(first), Box::new(second)]);
        let state = state();
        lifecycle.startup(&state).await.unwrap();
        lifecycle.shutdown(&state).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_startup_rolls_back_and_keeps_cause() {
        let mut seq = Sequence::new();
        let mut first = named("first");
        let mut second = named("second");
        let mut third = named("third");

        first
            .expect_on_startup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        second
            .expect_on_startup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(eyre!("boom")));
        third.expect_on_startup().never();

        // Full rollback, including the dependency that never started
        third
            .expect_on_shutdown()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        second
            .expect_on_shutdown()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(eyre!("cleanup failed")));
        first
            .expect_on_shutdown()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let lifecycle = Lifecycle::new(vec![Box::new(first), Box::new(second), Box::new(third)]);
        let err = lifecycle.startup(&state()).await.unwrap_err();

        assert!(has_cause(&err, "boom"));
        assert!(!has_cause(&err, "cleanup failed"));
        assert_eq!(err.to_string(), "Failed to start second");
    }

    #[tokio::test]
    async fn test_shutdown_runs_all_hooks_and_returns_first_error() {
        let mut first = named("first");
        let mut second = named("second");

        first
            .expect_on_shutdown()
            .times(1)
            .returning(|_| Err(eyre!("first failed")));
        second
            .expect_on_shutdown()
            .times(1)
            .returning(|_| Err(eyre!("second failed")));

        let lifecycle = Lifecycle::new(vec![Box::new(first), Box::new(second)]);
        let err = lifecycle.shutdown(&state()).await.unwrap_err();

        // Reverse order: "second" stops first
        assert!(has_cause(&err, "second failed"));
        assert!(!has_cause(&err, "first failed"));
    }

    #[tokio::test]
    async fn test_milvus_dependency_owns_client() {
        let state = state();
        let lifecycle = Lifecycle::standard();

        lifecycle.startup(&state).await.unwrap();
        let client = state.milvus().await.expect("client stored on startup");
        assert!(!client.is_closed());
        assert_eq!(client.pool_size(), 100);
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:19121/");

        lifecycle.shutdown(&state).await.unwrap();
        assert!(client.is_closed());
        assert!(state.milvus().await.is_none());

        // Nothing left to close
        lifecycle.shutdown(&state).await.unwrap();
    }

    #[tokio::test]
    async fn test_milvus_dependency_rejects_bad_config() {
        let state = AppState::new(Settings::for_tests(
            MilvusConfig::new("127.0.0.1", 19121, "items").with_pool_size(0),
        ));

        let err = Lifecycle::standard().startup(&state).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to start milvus");
        assert!(has_cause(&err, "Failed to create Milvus client"));
        assert!(state.milvus().await.is_none());
    }
}
