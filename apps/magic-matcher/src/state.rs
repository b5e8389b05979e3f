use std::sync::Arc;

use domain_vector::MilvusClient;
use tokio::sync::RwLock;

use crate::config::Settings;

/// Application state shared by handlers and lifecycle hooks
///
/// The Milvus slot is empty until `MilvusDependency` starts and again after
/// it shuts down.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    milvus: Arc<RwLock<Option<Arc<MilvusClient>>>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            milvus: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn milvus(&self) -> Option<Arc<MilvusClient>> {
        self.milvus.read().await.clone()
    }

    /// Store `client`, returning the one it replaces.
    pub async fn set_milvus(&self, client: MilvusClient) -> Option<Arc<MilvusClient>> {
        self.milvus.write().await.replace(Arc::new(client))
    }

    pub async fn take_milvus(&self) -> Option<Arc<MilvusClient>> {
        self.milvus.write().await.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::milvus::MilvusConfig;
    use domain_vector::MilvusClientConfig;

    #[tokio::test]
    async fn test_milvus_slot() {
        let state = AppState::new(Settings::for_tests(MilvusConfig::new("milvus", 19121, "items")));
        assert!(state.milvus().await.is_none());

        let client = MilvusClient::new(MilvusClientConfig::new("http://milvus:19121")).unwrap();
        assert!(state.set_milvus(client).await.is_none());
        assert!(state.milvus().await.is_some());

        // Clones share the slot
        let other = state.clone();
        assert!(other.take_milvus().await.is_some());
        assert!(state.milvus().await.is_none());
    }
}
