use std::time::Duration;

use core_config::milvus::{MilvusConfig, SocketFamily};

/// Construction parameters for [`MilvusClient`](super::MilvusClient)
#[derive(Debug, Clone)]
pub struct MilvusClientConfig {
    /// e.g. `http://milvus:19121`
    pub base_url: String,
    pub socket_family: SocketFamily,
    /// Hard cap on concurrent requests (and idle connections kept) per host
    pub connection_pool_size: usize,
    /// `None` leaves requests without a forced timeout
    pub request_timeout: Option<Duration>,
}

impl MilvusClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            socket_family: SocketFamily::default(),
            connection_pool_size: MilvusConfig::DEFAULT_POOL_SIZE,
            request_timeout: None,
        }
    }

    pub fn with_socket_family(mut self, family: SocketFamily) -> Self {
        self.socket_family = family;
        self
    }

    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.connection_pool_size = size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl From<&MilvusConfig> for MilvusClientConfig {
    fn from(settings: &MilvusConfig) -> Self {
        Self {
            base_url: settings.base_url(),
            socket_family: settings.socket_family,
            connection_pool_size: settings.connection_pool_size,
            request_timeout: settings.timeout_secs.map(Duration::from_secs),
        }
    }
}
