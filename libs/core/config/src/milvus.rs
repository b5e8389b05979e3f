use crate::{env_or_default, env_parse, env_required, ConfigError, FromEnv};
use std::str::FromStr;

const ENV_PREFIX: &str = "APP_MILVUS_";

/// Address family used for outbound connections to Milvus
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SocketFamily {
    #[default]
    Ipv4,
    Ipv6,
}

impl FromStr for SocketFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ipv4" | "inet" | "af_inet" | "4" => Ok(SocketFamily::Ipv4),
            "ipv6" | "inet6" | "af_inet6" | "6" => Ok(SocketFamily::Ipv6),
            other => Err(format!("unknown socket family '{}'", other)),
        }
    }
}

/// Milvus connection settings (`APP_MILVUS_*`)
#[derive(Clone, Debug)]
pub struct MilvusConfig {
    pub host: String,
    pub port: u16,
    pub collection_nm: String,
    /// Request timeout in seconds. `None` means no timeout is forced on requests.
    pub timeout_secs: Option<u64>,
    pub connection_pool_size: usize,
    pub socket_family: SocketFamily,
}

impl MilvusConfig {
    pub const DEFAULT_POOL_SIZE: usize = 100;

    pub fn new(host: impl Into<String>, port: u16, collection_nm: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            collection_nm: collection_nm.into(),
            timeout_secs: None,
            connection_pool_size: Self::DEFAULT_POOL_SIZE,
            socket_family: SocketFamily::default(),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.connection_pool_size = size;
        self
    }

    pub fn with_socket_family(mut self, family: SocketFamily) -> Self {
        self.socket_family = family;
        self
    }

    /// `http://{host}:{port}`, IPv6 literals are bracketed
    pub fn base_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

fn key(name: &str) -> String {
    format!("{}{}", ENV_PREFIX, name)
}

impl FromEnv for MilvusConfig {
    /// Requires APP_MILVUS_HOST, APP_MILVUS_PORT and APP_MILVUS_COLLECTION_NM
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_required(&key("HOST"))?;
        let port = env_parse(&key("PORT"), &env_required(&key("PORT"))?)?;
        let collection_nm = env_required(&key("COLLECTION_NM"))?;

        let timeout_secs = match std::env::var(key("TIMEOUT")) {
            Ok(raw) if !raw.trim().is_empty() => Some(env_parse(&key("TIMEOUT"), &raw)?),
            _ => None,
        };

        let connection_pool_size = env_parse(
            &key("CONNECTION_POOL_SIZE"),
            &env_or_default(
                &key("CONNECTION_POOL_SIZE"),
                &Self::DEFAULT_POOL_SIZE.to_string(),
            ),
        )?;

        let socket_family = env_parse(
            &key("SOCKET_FAMILY"),
            &env_or_default(&key("SOCKET_FAMILY"), "ipv4"),
        )?;

        Ok(Self {
            host,
            port,
            collection_nm,
            timeout_secs,
            connection_pool_size,
            socket_family,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> [(&'static str, Option<&'static str>); 3] {
        [
            ("APP_MILVUS_HOST", Some("milvus.local")),
            ("APP_MILVUS_PORT", Some("19121")),
            ("APP_MILVUS_COLLECTION_NM", Some("items")),
        ]
    }

    #[test]
    fn test_milvus_config_from_env_defaults() {
        temp_env::with_vars(required(), || {
            temp_env::with_vars(
                [
                    ("APP_MILVUS_TIMEOUT", None::<&str>),
                    ("APP_MILVUS_CONNECTION_POOL_SIZE", None::<&str>),
                    ("APP_MILVUS_SOCKET_FAMILY", None::<&str>),
                ],
                || {
                    let config = MilvusConfig::from_env().unwrap();
                    assert_eq!(config.base_url(), "http://milvus.local:19121");
                    assert_eq!(config.collection_nm, "items");
                    assert_eq!(config.timeout_secs, None);
                    assert_eq!(config.connection_pool_size, 100);
                    assert_eq!(config.socket_family, SocketFamily::Ipv4);
                },
            );
        });
    }

    #[test]
    fn test_milvus_config_from_env_overrides() {
        temp_env::with_vars(required(), || {
            temp_env::with_vars(
                [
                    ("APP_MILVUS_TIMEOUT", Some("5")),
                    ("APP_MILVUS_CONNECTION_POOL_SIZE", Some("8")),
                    ("APP_MILVUS_SOCKET_FAMILY", Some("IPv6")),
                ],
                || {
                    let config = MilvusConfig::from_env().unwrap();
                    assert_eq!(config.timeout_secs, Some(5));
                    assert_eq!(config.connection_pool_size, 8);
                    assert_eq!(config.socket_family, SocketFamily::Ipv6);
                },
            );
        });
    }

    #[test]
    fn test_milvus_config_missing_host() {
        temp_env::with_var_unset("APP_MILVUS_HOST", || {
            let err = MilvusConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("APP_MILVUS_HOST"));
        });
    }

    #[test]
    fn test_milvus_config_invalid_port() {
        temp_env::with_vars(required(), || {
            temp_env::with_var("APP_MILVUS_PORT", Some("not-a-port"), || {
                let err = MilvusConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("APP_MILVUS_PORT"));
            });
        });
    }

    #[test]
    fn test_base_url_brackets_ipv6_literal() {
        let config = MilvusConfig::new("::1", 19121, "items");
        assert_eq!(config.base_url(), "http://[::1]:19121");
    }
}
