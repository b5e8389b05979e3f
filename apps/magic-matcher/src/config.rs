use core_config::{AppInfo, FromEnv, milvus::MilvusConfig, server::ServerConfig};

pub use core_config::Environment;

/// Public service title; the slug endpoint derives from it.
pub const APP_TITLE: &str = "magic-matcher-svc";

/// Service settings, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Settings {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub milvus: MilvusConfig,
}

impl Settings {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080 by default
        // APP_MILVUS_HOST, APP_MILVUS_PORT and APP_MILVUS_COLLECTION_NM are required
        let milvus = MilvusConfig::from_env()?;

        Ok(Self {
            app: AppInfo {
                name: APP_TITLE,
                version: env!("CARGO_PKG_VERSION"),
            },
            environment,
            server,
            milvus,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(milvus: MilvusConfig) -> Self {
        Self {
            app: AppInfo {
                name: APP_TITLE,
                version: env!("CARGO_PKG_VERSION"),
            },
            environment: Environment::Development,
            server: ServerConfig::new("127.0.0.1".to_string(), 0),
            milvus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_env() {
        temp_env::with_vars(
            [
                ("APP_MILVUS_HOST", Some("milvus")),
                ("APP_MILVUS_PORT", Some("19121")),
                ("APP_MILVUS_COLLECTION_NM", Some("items")),
                ("APP_API_PREFIX", Some("/matcher")),
                ("APP_ENV", None),
            ],
            || {
                let settings = Settings::from_env().unwrap();
                assert_eq!(settings.app.name, "magic-matcher-svc");
                assert_eq!(settings.app.slug(), "magic-matcher-svc");
                assert_eq!(settings.environment, Environment::Development);
                assert_eq!(settings.server.api_prefix, "/matcher");
                assert_eq!(settings.milvus.base_url(), "http://milvus:19121");
                assert_eq!(settings.milvus.collection_nm, "items");
            },
        );
    }

    #[test]
    fn test_settings_require_milvus_host() {
        temp_env::with_vars(
            [
                ("APP_MILVUS_HOST", None),
                ("APP_MILVUS_PORT", Some("19121")),
                ("APP_MILVUS_COLLECTION_NM", Some("items")),
            ],
            || {
                let err = Settings::from_env().unwrap_err();
                assert!(err.to_string().contains("APP_MILVUS_HOST"));
            },
        );
    }
}
