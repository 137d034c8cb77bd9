//! Centralized configuration for Artikel.
//!
//! Holds the service identifiers needed to reach the hosted document
//! database and the HTTP settings used for every request.

use std::time::Duration;

use crate::tracing_setup::LogLevel;

/// Central configuration for all Artikel components.
///
/// Groups the service record and network settings. Supports environment
/// variable overrides for credential injection.
#[derive(Debug, Clone, Default)]
pub struct ArtikelConfig {
    pub firebase: FirebaseConfig,
    pub network: NetworkConfig,
    /// Console level handed to `init_tracing`
    pub log_level: LogLevel,
}

/// Identifiers of the hosted project.
///
/// Opaque to this crate apart from `project_id`, which addresses the
/// database, and `api_key`, which is attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    /// Browser API key, sent as the `key` query parameter when present
    pub api_key: Option<String>,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            auth_domain: "dutcharticlesapp.firebaseapp.com".to_string(),
            project_id: "dutcharticlesapp".to_string(),
            storage_bucket: "dutcharticlesapp.firebasestorage.app".to_string(),
            messaging_sender_id: "294220643612".to_string(),
            app_id: "1:294220643612:web:2f4c554ce912e6fc528ed9".to_string(),
        }
    }
}

/// HTTP settings for talking to the document database REST API.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Base URL of the REST API
    pub endpoint: String,
    /// Database within the project
    pub database_id: String,
    /// Upper bound for one query round trip
    pub request_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://firestore.googleapis.com".to_string(),
            database_id: "(default)".to_string(),
            request_timeout: Duration::from_secs(30),
            user_agent: "artikel/0.1.0",
        }
    }
}

impl ArtikelConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Unset variables keep their defaults; an unparsable timeout or log
    /// level is ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(api_key) = std::env::var("ARTIKEL_FIREBASE_API_KEY") {
            config.firebase.api_key = Some(api_key);
        }

        if let Ok(project_id) = std::env::var("ARTIKEL_FIREBASE_PROJECT_ID") {
            config.firebase.project_id = project_id;
        }

        if let Ok(app_id) = std::env::var("ARTIKEL_FIREBASE_APP_ID") {
            config.firebase.app_id = app_id;
        }

        if let Ok(sender_id) = std::env::var("ARTIKEL_FIREBASE_SENDER_ID") {
            config.firebase.messaging_sender_id = sender_id;
        }

        if let Ok(bucket) = std::env::var("ARTIKEL_FIREBASE_STORAGE_BUCKET") {
            config.firebase.storage_bucket = bucket;
        }

        if let Ok(auth_domain) = std::env::var("ARTIKEL_FIREBASE_AUTH_DOMAIN") {
            config.firebase.auth_domain = auth_domain;
        }

        if let Ok(endpoint) = std::env::var("ARTIKEL_ENDPOINT") {
            config.network.endpoint = endpoint;
        }

        if let Ok(timeout) = std::env::var("ARTIKEL_REQUEST_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.network.request_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(level) = std::env::var("ARTIKEL_LOG_LEVEL") {
            if let Ok(level) = level.parse::<LogLevel>() {
                config.log_level = level;
            }
        }

        config
    }

    /// Creates a configuration aimed at a local fake of the REST API.
    pub fn for_testing(endpoint: impl Into<String>) -> Self {
        Self {
            firebase: FirebaseConfig {
                api_key: Some("test-key".to_string()),
                project_id: "artikel-test".to_string(),
                ..Default::default()
            },
            network: NetworkConfig {
                endpoint: endpoint.into(),
                request_timeout: Duration::from_secs(5),
                ..Default::default()
            },
            log_level: LogLevel::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ArtikelConfig::default();

        assert_eq!(config.firebase.project_id, "dutcharticlesapp");
        assert_eq!(config.firebase.api_key, None);
        assert_eq!(config.network.endpoint, "https://firestore.googleapis.com");
        assert_eq!(config.network.database_id, "(default)");
        assert_eq!(config.network.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_testing_preset() {
        let config = ArtikelConfig::for_testing("http://127.0.0.1:9000");

        assert_eq!(config.network.endpoint, "http://127.0.0.1:9000");
        assert_eq!(config.firebase.project_id, "artikel-test");
        assert_eq!(config.firebase.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.firebase.app_id, FirebaseConfig::default().app_id);
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("ARTIKEL_FIREBASE_API_KEY", "abc123");
            std::env::set_var("ARTIKEL_FIREBASE_PROJECT_ID", "other-project");
            std::env::set_var("ARTIKEL_ENDPOINT", "http://localhost:8080");
            std::env::set_var("ARTIKEL_REQUEST_TIMEOUT", "7");
            std::env::set_var("ARTIKEL_LOG_LEVEL", "WARN");
        }

        let config = ArtikelConfig::from_env();

        assert_eq!(config.firebase.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.firebase.project_id, "other-project");
        assert_eq!(config.network.endpoint, "http://localhost:8080");
        assert_eq!(config.network.request_timeout, Duration::from_secs(7));
        assert_eq!(config.log_level, LogLevel::Warn);

        unsafe {
            std::env::set_var("ARTIKEL_REQUEST_TIMEOUT", "soon");
            std::env::set_var("ARTIKEL_LOG_LEVEL", "loud");
        }
        let config = ArtikelConfig::from_env();
        assert_eq!(config.network.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, LogLevel::Info);

        // Cleanup
        unsafe {
            std::env::remove_var("ARTIKEL_FIREBASE_API_KEY");
            std::env::remove_var("ARTIKEL_FIREBASE_PROJECT_ID");
            std::env::remove_var("ARTIKEL_ENDPOINT");
            std::env::remove_var("ARTIKEL_REQUEST_TIMEOUT");
            std::env::remove_var("ARTIKEL_LOG_LEVEL");
        }
    }
}
