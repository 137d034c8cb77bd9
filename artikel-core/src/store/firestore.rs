//! Hosted document database client over the REST API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use super::DocumentStore;
use crate::config::ArtikelConfig;
use crate::document::{Document, WireDocument};
use crate::errors::{InitError, RequestError};
use crate::query::Query;

/// Initialized handle to the remote document database.
///
/// Created once at startup and shared by every lookup. Cloning is cheap and
/// clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: reqwest::Client,
    run_query_url: Url,
}

/// One element of the `runQuery` response array.
///
/// Entries without a document only report progress, e.g. the lone
/// `readTime` entry sent for an empty result. A failure after the status
/// line has been sent arrives as an entry carrying `error`.
#[derive(Debug, Deserialize)]
struct RunQueryEntry {
    document: Option<WireDocument>,
    error: Option<ErrorStatus>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl FirestoreClient {
    /// Builds the handle from configuration.
    ///
    /// No request is sent; reachability surfaces on the first query.
    ///
    /// # Errors
    /// - `InitError::MissingProjectId` - No project configured
    /// - `InitError::InvalidEndpoint` - Endpoint is not a base URL
    /// - `InitError::HttpClient` - HTTP client could not be built
    pub fn connect(config: &ArtikelConfig) -> Result<Self, InitError> {
        let firebase = &config.firebase;
        let network = &config.network;

        if firebase.project_id.is_empty() {
            return Err(InitError::MissingProjectId);
        }

        let run_query_url = run_query_url(config)?;

        let client = reqwest::Client::builder()
            .timeout(network.request_timeout)
            .user_agent(network.user_agent)
            .build()
            .map_err(|e| InitError::HttpClient {
                reason: e.to_string(),
            })?;

        info!(
            project_id = %firebase.project_id,
            app_id = %firebase.app_id,
            endpoint = %network.endpoint,
            "Document database client initialized"
        );

        Ok(Self {
            client,
            run_query_url,
        })
    }
}

fn run_query_url(config: &ArtikelConfig) -> Result<Url, InitError> {
    let endpoint = &config.network.endpoint;
    let invalid = |reason: String| InitError::InvalidEndpoint {
        endpoint: endpoint.clone(),
        reason,
    };

    let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;

    url.path_segments_mut()
        .map_err(|()| invalid("cannot be a base URL".to_string()))?
        .pop_if_empty()
        .extend([
            "v1",
            "projects",
            config.firebase.project_id.as_str(),
            "databases",
            config.network.database_id.as_str(),
            "documents:runQuery",
        ]);

    if let Some(api_key) = &config.firebase.api_key {
        url.query_pairs_mut().append_pair("key", api_key);
    }

    Ok(url)
}

/// Collects the documents of a successful reply in service order.
///
/// Any error entry fails the whole query, even if documents preceded it.
fn collect_documents(
    status: reqwest::StatusCode,
    entries: Vec<RunQueryEntry>,
) -> Result<Vec<Document>, RequestError> {
    let mut documents = Vec::new();

    for entry in entries {
        if let Some(error) = entry.error {
            return Err(RequestError::Service {
                status: error.code.unwrap_or(status.as_u16()),
                code: error.status,
                message: error.message,
            });
        }
        if let Some(document) = entry.document {
            documents.push(Document::try_from(document)?);
        }
    }

    Ok(documents)
}

/// Builds a service error from a non-success reply.
fn service_error(status: reqwest::StatusCode, body: &str) -> RequestError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => RequestError::Service {
            status: status.as_u16(),
            code: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => RequestError::Service {
            status: status.as_u16(),
            code: None,
            message: if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("no reason").to_string()
            } else {
                body.trim().to_string()
            },
        },
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, RequestError> {
        debug!(collection = query.collection_id(), "Sending runQuery");

        let response = self
            .client
            .post(self.run_query_url.clone())
            .json(&query.to_structured_query())
            .send()
            .await
            .map_err(|e| {
                let err = RequestError::from(e);
                warn!(collection = query.collection_id(), error = %err, "runQuery request failed");
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let err = match response.text().await {
                Ok(body) => service_error(status, &body),
                Err(e) => RequestError::Service {
                    status: status.as_u16(),
                    code: None,
                    message: format!("unreadable error body: {e}"),
                },
            };
            warn!(collection = query.collection_id(), error = %err, "runQuery rejected");
            return Err(err);
        }

        let entries: Vec<RunQueryEntry> = response.json().await?;

        let documents = collect_documents(status, entries).inspect_err(|err| {
            warn!(collection = query.collection_id(), error = %err, "runQuery failed mid-stream");
        })?;

        debug!(
            collection = query.collection_id(),
            matches = documents.len(),
            "runQuery completed"
        );

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_query_url() {
        let config = ArtikelConfig::default();
        let client = FirestoreClient::connect(&config).unwrap();

        assert_eq!(
            client.run_query_url.as_str(),
            "https://firestore.googleapis.com/v1/projects/dutcharticlesapp/databases/(default)/documents:runQuery"
        );
    }

    #[test]
    fn test_run_query_url_with_key_and_trailing_slash() {
        let config = ArtikelConfig::for_testing("http://127.0.0.1:8080/");
        let client = FirestoreClient::connect(&config).unwrap();

        assert_eq!(
            client.run_query_url.as_str(),
            "http://127.0.0.1:8080/v1/projects/artikel-test/databases/(default)/documents:runQuery?key=test-key"
        );
    }

    #[test]
    fn test_connect_rejects_invalid_config() {
        let mut config = ArtikelConfig::default();
        config.firebase.project_id.clear();
        assert!(matches!(
            FirestoreClient::connect(&config),
            Err(InitError::MissingProjectId)
        ));

        let config = ArtikelConfig::for_testing("not a url");
        assert!(matches!(
            FirestoreClient::connect(&config),
            Err(InitError::InvalidEndpoint { .. })
        ));

        let config = ArtikelConfig::for_testing("mailto:ops@example.com");
        assert!(matches!(
            FirestoreClient::connect(&config),
            Err(InitError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_service_error_parsing() {
        let body = r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        let err = service_error(reqwest::StatusCode::FORBIDDEN, body);

        match err {
            RequestError::Service {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 403);
                assert_eq!(code.as_deref(), Some("PERMISSION_DENIED"));
                assert_eq!(message, "Missing or insufficient permissions.");
            }
            other => panic!("expected service error, got {other:?}"),
        }

        let err = service_error(reqwest::StatusCode::BAD_GATEWAY, "");
        assert!(matches!(
            err,
            RequestError::Service { status: 502, code: None, ref message } if message == "Bad Gateway"
        ));
    }

    fn entries(body: serde_json::Value) -> Vec<RunQueryEntry> {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_collect_skips_progress_entries() {
        let body = serde_json::json!([
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/words/huis",
                    "fields": { "article": { "stringValue": "het huis" } }
                },
                "readTime": "2024-05-01T12:00:00Z"
            },
            { "readTime": "2024-05-01T12:00:00Z", "skippedResults": 1 }
        ]);

        let documents = collect_documents(reqwest::StatusCode::OK, entries(body)).unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].string_field("article").unwrap(), Some("het huis"));
    }

    #[test]
    fn test_collect_fails_on_error_entry() {
        let body = serde_json::json!([
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/words/huis",
                    "fields": { "article": { "stringValue": "het huis" } }
                }
            },
            { "error": {
                "code": 503,
                "message": "The service is currently unavailable.",
                "status": "UNAVAILABLE"
            } }
        ]);

        match collect_documents(reqwest::StatusCode::OK, entries(body)) {
            Err(RequestError::Service {
                status,
                code,
                message,
            }) => {
                assert_eq!(status, 503);
                assert_eq!(code.as_deref(), Some("UNAVAILABLE"));
                assert_eq!(message, "The service is currently unavailable.");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_entry_without_code_keeps_http_status() {
        let body = serde_json::json!([{ "error": { "message": "aborted" } }]);

        assert!(matches!(
            collect_documents(reqwest::StatusCode::OK, entries(body)),
            Err(RequestError::Service { status: 200, code: None, .. })
        ));
    }
}
