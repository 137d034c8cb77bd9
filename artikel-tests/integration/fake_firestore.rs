//! Local fake of the `runQuery` REST endpoint.
//!
//! Evaluates single equality filters over stored wire-format documents and
//! records every request it receives.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use futures::StreamExt;
use futures::stream;
use parking_lot::Mutex;
use serde_json::{Value, json};

const READ_TIME: &str = "2024-05-01T12:00:00.000000Z";

/// How the fake answers queries.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Evaluate the query over stored documents
    Serve,
    /// Reply 403 PERMISSION_DENIED
    Deny,
    /// Reply 200 with a body that is not a runQuery response
    Garbage,
    /// Reply 200 with an error element in the result array
    StreamError,
    /// Reply 500 and drop the connection halfway through the body
    BrokenErrorBody,
    /// Serve after sleeping
    Slow(Duration),
}

/// A request seen by the fake.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub project: String,
    pub database: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Debug)]
struct FakeState {
    documents: Mutex<Vec<(String, Value)>>,
    behavior: Mutex<Behavior>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Handle to a running fake server.
#[derive(Debug, Clone)]
pub struct FakeFirestore {
    addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeFirestore {
    /// Starts the fake on an ephemeral local port.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState {
            documents: Mutex::new(Vec::new()),
            behavior: Mutex::new(Behavior::Serve),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(
                "/v1/projects/{project}/databases/{database}/{action}",
                post(run_query),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL to configure the client with.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stores a document of the `words` collection.
    pub fn add_word(&self, id: &str, word: &str, article: &str) {
        self.add_document(
            "words",
            json!({
                "name": format!("projects/artikel-test/databases/(default)/documents/words/{id}"),
                "fields": {
                    "word": { "stringValue": word },
                    "article": { "stringValue": article }
                },
                "createTime": "2024-04-01T08:30:00.000000Z",
                "updateTime": "2024-04-01T08:30:00.000000Z"
            }),
        );
    }

    /// Stores an arbitrary wire-format document.
    pub fn add_document(&self, collection: &str, document: Value) {
        self.state
            .documents
            .lock()
            .push((collection.to_string(), document));
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.state.behavior.lock() = behavior;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }
}

async fn run_query(
    State(state): State<Arc<FakeState>>,
    Path((project, database, action)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if action != "documents:runQuery" {
        return StatusCode::NOT_FOUND.into_response();
    }

    state.requests.lock().push(RecordedRequest {
        project,
        database,
        api_key: params.get("key").cloned(),
        body: body.clone(),
    });

    let behavior = state.behavior.lock().clone();
    match behavior {
        Behavior::Serve => {}
        Behavior::Deny => {
            let error = json!({
                "error": {
                    "code": 403,
                    "message": "Missing or insufficient permissions.",
                    "status": "PERMISSION_DENIED"
                }
            });
            return (StatusCode::FORBIDDEN, Json(error)).into_response();
        }
        Behavior::Garbage => {
            return (StatusCode::OK, "<html>maintenance</html>").into_response();
        }
        Behavior::StreamError => {
            let entries = json!([{
                "error": {
                    "code": 503,
                    "message": "The service is currently unavailable.",
                    "status": "UNAVAILABLE"
                }
            }]);
            return (StatusCode::OK, Json(entries)).into_response();
        }
        Behavior::BrokenErrorBody => {
            // Status and first chunk go out before the body fails
            let head = stream::once(async { Ok(Bytes::from_static(b"{\"error\": {")) });
            let tail = stream::once(async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err::<Bytes, _>(std::io::Error::other("connection reset"))
            });
            let body = Body::from_stream(head.chain(tail));
            return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
        }
        Behavior::Slow(delay) => tokio::time::sleep(delay).await,
    }

    let structured = &body["structuredQuery"];
    let collection = structured["from"][0]["collectionId"].as_str().unwrap_or_default();
    let filter = &structured["where"]["fieldFilter"];
    let field = filter["field"]["fieldPath"].as_str();

    let entries: Vec<Value> = state
        .documents
        .lock()
        .iter()
        .filter(|(coll, _)| coll == collection)
        .filter(|(_, doc)| match field {
            Some(field) => doc["fields"][field] == filter["value"],
            None => true,
        })
        .map(|(_, doc)| json!({ "document": doc, "readTime": READ_TIME }))
        .collect();

    if entries.is_empty() {
        return Json(json!([{ "readTime": READ_TIME }])).into_response();
    }

    Json(Value::Array(entries)).into_response()
}
