//! Wire-shape tests for the hosted-store gateway, driven against a
//! small in-process stand-in for the managed REST API.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use pista_server::store::{MessageStore, RestStore, StoreError};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Default)]
struct MockHost {
    rows: Vec<Value>,
    error: Option<(u16, String)>,
    seen: Mutex<Vec<Seen>>,
}

struct Seen {
    query: HashMap<String, String>,
    apikey: Option<String>,
    authorization: Option<String>,
    prefer: Option<String>,
    body: Option<Value>,
}

fn capture(headers: &HeaderMap, query: HashMap<String, String>, body: Option<Value>) -> Seen {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    Seen {
        query,
        apikey: header("apikey"),
        authorization: header("authorization"),
        prefer: header("prefer"),
        body,
    }
}

fn forced_error(host: &MockHost) -> Option<Response> {
    host.error.as_ref().map(|(status, message)| {
        let status = StatusCode::from_u16(*status).unwrap();
        (status, Json(json!({ "message": message }))).into_response()
    })
}

async fn mock_list(
    State(host): State<Arc<MockHost>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    host.seen.lock().unwrap().push(capture(&headers, query, None));

    if let Some(response) = forced_error(&host) {
        return response;
    }
    Json(host.rows.clone()).into_response()
}

async fn mock_insert(
    State(host): State<Arc<MockHost>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    host.seen
        .lock()
        .unwrap()
        .push(capture(&headers, HashMap::new(), Some(body)));

    if let Some(response) = forced_error(&host) {
        return response;
    }
    StatusCode::CREATED.into_response()
}

async fn spawn_host(host: Arc<MockHost>) -> String {
    let app = Router::new()
        .route("/rest/v1/messages", get(mock_list).post(mock_insert))
        .with_state(host);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    format!("http://{addr}")
}

#[tokio::test]
async fn list_requests_the_ordered_collection() {
    let host = Arc::new(MockHost {
        rows: vec![
            json!({ "id": 2, "content": "newer", "created_at": "2026-05-02T10:00:00Z", "user_id": null }),
            json!({ "id": 1, "content": "older", "created_at": "2026-05-01T10:00:00+00:00" }),
        ],
        ..Default::default()
    });
    let base = spawn_host(host.clone()).await;

    let store = RestStore::new(&base, "sekret");
    let messages = store.list().await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, 2);
    assert_eq!(messages[0].content, "newer");
    assert_eq!(messages[1].user_id, None);

    let seen = host.seen.lock().unwrap();
    let request = &seen[0];
    assert_eq!(request.query.get("select").map(String::as_str), Some("*"));
    assert_eq!(
        request.query.get("order").map(String::as_str),
        Some("created_at.desc")
    );
    assert_eq!(request.apikey.as_deref(), Some("sekret"));
    assert_eq!(request.authorization.as_deref(), Some("Bearer sekret"));
}

#[tokio::test]
async fn insert_posts_a_single_row_array() {
    let host = Arc::new(MockHost::default());
    let base = spawn_host(host.clone()).await;

    let store = RestStore::new(&base, "sekret");
    store.insert("hola pista").await.unwrap();

    let seen = host.seen.lock().unwrap();
    let request = &seen[0];
    assert_eq!(request.body, Some(json!([{ "content": "hola pista" }])));
    assert_eq!(request.prefer.as_deref(), Some("return=minimal"));
    assert_eq!(request.apikey.as_deref(), Some("sekret"));
    assert_eq!(request.authorization.as_deref(), Some("Bearer sekret"));
}

#[tokio::test]
async fn backend_error_surfaces_its_message() {
    let host = Arc::new(MockHost {
        error: Some((500, "permission denied for table messages".to_string())),
        ..Default::default()
    });
    let base = spawn_host(host.clone()).await;

    let err = RestStore::new(&base, "sekret").list().await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
    assert_eq!(err.to_string(), "permission denied for table messages");
}

#[tokio::test]
async fn base_url_trailing_slash_is_tolerated() {
    let host = Arc::new(MockHost::default());
    let base = spawn_host(host.clone()).await;

    let store = RestStore::new(&format!("{base}/"), "sekret");
    store.insert("hi").await.unwrap();

    assert_eq!(host.seen.lock().unwrap().len(), 1);
}
