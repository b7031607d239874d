//! Router tests driving the application through `tower::ServiceExt`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
};
use callboard_core::{CallRecord, CallSource, Config, Error, InteractionExchange, StaticSource};
use callboard_web::{AppState, build_app};
use http::{Method, Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn call(id: i64, status: &str, exchanges: usize) -> CallRecord {
    CallRecord {
        id,
        status: status.to_string(),
        duration: Some(75.0),
        interaction_log: (0..exchanges)
            .map(|i| InteractionExchange {
                user: format!("pregunta {i}"),
                ai: format!("respuesta {i}"),
                timestamp: 1_710_512_730.0,
            })
            .collect(),
        user_phone: format!("+5255123456{id:02}"),
        start_time: Some("2024-03-15T14:25:30".to_string()),
        call_sid: format!("CA{id:04}"),
        user_intent: None,
    }
}

fn sample() -> Vec<CallRecord> {
    vec![
        call(1, "active", 2),
        call(2, "ended", 0),
        call(13, "ended", 4),
    ]
}

async fn loaded_state(calls: Vec<CallRecord>) -> AppState {
    let state = AppState::with_source(Config::default(), Arc::new(StaticSource::new(calls)));
    state.load().await.unwrap();
    state
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

struct FailingSource;

#[async_trait]
impl CallSource for FailingSource {
    async fn fetch_calls(&self) -> callboard_core::Result<Vec<CallRecord>> {
        Err(Error::Http {
            status: 503,
            message: "GET http://backend/api/calls".to_string(),
        })
    }

    fn describe(&self) -> String {
        "failing backend".to_string()
    }
}

#[tokio::test]
async fn serves_dashboard_page() {
    let app = build_app(loaded_state(sample()).await);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8_lossy(&bytes);
    assert!(page.contains("Callboard"));
    assert!(page.contains(r#"<input id="search" type="search" maxlength="128""#));
}

#[tokio::test]
async fn health_reports_loaded_calls() {
    let app = build_app(loaded_state(sample()).await);
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["calls"], 3);
    assert_eq!(body["load_state"]["state"], "loaded");
}

#[tokio::test]
async fn stats_cover_full_list() {
    let app = build_app(loaded_state(sample()).await);
    let (status, body) = get(&app, "/api/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"total": 3, "active": 1, "with_interactions": 2, "avg_interactions": 2.0})
    );
}

#[tokio::test]
async fn charts_follow_store_order() {
    let app = build_app(loaded_state(sample()).await);
    let (_, body) = get(&app, "/api/charts").await;

    assert_eq!(body["status_split"], json!({"active": 1, "others": 2}));
    assert_eq!(body["recent_volumes"][2], json!({"id": 13, "interactions": 4}));
    assert_eq!(body["volume_trend"]["step"], 1);
    assert_eq!(body["volume_trend"]["buckets"][0]["label"], "1-1");
}

#[tokio::test]
async fn list_calls_applies_query_without_touching_view() {
    let app = build_app(loaded_state(sample()).await);

    let (status, body) = get(&app, "/api/calls?status=ended&q=13").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["total"], 3);
    assert_eq!(body["calls"][0]["id"], 13);
    assert_eq!(body["calls"][0]["duration"], "1:15");

    let (_, body) = get(&app, "/api/calls").await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["filters"], json!({"status": "all", "search": ""}));
}

#[tokio::test]
async fn list_calls_rejects_oversized_search() {
    let app = build_app(loaded_state(sample()).await);
    let long = "9".repeat(200);

    let (status, body) = get(&app, &format!("/api/calls?q={long}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn search_at_input_limit_is_accepted() {
    let app = build_app(loaded_state(sample()).await);
    let longest = "9".repeat(128);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/filters",
        Some(json!({"search": longest})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search"], longest);

    let (status, body) = get(&app, &format!("/api/calls?q={longest}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn filters_drive_dashboard() {
    let app = build_app(loaded_state(sample()).await);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/filters",
        Some(json!({"status": "ended"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ended", "search": ""}));

    let (_, body) = get(&app, "/api/dashboard").await;
    assert_eq!(body["generation"], 1);
    assert_eq!(body["stats"]["total"], 3);
    assert_eq!(body["calls"].as_array().unwrap().len(), 2);
    assert_eq!(body["statuses"], json!(["active", "ended"]));

    send(&app, Method::PUT, "/api/filters", Some(json!({"search": "ca0002"}))).await;
    let (_, body) = get(&app, "/api/dashboard").await;
    assert_eq!(body["calls"].as_array().unwrap().len(), 1);
    assert_eq!(body["calls"][0]["id"], 2);
}

#[tokio::test]
async fn get_call_returns_transcript() {
    let app = build_app(loaded_state(sample()).await);

    let (status, body) = get(&app, "/api/calls/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["call_sid"], "CA0001");
    assert_eq!(body["transcript"][1]["user"], "pregunta 1");
    assert_eq!(body["transcript"][0]["time"], "14:25:30");

    let (status, body) = get(&app, "/api/calls/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "call 99 not found");
}

#[tokio::test]
async fn selection_round_trip() {
    let app = build_app(loaded_state(sample()).await);

    let (_, body) = get(&app, "/api/selection").await;
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::PUT, "/api/selection", Some(json!({"id": 13}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 13);

    let (_, body) = get(&app, "/api/dashboard").await;
    assert_eq!(body["selected"]["id"], 13);

    let (status, _) = send(&app, Method::PUT, "/api/selection", Some(json!({"id": 5}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/selection", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = get(&app, "/api/selection").await;
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn reload_replaces_list() {
    let state = AppState::with_source(Config::default(), Arc::new(StaticSource::new(sample())));
    let app = build_app(state);

    let (_, body) = get(&app, "/api/stats").await;
    assert_eq!(body["total"], 0);

    let (status, body) = send(&app, Method::POST, "/api/reload", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loaded"], 3);
    assert_eq!(body["load_state"]["state"], "loaded");
}

#[tokio::test]
async fn failed_reload_is_bad_gateway() {
    let state = AppState::with_source(Config::default(), Arc::new(FailingSource));
    let app = build_app(state);

    let (status, body) = send(&app, Method::POST, "/api/reload", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_ERROR");

    let (_, body) = get(&app, "/health").await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["load_state"]["state"], "failed");
    assert_eq!(body["calls"], 0);
}

#[tokio::test]
async fn duplicate_batch_reload_is_bad_gateway() {
    let source = StaticSource::new(vec![call(1, "active", 0), call(1, "ended", 0)]);
    let state = AppState::with_source(Config::default(), Arc::new(source));
    let app = build_app(state);

    let (status, body) = send(&app, Method::POST, "/api/reload", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
    assert!(body["details"].as_str().unwrap().contains("duplicate"));

    let (_, body) = get(&app, "/health").await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["load_state"]["state"], "failed");
    assert_eq!(body["calls"], 0);
}

#[tokio::test]
async fn reload_moves_dashboard_to_new_batch() {
    let state = loaded_state(sample()).await;
    let store = Arc::clone(state.store());
    let app = build_app(state);

    store
        .replace(vec![call(21, "active", 1), call(22, "active", 3)])
        .unwrap();

    let (_, body) = get(&app, "/api/dashboard").await;
    assert_eq!(body["generation"], 2);
    assert_eq!(body["stats"]["total"], 2);
    assert_eq!(body["calls"].as_array().unwrap().len(), 2);
    assert_eq!(body["charts"]["status_split"], json!({"active": 2, "others": 0}));

    let (_, body) = get(&app, "/api/calls").await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["count"], 2);
}
